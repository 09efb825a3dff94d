//! `sensi thermostats`: negotiate a session and print the device list.

use sensi_core::RealtimeClient;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &RealtimeClient, global: &GlobalOpts) -> Result<(), CliError> {
    let devices = client.connect().await;
    client.disconnect().await;
    let devices = devices?;

    let out = output::render_thermostats(
        &global.output,
        &devices,
        output::should_color(&global.color),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
