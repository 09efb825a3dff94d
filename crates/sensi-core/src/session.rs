// ── Realtime session bookkeeping ──
//
// The connection token never changes for the life of a session. The
// message cursor (`C`) and groups token (`G`) only move forward: they are
// overwritten when the server sends a non-empty value and otherwise kept,
// so recovery never loses the position in the message stream.

use tokio_util::sync::CancellationToken;

/// One negotiated realtime connection.
#[derive(Debug)]
pub struct Session {
    connection_token: String,
    message_cursor: Option<String>,
    groups_token: Option<String>,
    connected: CancellationToken,
}

impl Session {
    pub fn new(connection_token: String, message_cursor: Option<String>) -> Self {
        Self {
            connection_token,
            message_cursor: message_cursor.filter(|c| !c.is_empty()),
            groups_token: None,
            connected: CancellationToken::new(),
        }
    }

    pub fn connection_token(&self) -> &str {
        &self.connection_token
    }

    /// Last message cursor (`C`), sent back as `messageId`.
    pub fn message_cursor(&self) -> Option<&str> {
        self.message_cursor.as_deref()
    }

    /// Last groups token (`G`), sent back as `groupsToken`.
    pub fn groups_token(&self) -> Option<&str> {
        self.groups_token.as_deref()
    }

    /// Record the cursor and groups token from a successful poll.
    pub fn advance(&mut self, cursor: Option<String>, groups_token: Option<String>) {
        if let Some(c) = cursor.filter(|c| !c.is_empty()) {
            self.message_cursor = Some(c);
        }
        if let Some(g) = groups_token.filter(|g| !g.is_empty()) {
            self.groups_token = Some(g);
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.connected.is_cancelled()
    }

    /// Handle that flips the session to disconnected when cancelled.
    pub fn connected(&self) -> CancellationToken {
        self.connected.clone()
    }

    pub fn disconnect(&self) {
        self.connected.cancel();
    }
}

// ── Retry accounting ─────────────────────────────────────────────

/// Consecutive poll failure counter.
///
/// Incremented on every failed poll, reset by a successful one, never
/// touched by recovery. Exhausted once the count exceeds the limit.
#[derive(Debug, Clone, Copy)]
pub struct RetryState {
    count: u32,
    limit: u32,
}

impl RetryState {
    pub fn new(limit: u32) -> Self {
        Self { count: 0, limit }
    }

    /// Count one failure and return the attempt number.
    pub fn record_failure(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.count > self.limit
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}
