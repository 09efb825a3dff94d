// Realtime hub endpoints (SignalR long-polling)
//
// negotiate -> connect -> send(Subscribe) -> poll, poll, poll ...
// Every request carries `transport=longPolling` and the connection token
// handed out by negotiate. Poll responses are classified by status so the
// caller can pick a recovery action without inspecting HTTP details.

use rand::Rng;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    CONNECTION_DATA, ConnectResponse, HubInvocation, NegotiateResponse, PollResponse, TRANSPORT,
};

/// Query string shared by the realtime endpoints. Absent fields are omitted.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct RealtimeQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    transport: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    connection_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    connection_data: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tid: Option<u8>,
    /// Cache-buster, milliseconds since the epoch.
    #[serde(rename = "_", skip_serializing_if = "Option::is_none")]
    cache_bust: Option<i64>,
}

impl<'a> RealtimeQuery<'a> {
    fn session(connection_token: &'a str) -> Self {
        Self {
            transport: Some(TRANSPORT),
            connection_token: Some(connection_token),
            ..Self::default()
        }
    }
}

fn random_tid() -> u8 {
    rand::thread_rng().gen_range(0..=10)
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl ApiClient {
    /// `GET /realtime/negotiate`: obtain a connection token.
    pub async fn negotiate(&self) -> Result<String, Error> {
        let url = self.endpoint("/realtime/negotiate")?;
        debug!("GET {}", url);

        let resp = self.http().get(url).send().await?;
        if resp.status() != StatusCode::OK {
            let message = Self::failure_message(resp, "Failed to negotiate connection").await;
            return Err(Error::Negotiation { message });
        }

        let negotiated: NegotiateResponse = Self::decode(resp).await?;
        debug!(connection_id = ?negotiated.connection_id, "realtime connection negotiated");
        Ok(negotiated.connection_token)
    }

    /// `GET /realtime/connect`: open the long-polling transport.
    ///
    /// Returns the initial message cursor when the server supplies one.
    pub async fn connect(&self, connection_token: &str) -> Result<Option<String>, Error> {
        let url = self.endpoint("/realtime/connect")?;
        let query = RealtimeQuery {
            connection_data: Some(CONNECTION_DATA),
            tid: Some(random_tid()),
            cache_bust: Some(now_millis()),
            ..RealtimeQuery::session(connection_token)
        };
        debug!("GET {}", url);

        let resp = self.http().get(url).query(&query).send().await?;
        if resp.status() != StatusCode::OK {
            let message = Self::failure_message(resp, "Failed to connect").await;
            return Err(Error::Connection { message });
        }

        let connected: ConnectResponse = Self::decode(resp).await?;
        Ok(connected.message_id.filter(|c| !c.is_empty()))
    }

    /// `POST /realtime/send`: invoke `Subscribe` for one thermostat.
    ///
    /// The invocation travels form-encoded as `data=<json>`.
    pub async fn subscribe(&self, connection_token: &str, device_id: &str) -> Result<(), Error> {
        let url = self.endpoint("/realtime/send")?;
        let query = RealtimeQuery::session(connection_token);
        let data = serde_json::to_string(&HubInvocation::subscribe(device_id)).map_err(|e| {
            Error::Deserialization {
                message: format!("failed to encode Subscribe invocation: {e}"),
                body: String::new(),
            }
        })?;
        debug!(device_id, "POST {}", url);

        let resp = self
            .http()
            .post(url)
            .query(&query)
            .form(&[("data", data.as_str())])
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            let fallback = format!("Failed to subscribe to {device_id}");
            let message = Self::failure_message(resp, &fallback).await;
            return Err(Error::Subscription {
                device_id: device_id.to_owned(),
                message,
            });
        }

        Ok(())
    }

    /// `GET /realtime/poll`: wait for the next batch of hub messages.
    ///
    /// Status classification:
    /// - 200: decoded [`PollResponse`]; an undecodable body is logged and
    ///   read as an empty batch, since the server did answer
    /// - 401 / 403: [`Error::AuthorizationRequired`]
    /// - 500: [`Error::SubscriptionExpired`]
    /// - anything else: [`Error::UnexpectedStatus`]
    pub async fn poll(
        &self,
        connection_token: &str,
        groups_token: Option<&str>,
        message_id: Option<&str>,
    ) -> Result<PollResponse, Error> {
        let url = self.endpoint("/realtime/poll")?;
        let query = RealtimeQuery {
            connection_data: Some(CONNECTION_DATA),
            groups_token,
            message_id,
            tid: Some(random_tid()),
            cache_bust: Some(now_millis()),
            ..RealtimeQuery::session(connection_token)
        };
        trace!(?message_id, "GET {}", url);

        let resp = self.http().get(url).query(&query).send().await?;
        let status = resp.status();
        match status {
            StatusCode::OK => match Self::decode(resp).await {
                Err(Error::Deserialization { message, .. }) => {
                    warn!(error = %message, "dropping undecodable poll response");
                    Ok(PollResponse::default())
                }
                decoded => decoded,
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let message = Self::failure_message(resp, "Polling failure").await;
                Err(Error::AuthorizationRequired {
                    status: status.as_u16(),
                    message,
                })
            }
            StatusCode::INTERNAL_SERVER_ERROR => {
                let message = Self::failure_message(resp, "Polling failure").await;
                Err(Error::SubscriptionExpired { message })
            }
            _ => {
                let message = Self::failure_message(resp, "Polling failure").await;
                Err(Error::UnexpectedStatus {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// `GET /realtime/abort`: tell the server to drop the connection.
    pub async fn abort(&self, connection_token: &str) -> Result<(), Error> {
        let url = self.endpoint("/realtime/abort")?;
        let query = RealtimeQuery::session(connection_token);
        debug!("GET {}", url);

        let resp = self.http().get(url).query(&query).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let message = Self::failure_message(resp, "Polling failure").await;
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
