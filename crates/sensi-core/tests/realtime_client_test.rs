#![allow(clippy::unwrap_used)]
// End-to-end tests for `RealtimeClient` against a wiremock Sensi service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::broadcast;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use sensi_core::{
    ClientConfig, ConnectionState, CoreError, RealtimeClient, StopReason, ThermostatEvent,
};

const DEVICE: &str = "36-6f-92-ff-fe-01-23-45";
const WAIT: Duration = Duration::from_secs(5);

// ── Helpers ─────────────────────────────────────────────────────────

fn client_for(server: &MockServer, retry_limit: u32) -> RealtimeClient {
    client_with_timeout(server, retry_limit, Duration::from_secs(10))
}

fn client_with_timeout(server: &MockServer, retry_limit: u32, timeout: Duration) -> RealtimeClient {
    let url = Url::parse(&server.uri()).unwrap();
    let mut config = ClientConfig::new(url, "user@example.com", "hunter2".to_string().into());
    config.retry_limit = retry_limit;
    config.timeout = timeout;
    RealtimeClient::new(config).unwrap()
}

/// Request paths in arrival order, limited to `keep`.
async fn request_order(server: &MockServer, keep: &[&str]) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_owned())
        .filter(|p| keep.contains(&p.as_str()))
        .collect()
}

/// Mount authorize, thermostats, negotiate, connect, send, and abort.
///
/// Authorize and subscribe are left to the caller so call counts can be
/// asserted per test.
async fn mount_handshake(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/thermostats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"ICD": DEVICE, "DeviceName": "Hallway"}
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/realtime/negotiate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ConnectionToken": "tok-1"})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/realtime/connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"C": "c-0"})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/realtime/abort"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn mount_authorize(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_subscribe(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/realtime/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(expected)
        .mount(server)
        .await;
}

/// Keep-alive fallback for `/realtime/poll`, slowed down so an idle loop
/// doesn't spin.
async fn mount_idle_poll(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(20)),
        )
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, request_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == request_path)
        .collect()
}

async fn wait_for_requests(server: &MockServer, request_path: &str, count: usize) {
    tokio::time::timeout(WAIT, async {
        while requests_to(server, request_path).await.len() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {count} requests to {request_path}"));
}

async fn next_event(
    events: &mut broadcast::Receiver<Arc<ThermostatEvent>>,
    name: &str,
) -> Arc<ThermostatEvent> {
    tokio::time::timeout(WAIT, async {
        loop {
            let event = events.recv().await.unwrap();
            if event.name() == name {
                return event;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {name}"))
}

fn query_value(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

// ── Negotiation ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_returns_device_list() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;

    let client = client_for(&server, 5);
    let state = client.connection_state();
    let devices = client.connect().await.unwrap();

    assert_eq!(devices.ids().collect::<Vec<_>>(), vec![DEVICE]);
    assert_eq!(*state.borrow(), ConnectionState::Connected);

    let connect = &requests_to(&server, "/realtime/connect").await[0];
    assert_eq!(query_value(connect, "connectionToken").as_deref(), Some("tok-1"));
    assert_eq!(query_value(connect, "transport").as_deref(), Some("longPolling"));
}

#[tokio::test]
async fn test_bad_credentials_stop_before_listing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"Message": "Bad creds"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/thermostats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let state = client.connection_state();

    match client.connect().await {
        Err(CoreError::AuthorizationFailed { message }) => assert_eq!(message, "Bad creds"),
        other => panic!("expected AuthorizationFailed, got: {other:?}"),
    }
    assert_eq!(*state.borrow(), ConnectionState::Failed);
}

#[tokio::test]
async fn test_negotiate_failure_surfaces() {
    let server = MockServer::start().await;
    mount_authorize(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/thermostats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/negotiate"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, CoreError::NegotiationFailed { .. }), "{err:?}");

    let err = client.subscribe(DEVICE).await.unwrap_err();
    assert!(matches!(err, CoreError::NotConnected), "{err:?}");
}

// ── Subscription ────────────────────────────────────────────────────

#[tokio::test]
async fn test_subscribe_requires_connect() {
    let server = MockServer::start().await;
    let client = client_for(&server, 5);

    let err = client.subscribe(DEVICE).await.unwrap_err();
    assert!(matches!(err, CoreError::NotConnected), "{err:?}");
}

#[tokio::test]
async fn test_second_subscribe_is_rejected() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;
    mount_subscribe(&server, 1).await;
    mount_idle_poll(&server).await;

    let client = client_for(&server, 5);
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    match client.subscribe("other-device").await {
        Err(CoreError::AlreadySubscribed { device_id }) => assert_eq!(device_id, DEVICE),
        other => panic!("expected AlreadySubscribed, got: {other:?}"),
    }

    client.disconnect().await;
}

#[tokio::test]
async fn test_subscribe_failure_keeps_session() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/realtime/send"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    client.connect().await.unwrap();

    match client.subscribe(DEVICE).await {
        Err(CoreError::SubscriptionFailed { device_id, message }) => {
            assert_eq!(device_id, DEVICE);
            assert_eq!(message, format!("Failed to subscribe to {DEVICE} (404)"));
        }
        other => panic!("expected SubscriptionFailed, got: {other:?}"),
    }

    // Still connected: disconnect aborts the negotiated connection.
    client.disconnect().await;
    assert_eq!(requests_to(&server, "/realtime/abort").await.len(), 1);
}

// ── Poll loop ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_online_message_and_cursor_handling() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;
    mount_subscribe(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .and(query_param("messageId", "c-0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "C": "5",
            "G": "g-1",
            "M": [{"H": "thermostat-v1", "M": "online", "A": [DEVICE, {
                "EnvironmentControls": {"CoolSetpoint": {"F": 70}}
            }]}]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .and(query_param("messageId", "5"))
        .and(query_param("groupsToken", "g-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "M": [{"H": "thermostat-v1", "M": "update", "A": [DEVICE, {
                "EnvironmentControls": {"CoolSetpoint": {"F": 72}, "HoldMode": "Temporary"}
            }]}]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_idle_poll(&server).await;

    let client = client_for(&server, 5);
    let mut events = client.events();
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    let online = next_event(&mut events, "online").await;
    let message = online.device_message().unwrap();
    assert_eq!(message.device_id, DEVICE);
    assert!(message.timestamp > 0);
    assert_eq!(message.fields["EnvironmentControls"]["CoolSetpoint"]["F"], 70);

    let change = next_event(&mut events, "coolSetpointChanged").await;
    assert_eq!(
        serde_json::to_value(&*change).unwrap()["data"],
        json!({"oldSetpoint": 70.0, "newSetpoint": 72.0, "isTemporaryHold": true})
    );
    next_event(&mut events, "update").await;

    // The update carried no C/G: later polls keep sending the old values.
    wait_for_requests(&server, "/realtime/poll", 3).await;
    let third = &requests_to(&server, "/realtime/poll").await[2];
    assert_eq!(query_value(third, "messageId").as_deref(), Some("5"));
    assert_eq!(query_value(third, "groupsToken").as_deref(), Some("g-1"));

    client.disconnect().await;
}

#[tokio::test]
async fn test_unknown_hub_is_skipped() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;
    mount_subscribe(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "C": "1",
            "M": [
                {"H": "weather-v1", "M": "update", "A": ["x", {}]},
                {"H": "thermostat-v1", "M": "offline", "A": [DEVICE]}
            ]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_idle_poll(&server).await;

    let client = client_for(&server, 5);
    let mut events = client.events();
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    let first = tokio::time::timeout(WAIT, events.recv()).await.unwrap().unwrap();
    assert_eq!(first.name(), "offline");

    client.disconnect().await;
}

// ── Recovery ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_401_reauthorizes_once_then_polls() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 2).await;
    mount_subscribe(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_idle_poll(&server).await;

    let client = client_for(&server, 5);
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    wait_for_requests(&server, "/realtime/poll", 2).await;
    client.disconnect().await;

    // authorize #2 lands between poll #1 and poll #2.
    let paths = request_order(&server, &["/api/authorize", "/realtime/poll"]).await;
    assert_eq!(
        &paths[..4],
        &["/api/authorize", "/realtime/poll", "/api/authorize", "/realtime/poll"]
    );

    // The cursor survived recovery.
    let second = &requests_to(&server, "/realtime/poll").await[1];
    assert_eq!(query_value(second, "messageId").as_deref(), Some("c-0"));
}

#[tokio::test]
async fn test_500_resubscribes_once_then_polls() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;
    mount_subscribe(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_idle_poll(&server).await;

    let client = client_for(&server, 5);
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    wait_for_requests(&server, "/realtime/poll", 2).await;
    client.disconnect().await;

    // The resubscribe lands between poll #1 and poll #2.
    let paths = request_order(&server, &["/realtime/send", "/realtime/poll"]).await;
    assert_eq!(
        &paths[..4],
        &["/realtime/send", "/realtime/poll", "/realtime/send", "/realtime/poll"]
    );

    let sends = requests_to(&server, "/realtime/send").await;
    assert_eq!(sends.len(), 2);
    assert_eq!(query_value(&sends[1], "connectionToken").as_deref(), Some("tok-1"));

    let second = &requests_to(&server, "/realtime/poll").await[1];
    assert_eq!(query_value(second, "messageId").as_deref(), Some("c-0"));
}

#[tokio::test]
async fn test_transport_failure_polls_again_without_recovery() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;
    mount_subscribe(&server, 1).await;

    // Held past the client timeout: no HTTP response ever reaches the loop.
    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_idle_poll(&server).await;

    let client = client_with_timeout(&server, 5, Duration::from_millis(500));
    let state = client.connection_state();
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    wait_for_requests(&server, "/realtime/poll", 3).await;
    assert_eq!(*state.borrow(), ConnectionState::Subscribed);
    client.disconnect().await;

    // Only the handshake's authorize and subscribe; the retry went straight to poll.
    assert_eq!(requests_to(&server, "/api/authorize").await.len(), 1);
    assert_eq!(requests_to(&server, "/realtime/send").await.len(), 1);
    let second = &requests_to(&server, "/realtime/poll").await[1];
    assert_eq!(query_value(second, "messageId").as_deref(), Some("c-0"));
}

#[tokio::test]
async fn test_non_hub_entries_do_not_cost_the_batch() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;
    mount_subscribe(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "C": "7",
            "M": [
                {"I": "0"},
                {"H": "thermostat-v1", "M": "online", "A": [DEVICE, {"X": 1}]}
            ]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_idle_poll(&server).await;

    let client = client_for(&server, 2);
    let mut events = client.events();
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    let online = next_event(&mut events, "online").await;
    assert_eq!(online.device_message().unwrap().fields["X"], 1);

    wait_for_requests(&server, "/realtime/poll", 2).await;
    let second = &requests_to(&server, "/realtime/poll").await[1];
    assert_eq!(query_value(second, "messageId").as_deref(), Some("7"));

    client.disconnect().await;
}

#[tokio::test]
async fn test_undecodable_200_still_resets_retry_counter() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;
    mount_subscribe(&server, 1).await;

    // fail, unreadable 200, fail: with retry_limit 1 the loop only
    // survives if the 200 reset the counter.
    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_idle_poll(&server).await;

    let client = client_for(&server, 1);
    let mut events = client.events();
    let state = client.connection_state();
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    wait_for_requests(&server, "/realtime/poll", 5).await;
    assert_eq!(*state.borrow(), ConnectionState::Subscribed);
    assert!(matches!(
        events.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));

    client.disconnect().await;
}

#[tokio::test]
async fn test_retries_exhaust_after_limit_plus_one() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;
    mount_subscribe(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, 2);
    let mut events = client.events();
    let state = client.connection_state();
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    let stopped = next_event(&mut events, "pollingStopped").await;
    assert_eq!(
        *stopped,
        ThermostatEvent::PollingStopped(StopReason::RetriesExhausted { attempts: 3 })
    );
    assert_eq!(*state.borrow(), ConnectionState::Failed);

    // No further polls once stopped.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(requests_to(&server, "/realtime/poll").await.len(), 3);

    client.disconnect().await;
}

#[tokio::test]
async fn test_success_resets_retry_counter() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;
    mount_subscribe(&server, 1).await;

    // fail, ok, fail, then idle: with retry_limit 1 this only survives
    // if the successful poll reset the counter.
    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_idle_poll(&server).await;

    let client = client_for(&server, 1);
    let state = client.connection_state();
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    wait_for_requests(&server, "/realtime/poll", 5).await;
    assert_eq!(*state.borrow(), ConnectionState::Subscribed);

    client.disconnect().await;
}

#[tokio::test]
async fn test_failed_reauthorization_stops_polling() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_subscribe(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"Message": "Locked"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/poll"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let mut events = client.events();
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();

    let stopped = next_event(&mut events, "pollingStopped").await;
    match &*stopped {
        ThermostatEvent::PollingStopped(StopReason::RecoveryFailed { message }) => {
            assert!(message.contains("Locked"), "{message}");
        }
        other => panic!("expected RecoveryFailed, got: {other:?}"),
    }

    client.disconnect().await;
}

// ── Disconnect ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_disconnect_aborts_and_stops_polling() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_authorize(&server, 1).await;
    mount_subscribe(&server, 1).await;
    mount_idle_poll(&server).await;

    let client = client_for(&server, 5);
    let state = client.connection_state();
    client.connect().await.unwrap();
    client.subscribe(DEVICE).await.unwrap();
    wait_for_requests(&server, "/realtime/poll", 1).await;

    client.disconnect().await;
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);

    let aborts = requests_to(&server, "/realtime/abort").await;
    assert_eq!(aborts.len(), 1);
    assert_eq!(query_value(&aborts[0], "connectionToken").as_deref(), Some("tok-1"));

    let polls = requests_to(&server, "/realtime/poll").await.len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(requests_to(&server, "/realtime/poll").await.len(), polls);
}

#[tokio::test]
async fn test_disconnect_tolerates_abort_failure() {
    let server = MockServer::start().await;
    mount_authorize(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/thermostats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/negotiate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ConnectionToken": "tok-1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime/abort"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let state = client.connection_state();
    client.connect().await.unwrap();
    client.disconnect().await;
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);

    // Second disconnect is a no-op.
    client.disconnect().await;
    assert_eq!(requests_to(&server, "/realtime/abort").await.len(), 1);
}
