//! Realtime stream end-to-end: hub API server to dashboard client
//!
//! Spins up the real axum server on an ephemeral port, connects the
//! websocket client, and checks that state changes arrive as push
//! envelopes after the handshake.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tollwatch::actors::monitor::MonitorHandle;
use tollwatch::actors::weather::WeatherHandle;
use tollwatch::api::{ApiConfig, ApiState, spawn_api_server};
use tollwatch::client::DashboardClient;
use tollwatch::config::WeatherConfig;
use tollwatch::publisher::{PushMessage, PushPayload, PushSender, push_channel};
use tollwatch::stores::{MemoryAlertStore, MemoryDeviceStore};
use tollwatch::{Device, DeviceStatus, DeviceSubStatus};

use super::helpers::{test_device, test_monitor_config};

struct Stack {
    monitor: MonitorHandle,
    push_tx: PushSender,
    api_url: String,
}

async fn spawn_stack(devices: Vec<Device>) -> Stack {
    let device_store = Arc::new(MemoryDeviceStore::with_devices(devices).await);
    let alert_store = Arc::new(MemoryAlertStore::new());
    let (push_tx, _push_rx) = push_channel();

    let monitor = MonitorHandle::spawn(
        test_monitor_config(),
        device_store.clone(),
        alert_store.clone(),
        push_tx.clone(),
    );

    let state = ApiState::new(
        monitor.clone(),
        device_store,
        alert_store,
        push_tx.clone(),
    );
    let addr = spawn_api_server(
        ApiConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            enable_cors: false,
        },
        state,
    )
    .await
    .expect("api server failed to start");

    Stack {
        monitor,
        push_tx,
        api_url: format!("http://{addr}"),
    }
}

async fn next_message(rx: &mut mpsc::UnboundedReceiver<PushMessage>) -> PushMessage {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for push message")
        .expect("stream closed unexpectedly")
}

#[tokio::test]
async fn handshake_comes_first_then_device_snapshots() {
    let stack = spawn_stack(vec![test_device(
        "reader-030",
        Some(45),
        DeviceStatus::Live,
        Some(DeviceSubStatus::Standby),
    )])
    .await;

    let mut rx = DashboardClient::new(&stack.api_url).connect().await.unwrap();

    let handshake = next_message(&mut rx).await;
    assert!(matches!(handshake.payload, PushPayload::Connected { .. }));

    // a pass that degrades the device pushes its snapshot and a summary
    stack.monitor.tick_now().await.unwrap();

    let mut saw_device = false;
    let mut saw_summary = false;
    while !(saw_device && saw_summary) {
        match next_message(&mut rx).await.payload {
            PushPayload::DeviceMetrics(snapshot) => {
                assert_eq!(snapshot.device.id, "reader-030");
                assert_eq!(snapshot.device.status, DeviceStatus::Warning);
                assert_eq!(snapshot.previous_status, Some(DeviceStatus::Live));
                saw_device = true;
            }
            PushPayload::AlertsSummary(summary) => {
                assert_eq!(summary.unresolved, 1);
                assert_eq!(summary.warning, 1);
                saw_summary = true;
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    stack.monitor.shutdown().await;
}

#[tokio::test]
async fn manual_override_reaches_connected_dashboards() {
    let stack = spawn_stack(vec![test_device(
        "reader-031",
        Some(5),
        DeviceStatus::Live,
        Some(DeviceSubStatus::Active),
    )])
    .await;

    let mut rx = DashboardClient::new(&stack.api_url).connect().await.unwrap();
    let handshake = next_message(&mut rx).await;
    assert!(matches!(handshake.payload, PushPayload::Connected { .. }));

    stack
        .monitor
        .set_maintenance("reader-031", "op-7", Some("antenna swap".to_string()))
        .await
        .unwrap();

    let mut saw_device = false;
    let mut saw_summary = false;
    while !(saw_device && saw_summary) {
        match next_message(&mut rx).await.payload {
            PushPayload::DeviceMetrics(snapshot) => {
                assert_eq!(snapshot.device.status, DeviceStatus::Maintenance);
                saw_device = true;
            }
            PushPayload::AlertsSummary(summary) => {
                assert_eq!(summary.info, 1);
                saw_summary = true;
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    stack.monitor.shutdown().await;
}

#[tokio::test]
async fn weather_updates_flow_to_clients() {
    let stack = spawn_stack(vec![]).await;

    let mut rx = DashboardClient::new(&stack.api_url).connect().await.unwrap();
    let handshake = next_message(&mut rx).await;
    assert!(matches!(handshake.payload, PushPayload::Connected { .. }));

    // weather rides the same push channel as device updates
    let weather = WeatherHandle::spawn(
        WeatherConfig {
            interval_secs: 3600,
            sites: vec!["Plaza North".to_string()],
        },
        stack.push_tx.clone(),
    );
    weather.publish_now().await.unwrap();

    let message = next_message(&mut rx).await;
    match message.payload {
        PushPayload::WeatherUpdate(snapshot) => {
            assert_eq!(snapshot.site, "Plaza North");
            assert!(!snapshot.conditions.is_empty());
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    weather.shutdown().await;
    stack.monitor.shutdown().await;
}

#[tokio::test]
async fn two_clients_both_receive_the_same_snapshots() {
    let stack = spawn_stack(vec![test_device(
        "reader-032",
        Some(90),
        DeviceStatus::Live,
        Some(DeviceSubStatus::Active),
    )])
    .await;

    let mut rx_a = DashboardClient::new(&stack.api_url).connect().await.unwrap();
    let mut rx_b = DashboardClient::new(&stack.api_url).connect().await.unwrap();
    assert!(matches!(
        next_message(&mut rx_a).await.payload,
        PushPayload::Connected { .. }
    ));
    assert!(matches!(
        next_message(&mut rx_b).await.payload,
        PushPayload::Connected { .. }
    ));

    stack.monitor.tick_now().await.unwrap();

    for rx in [&mut rx_a, &mut rx_b] {
        loop {
            if let PushPayload::DeviceMetrics(snapshot) = next_message(rx).await.payload {
                assert_eq!(snapshot.device.id, "reader-032");
                assert_eq!(snapshot.device.status, DeviceStatus::Down);
                break;
            }
        }
    }

    stack.monitor.shutdown().await;
}
