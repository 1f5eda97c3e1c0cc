//! Helper functions for integration tests

use std::sync::Arc;

use chrono::{Duration, Utc};
use tollwatch::actors::monitor::MonitorHandle;
use tollwatch::config::MonitorConfig;
use tollwatch::publisher::{PushSender, push_channel};
use tollwatch::stores::{MemoryAlertStore, MemoryDeviceStore};
use tollwatch::{Device, DeviceStatus, DeviceSubStatus};

pub fn test_device(
    id: &str,
    minutes_ago: Option<i64>,
    status: DeviceStatus,
    sub_status: Option<DeviceSubStatus>,
) -> Device {
    Device {
        id: id.to_string(),
        location: Some(format!("Plaza 1 / {id}")),
        last_transaction: minutes_ago.map(|m| Utc::now() - Duration::minutes(m)),
        status,
        sub_status,
    }
}

/// Long timer period so test-driven `tick_now` calls are the only passes.
pub fn test_monitor_config() -> MonitorConfig {
    MonitorConfig {
        tick_interval_secs: 3600,
        ..Default::default()
    }
}

pub struct Harness {
    pub monitor: MonitorHandle,
    pub devices: Arc<MemoryDeviceStore>,
    pub alerts: Arc<MemoryAlertStore>,
    pub push_tx: PushSender,
}

pub async fn spawn_harness(devices: Vec<Device>) -> Harness {
    let device_store = Arc::new(MemoryDeviceStore::with_devices(devices).await);
    let alert_store = Arc::new(MemoryAlertStore::new());
    let (push_tx, _push_rx) = push_channel();

    let monitor = MonitorHandle::spawn(
        test_monitor_config(),
        device_store.clone(),
        alert_store.clone(),
        push_tx.clone(),
    );

    Harness {
        monitor,
        devices: device_store,
        alerts: alert_store,
        push_tx,
    }
}
