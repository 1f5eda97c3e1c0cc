//! Partial and total store failure during a pass
//!
//! A single device failing mid-pass must not cost the rest of the fleet,
//! and a failed enumeration must only cost that one pass.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tollwatch::actors::monitor::MonitorHandle;
use tollwatch::publisher::push_channel;
use tollwatch::stores::{
    DeviceStore, MemoryAlertStore, MemoryDeviceStore, StoreError, StoreResult,
};
use tollwatch::{Device, DeviceStatus, DeviceSubStatus};

use super::helpers::{test_device, test_monitor_config};

/// Device store double that can be told to fail specific operations
struct FlakyDeviceStore {
    inner: MemoryDeviceStore,
    fail_updates_for: Mutex<HashSet<String>>,
    fail_listing: AtomicBool,
}

impl FlakyDeviceStore {
    async fn new(devices: Vec<Device>) -> Self {
        Self {
            inner: MemoryDeviceStore::with_devices(devices).await,
            fail_updates_for: Mutex::new(HashSet::new()),
            fail_listing: AtomicBool::new(false),
        }
    }

    fn fail_update(&self, id: &str) {
        self.fail_updates_for.lock().unwrap().insert(id.to_string());
    }

    fn clear_update_failures(&self) {
        self.fail_updates_for.lock().unwrap().clear();
    }

    fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeviceStore for FlakyDeviceStore {
    async fn list_devices(&self) -> StoreResult<Vec<Device>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("backend offline".to_string()));
        }
        self.inner.list_devices().await
    }

    async fn get_device(&self, id: &str) -> StoreResult<Option<Device>> {
        self.inner.get_device(id).await
    }

    async fn update_device_status(
        &self,
        id: &str,
        status: DeviceStatus,
        sub_status: Option<DeviceSubStatus>,
    ) -> StoreResult<Device> {
        if self.fail_updates_for.lock().unwrap().contains(id) {
            return Err(StoreError::Unavailable(format!(
                "write for {id} timed out"
            )));
        }
        self.inner.update_device_status(id, status, sub_status).await
    }
}

#[tokio::test]
async fn one_failing_device_does_not_block_the_rest() {
    // all three are stale enough to need an update
    let store = Arc::new(
        FlakyDeviceStore::new(vec![
            test_device("reader-020", Some(45), DeviceStatus::Live, None),
            test_device("reader-021", Some(45), DeviceStatus::Live, None),
            test_device("reader-022", Some(45), DeviceStatus::Live, None),
        ])
        .await,
    );
    store.fail_update("reader-021");

    let alerts = Arc::new(MemoryAlertStore::new());
    let (push_tx, _push_rx) = push_channel();
    let monitor = MonitorHandle::spawn(
        test_monitor_config(),
        store.clone(),
        alerts.clone(),
        push_tx,
    );

    let summary = monitor.tick_now().await.unwrap();
    assert_eq!(summary.checked, 3);
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.failures, 1);

    // the healthy devices were reclassified
    for id in ["reader-020", "reader-022"] {
        let device = store.get_device(id).await.unwrap().unwrap();
        assert_eq!(device.status, DeviceStatus::Warning);
    }
    // the failing one keeps its stale row until the store recovers
    let device = store.get_device("reader-021").await.unwrap().unwrap();
    assert_eq!(device.status, DeviceStatus::Live);

    monitor.shutdown().await;
}

#[tokio::test]
async fn failed_device_is_retried_on_the_next_pass() {
    let store = Arc::new(
        FlakyDeviceStore::new(vec![test_device(
            "reader-023",
            Some(45),
            DeviceStatus::Live,
            None,
        )])
        .await,
    );
    store.fail_update("reader-023");

    let alerts = Arc::new(MemoryAlertStore::new());
    let (push_tx, _push_rx) = push_channel();
    let monitor = MonitorHandle::spawn(
        test_monitor_config(),
        store.clone(),
        alerts.clone(),
        push_tx,
    );

    let summary = monitor.tick_now().await.unwrap();
    assert_eq!(summary.failures, 1);

    // store recovers
    store.clear_update_failures();

    let summary = monitor.tick_now().await.unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failures, 0);

    let device = store.get_device("reader-023").await.unwrap().unwrap();
    assert_eq!(device.status, DeviceStatus::Warning);

    monitor.shutdown().await;
}

#[tokio::test]
async fn enumeration_failure_skips_the_pass_but_not_the_loop() {
    let store = Arc::new(
        FlakyDeviceStore::new(vec![test_device(
            "reader-024",
            Some(90),
            DeviceStatus::Live,
            None,
        )])
        .await,
    );
    store.set_fail_listing(true);

    let alerts = Arc::new(MemoryAlertStore::new());
    let (push_tx, _push_rx) = push_channel();
    let monitor = MonitorHandle::spawn(
        test_monitor_config(),
        store.clone(),
        alerts.clone(),
        push_tx,
    );

    // the pass fails as a whole...
    assert!(monitor.tick_now().await.is_err());

    // ...but the actor survives and the next pass works
    store.set_fail_listing(false);
    let summary = monitor.tick_now().await.unwrap();
    assert_eq!(summary.updated, 1);

    let device = store.get_device("reader-024").await.unwrap().unwrap();
    assert_eq!(device.status, DeviceStatus::Down);

    monitor.shutdown().await;
}
