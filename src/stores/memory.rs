//! In-memory store implementations (no persistence)
//!
//! Back the hub's default deployment and the test suite. A relational
//! implementation of the same traits lives with the external CRUD service
//! that owns the records.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::escalation::AlertDraft;
use crate::{Alert, Device, DeviceStatus, DeviceSubStatus};

use super::alert::{AlertStore, AlertSummary};
use super::device::DeviceStore;
use super::error::{StoreError, StoreResult};
use crate::AlertType;

/// In-memory device store keyed by device id
#[derive(Default)]
pub struct MemoryDeviceStore {
    devices: RwLock<HashMap<String, Device>>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_devices(devices: Vec<Device>) -> Self {
        let store = Self::new();
        for device in devices {
            store.insert_device(device).await;
        }
        store
    }

    /// Register or replace a device row.
    pub async fn insert_device(&self, device: Device) {
        self.devices.write().await.insert(device.id.clone(), device);
    }

    /// Stamp a device's last observed transaction. In production this write
    /// comes from the transaction ingest pipeline, not from the monitor.
    pub async fn record_transaction(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let mut devices = self.devices.write().await;
        let device = devices
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("device {id}")))?;
        device.last_transaction = Some(at);
        Ok(())
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn list_devices(&self) -> StoreResult<Vec<Device>> {
        let devices = self.devices.read().await;
        let mut all: Vec<Device> = devices.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn get_device(&self, id: &str) -> StoreResult<Option<Device>> {
        Ok(self.devices.read().await.get(id).cloned())
    }

    async fn update_device_status(
        &self,
        id: &str,
        status: DeviceStatus,
        sub_status: Option<DeviceSubStatus>,
    ) -> StoreResult<Device> {
        let mut devices = self.devices.write().await;
        let device = devices
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("device {id}")))?;
        device.status = status;
        device.sub_status = sub_status;
        Ok(device.clone())
    }
}

#[derive(Default)]
struct AlertTable {
    alerts: Vec<Alert>,
    next_id: u64,
}

/// In-memory alert store, append-only
#[derive(Default)]
pub struct MemoryAlertStore {
    table: RwLock<AlertTable>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn create_alert(&self, draft: AlertDraft) -> StoreResult<Alert> {
        let mut table = self.table.write().await;
        table.next_id += 1;

        let alert = Alert {
            id: table.next_id,
            device_id: draft.device_id,
            alert_type: draft.alert_type,
            category: draft.category,
            title: draft.title,
            message: draft.message,
            is_read: false,
            is_resolved: false,
            metadata: draft.metadata,
            created_at: Utc::now(),
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_by: None,
            resolved_at: None,
        };

        table.alerts.push(alert.clone());
        Ok(alert)
    }

    async fn acknowledge_alert(&self, id: u64, actor: &str) -> StoreResult<Alert> {
        let mut table = self.table.write().await;
        let alert = table
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("alert {id}")))?;

        if alert.is_resolved {
            return Err(StoreError::Conflict(format!(
                "alert {id} is already resolved"
            )));
        }

        alert.is_read = true;
        alert.acknowledged_by = Some(actor.to_string());
        alert.acknowledged_at = Some(Utc::now());
        Ok(alert.clone())
    }

    async fn resolve_alert(&self, id: u64, actor: &str) -> StoreResult<Alert> {
        let mut table = self.table.write().await;
        let alert = table
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("alert {id}")))?;

        if alert.is_resolved {
            return Err(StoreError::Conflict(format!(
                "alert {id} is already resolved"
            )));
        }

        alert.is_resolved = true;
        alert.resolved_by = Some(actor.to_string());
        alert.resolved_at = Some(Utc::now());
        Ok(alert.clone())
    }

    async fn list_alerts(&self, unresolved_only: bool) -> StoreResult<Vec<Alert>> {
        let table = self.table.read().await;
        let mut alerts: Vec<Alert> = table
            .alerts
            .iter()
            .filter(|a| !unresolved_only || !a.is_resolved)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(alerts)
    }

    async fn summary(&self) -> StoreResult<AlertSummary> {
        let table = self.table.read().await;
        let mut summary = AlertSummary {
            total: table.alerts.len(),
            ..Default::default()
        };

        for alert in &table.alerts {
            if !alert.is_read {
                summary.unread += 1;
            }
            if !alert.is_resolved {
                summary.unresolved += 1;
                match alert.alert_type {
                    AlertType::Critical => summary.critical += 1,
                    AlertType::Warning => summary.warning += 1,
                    AlertType::Info => summary.info += 1,
                }
            }
        }

        Ok(summary)
    }
}
