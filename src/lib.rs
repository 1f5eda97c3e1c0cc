pub mod actors;
pub mod api;
pub mod classifier;
#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod escalation;
pub mod publisher;
pub mod stores;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health state of a field device.
///
/// `Maintenance` and `Shutdown` are manual-override states: they are only
/// ever entered through an operator action and the monitoring loop never
/// reclassifies a device while it is in one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceStatus {
    Live,
    Warning,
    Down,
    Maintenance,
    Shutdown,
}

impl DeviceStatus {
    /// True for states an operator set by hand.
    pub fn is_manual_override(&self) -> bool {
        matches!(self, DeviceStatus::Maintenance | DeviceStatus::Shutdown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Live => "LIVE",
            DeviceStatus::Warning => "WARNING",
            DeviceStatus::Down => "DOWN",
            DeviceStatus::Maintenance => "MAINTENANCE",
            DeviceStatus::Shutdown => "SHUTDOWN",
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualifier attached to a status.
///
/// `Active`/`Standby` only accompany `Live`; `ManualOverride`/`SiteShutdown`
/// are written by the operator override path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceSubStatus {
    Active,
    Standby,
    ManualOverride,
    SiteShutdown,
}

/// A monitored field device (fixed reader or handheld).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Stable identifier, unique and immutable
    pub id: String,

    /// Human-readable plaza/lane label, used in alert text
    pub location: Option<String>,

    /// Timestamp of the last observed transaction; `None` means never seen
    pub last_transaction: Option<DateTime<Utc>>,

    pub status: DeviceStatus,

    pub sub_status: Option<DeviceSubStatus>,
}

impl Device {
    /// Display label for logs and alert messages.
    pub fn label(&self) -> String {
        match &self.location {
            Some(location) => format!("{} ({location})", self.id),
            None => self.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCategory {
    DeviceOffline,
    Performance,
    Maintenance,
    Weather,
    Security,
}

/// A raised alert.
///
/// Alerts are created by the escalation policy or a manual operator action,
/// acknowledged and resolved with an audit trail, and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Store-assigned identifier
    pub id: u64,

    /// Affected device; `None` for system- or region-wide alerts
    pub device_id: Option<String>,

    pub alert_type: AlertType,

    pub category: AlertCategory,

    pub title: String,

    pub message: String,

    pub is_read: bool,

    pub is_resolved: bool,

    /// Opaque key/value bag capturing the triggering condition
    pub metadata: serde_json::Value,

    pub created_at: DateTime<Utc>,

    pub acknowledged_by: Option<String>,

    pub acknowledged_at: Option<DateTime<Utc>>,

    pub resolved_by: Option<String>,

    pub resolved_at: Option<DateTime<Utc>>,
}
