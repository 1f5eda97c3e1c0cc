//! Message types for actor communication
//!
//! Commands are request/response messages sent to a specific actor via mpsc;
//! responses come back over oneshot channels. Everything pushed to multiple
//! consumers goes through the broadcast envelope in [`crate::publisher`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;

use crate::stores::StoreResult;
use crate::{Device, DeviceStatus};

/// Commands accepted by the monitor actor
#[derive(Debug)]
pub enum MonitorCommand {
    /// Run one pass immediately (bypassing the interval timer)
    ///
    /// Used by tests and manual refresh operations.
    TickNow {
        respond_to: oneshot::Sender<anyhow::Result<TickSummary>>,
    },

    /// Operator override: suspend automatic classification and park the
    /// device in MAINTENANCE
    SetMaintenance {
        device_id: String,
        actor: String,
        reason: Option<String>,
        respond_to: oneshot::Sender<StoreResult<Device>>,
    },

    /// Operator override: park the device in SHUTDOWN
    SetShutdown {
        device_id: String,
        actor: String,
        reason: Option<String>,
        respond_to: oneshot::Sender<StoreResult<Device>>,
    },

    /// Lift an override: reclassify immediately and hand the device back to
    /// the automatic loop
    Resume {
        device_id: String,
        actor: String,
        respond_to: oneshot::Sender<StoreResult<Device>>,
    },

    /// Fresh per-status fleet counts, recomputed from the device store
    GetSnapshot {
        respond_to: oneshot::Sender<StoreResult<FleetSnapshot>>,
    },

    /// Update the tick period
    ///
    /// The new interval takes effect immediately.
    UpdateInterval { interval_secs: u64 },

    /// Gracefully shut down the monitor
    Shutdown,
}

/// Commands accepted by the weather actor
#[derive(Debug)]
pub enum WeatherCommand {
    /// Publish a snapshot for every site now
    PublishNow { respond_to: oneshot::Sender<usize> },

    /// Gracefully shut down the weather actor
    Shutdown,
}

/// What one monitoring pass did. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    /// When the pass started; classification is evaluated against this
    pub started_at: DateTime<Utc>,

    /// Devices considered (manual-override devices are skipped, not counted)
    pub checked: usize,

    /// Devices whose status pair was rewritten
    pub updated: usize,

    /// Alerts raised by the escalation policy
    pub alerts_raised: usize,

    /// Devices skipped due to a store error or timeout; retried next pass
    pub failures: usize,
}

impl TickSummary {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            checked: 0,
            updated: 0,
            alerts_raised: 0,
            failures: 0,
        }
    }
}

/// Per-status device counts, computed fresh on demand
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetSnapshot {
    pub total: usize,
    pub live: usize,
    pub warning: usize,
    pub down: usize,
    pub maintenance: usize,
    pub shutdown: usize,

    /// Start time of the most recent completed pass
    pub last_check: Option<DateTime<Utc>>,
}

impl FleetSnapshot {
    pub fn from_devices(devices: &[Device], last_check: Option<DateTime<Utc>>) -> Self {
        let mut snapshot = Self {
            total: devices.len(),
            last_check,
            ..Default::default()
        };

        for device in devices {
            match device.status {
                DeviceStatus::Live => snapshot.live += 1,
                DeviceStatus::Warning => snapshot.warning += 1,
                DeviceStatus::Down => snapshot.down += 1,
                DeviceStatus::Maintenance => snapshot.maintenance += 1,
                DeviceStatus::Shutdown => snapshot.shutdown += 1,
            }
        }

        snapshot
    }
}
