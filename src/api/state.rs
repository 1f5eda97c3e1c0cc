//! API shared state

use std::sync::Arc;

use crate::actors::monitor::MonitorHandle;
use crate::publisher::PushSender;
use crate::stores::{AlertStore, DeviceStore};

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Handle to the monitor actor for snapshots and manual overrides
    pub monitor: MonitorHandle,

    /// Device store for read-only listings
    pub devices: Arc<dyn DeviceStore>,

    /// Alert store for listings and acknowledge/resolve
    pub alerts: Arc<dyn AlertStore>,

    /// Broadcast sender for the realtime stream (WebSocket subscribers)
    pub push_tx: PushSender,
}

impl ApiState {
    pub fn new(
        monitor: MonitorHandle,
        devices: Arc<dyn DeviceStore>,
        alerts: Arc<dyn AlertStore>,
        push_tx: PushSender,
    ) -> Self {
        Self {
            monitor,
            devices,
            alerts,
            push_tx,
        }
    }
}
