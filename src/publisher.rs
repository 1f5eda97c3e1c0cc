//! Outbound push payloads for connected dashboards
//!
//! Every message on the realtime channel is a `{type, data, timestamp}`
//! envelope. Fan-out rides on a tokio broadcast channel: the monitor and
//! weather actors send, every websocket connection holds its own receiver.
//! Delivery is fire-and-forget - a send with no subscribers is normal, a
//! lagging subscriber has its backlog dropped by the channel rather than
//! stalling anyone else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

use crate::stores::{AlertStore, AlertSummary};
use crate::{Device, DeviceStatus};

/// Broadcast sender shared by all publishing tasks
pub type PushSender = broadcast::Sender<PushMessage>;

/// Default capacity for the push channel. Sized for a burst of per-device
/// updates from a single tick over a large fleet.
pub const PUSH_CHANNEL_CAPACITY: usize = 256;

pub fn push_channel() -> (PushSender, broadcast::Receiver<PushMessage>) {
    broadcast::channel(PUSH_CHANNEL_CAPACITY)
}

/// Snapshot of a single device, emitted when its status changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    #[serde(flatten)]
    pub device: Device,

    /// Status before the change, when known
    pub previous_status: Option<DeviceStatus>,
}

/// Synthesized weather snapshot for one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub site: String,
    pub conditions: String,
    pub temperature_c: f64,
    pub wind_kph: f64,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PushPayload {
    /// Handshake sent once per connection, before any snapshot
    Connected { server: String },

    DeviceMetrics(DeviceSnapshot),

    AlertsSummary(AlertSummary),

    WeatherUpdate(WeatherSnapshot),
}

/// The wire envelope: `{"type": ..., "data": ..., "timestamp": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(flatten)]
    pub payload: PushPayload,

    pub timestamp: DateTime<Utc>,
}

impl PushMessage {
    pub fn connected() -> Self {
        Self {
            payload: PushPayload::Connected {
                server: concat!("tollwatch-hub/", env!("CARGO_PKG_VERSION")).to_string(),
            },
            timestamp: Utc::now(),
        }
    }

    pub fn device_metrics(device: Device, previous_status: Option<DeviceStatus>) -> Self {
        Self {
            payload: PushPayload::DeviceMetrics(DeviceSnapshot {
                device,
                previous_status,
            }),
            timestamp: Utc::now(),
        }
    }

    pub fn alerts_summary(summary: AlertSummary) -> Self {
        Self {
            payload: PushPayload::AlertsSummary(summary),
            timestamp: Utc::now(),
        }
    }

    pub fn weather_update(snapshot: WeatherSnapshot) -> Self {
        Self {
            payload: PushPayload::WeatherUpdate(snapshot),
            timestamp: Utc::now(),
        }
    }
}

/// Recompute the alert summary and broadcast it.
///
/// Called after alert-creating ticks, manual overrides, and operator
/// acknowledge/resolve actions. A summary query failure only costs this
/// push; the next state change triggers a fresh one.
pub async fn publish_alerts_summary(alerts: &dyn AlertStore, push_tx: &PushSender) {
    match alerts.summary().await {
        Ok(summary) => {
            let _ = push_tx.send(PushMessage::alerts_summary(summary));
        }
        Err(e) => {
            warn!("failed to compute alert summary for push: {e}");
        }
    }
}
