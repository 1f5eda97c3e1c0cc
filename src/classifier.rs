//! Status derivation from transaction age
//!
//! The classifier is a pure function: given the timestamp of a device's last
//! observed transaction and "now", it produces the status the device should
//! be in. It never looks at the device's current status - manual-override
//! handling is the monitoring loop's job.

use chrono::{DateTime, Utc};

use crate::config::StatusThresholds;
use crate::{DeviceStatus, DeviceSubStatus};

/// Derive `(status, sub_status)` from the age of the last transaction.
///
/// - never seen -> `(Down, None)`
/// - within `active_minutes` -> `(Live, active)`
/// - within `standby_minutes` -> `(Live, standby)`
/// - within `warning_minutes` -> `(Warning, None)`
/// - older -> `(Down, None)`
///
/// A last transaction in the future (clock skew between the ingest pipeline
/// and the monitor) is treated as age zero.
pub fn classify(
    last_transaction: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    thresholds: &StatusThresholds,
) -> (DeviceStatus, Option<DeviceSubStatus>) {
    let Some(last) = last_transaction else {
        return (DeviceStatus::Down, None);
    };

    let elapsed_secs = (now - last).num_seconds().max(0);

    if elapsed_secs <= thresholds.active_minutes * 60 {
        (DeviceStatus::Live, Some(DeviceSubStatus::Active))
    } else if elapsed_secs <= thresholds.standby_minutes * 60 {
        (DeviceStatus::Live, Some(DeviceSubStatus::Standby))
    } else if elapsed_secs <= thresholds.warning_minutes * 60 {
        (DeviceStatus::Warning, None)
    } else {
        (DeviceStatus::Down, None)
    }
}
