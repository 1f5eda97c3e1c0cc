//! Alert escalation policy
//!
//! Decides whether a status transition warrants an alert and synthesizes the
//! alert content. The rule for automatic transitions: alert only on
//! downgrades (a strict drop in status priority). Recoveries are silent -
//! a fleet coming back after an outage must not flood operators.
//!
//! Manual overrides are outside the downgrade rule: operator actions are
//! always logged as alerts, tagged with the initiating actor.

use serde_json::json;

use crate::config::StatusThresholds;
use crate::{AlertCategory, AlertType, Device, DeviceStatus};

/// Severity order used by the downgrade rule. Higher is healthier.
pub fn priority(status: DeviceStatus) -> u8 {
    match status {
        DeviceStatus::Live => 3,
        DeviceStatus::Warning => 2,
        DeviceStatus::Down => 1,
        DeviceStatus::Maintenance | DeviceStatus::Shutdown => 0,
    }
}

/// An alert the policy wants raised. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub device_id: Option<String>,
    pub alert_type: AlertType,
    pub category: AlertCategory,
    pub title: String,
    pub message: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct EscalationPolicy {
    thresholds: StatusThresholds,
}

impl EscalationPolicy {
    pub fn new(thresholds: StatusThresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate an automatic `old -> new` transition.
    ///
    /// Returns a draft only when the transition is a degradation
    /// (`priority(new) < priority(old)`). The classifier only ever produces
    /// `Live`/`Warning`/`Down`, so the manual-override states never show up
    /// as `new` here; they go through [`Self::manual_override`].
    pub fn on_transition(
        &self,
        device: &Device,
        old: DeviceStatus,
        new: DeviceStatus,
    ) -> Option<AlertDraft> {
        if priority(new) >= priority(old) {
            return None;
        }

        let metadata = json!({
            "old_status": old,
            "new_status": new,
            "last_transaction": device.last_transaction,
        });

        match new {
            DeviceStatus::Warning => Some(AlertDraft {
                device_id: Some(device.id.clone()),
                alert_type: AlertType::Warning,
                category: AlertCategory::Performance,
                title: "Device Communication Warning".to_string(),
                message: format!(
                    "Device {} has not reported a transaction in over {} minutes",
                    device.label(),
                    self.thresholds.standby_minutes
                ),
                metadata,
            }),
            DeviceStatus::Down => Some(AlertDraft {
                device_id: Some(device.id.clone()),
                alert_type: AlertType::Critical,
                category: AlertCategory::DeviceOffline,
                title: "Device Offline".to_string(),
                message: format!(
                    "Device {} has been offline for more than {} minutes and requires immediate attention",
                    device.label(),
                    self.thresholds.warning_minutes
                ),
                metadata,
            }),
            // reached only by the manual path, which carries its own alert
            DeviceStatus::Live | DeviceStatus::Maintenance | DeviceStatus::Shutdown => None,
        }
    }

    /// Synthesize the alert for a manual override. Always produced,
    /// regardless of the downgrade rule.
    pub fn manual_override(
        &self,
        device: &Device,
        target: DeviceStatus,
        actor: &str,
        reason: Option<&str>,
    ) -> AlertDraft {
        let metadata = json!({
            "old_status": device.status,
            "new_status": target,
            "actor": actor,
            "reason": reason,
        });

        let reason_suffix = match reason {
            Some(reason) => format!(": {reason}"),
            None => String::new(),
        };

        match target {
            DeviceStatus::Shutdown => AlertDraft {
                device_id: Some(device.id.clone()),
                alert_type: AlertType::Warning,
                category: AlertCategory::Maintenance,
                title: "Device Shutdown".to_string(),
                message: format!(
                    "Device {} was shut down by {actor}{reason_suffix}",
                    device.label()
                ),
                metadata,
            },
            _ => AlertDraft {
                device_id: Some(device.id.clone()),
                alert_type: AlertType::Info,
                category: AlertCategory::Maintenance,
                title: "Device Maintenance Mode".to_string(),
                message: format!(
                    "Device {} was placed in maintenance mode by {actor}{reason_suffix}",
                    device.label()
                ),
                metadata,
            },
        }
    }

    /// Synthesize the alert for a resume action (override lifted, automatic
    /// classification back in charge).
    pub fn resume(&self, device: &Device, new: DeviceStatus, actor: &str) -> AlertDraft {
        AlertDraft {
            device_id: Some(device.id.clone()),
            alert_type: AlertType::Info,
            category: AlertCategory::Maintenance,
            title: "Device Monitoring Resumed".to_string(),
            message: format!(
                "Device {} was returned to automatic monitoring by {actor}",
                device.label()
            ),
            metadata: json!({
                "old_status": device.status,
                "new_status": new,
                "actor": actor,
            }),
        }
    }
}
