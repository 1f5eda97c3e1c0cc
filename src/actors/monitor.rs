//! MonitorActor - keeps persisted device status consistent with the classifier
//!
//! The actor owns the periodic pass over the fleet plus every operator
//! mutation of device status. Running both through one command loop is what
//! enforces the two concurrency invariants:
//!
//! 1. Ticks never overlap - the next timer firing waits while a pass runs.
//! 2. A manual override never races a pass's read-modify-write for the same
//!    device. An override arriving mid-pass is applied right after the pass
//!    and wins; the next pass sees the override state and skips the device.
//!
//! ## Failure model
//!
//! - One device's store write failing (or timing out) skips that device for
//!   the pass; it is retried on the next one.
//! - Enumeration failing skips the whole pass; the loop stays on schedule.
//! - Neither is ever fatal to the actor.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tracing::{debug, info, instrument, trace, warn};

use crate::classifier::classify;
use crate::config::MonitorConfig;
use crate::escalation::EscalationPolicy;
use crate::publisher::{self, PushMessage, PushSender};
use crate::stores::{AlertStore, DeviceStore, StoreError, StoreResult};
use crate::{Device, DeviceStatus, DeviceSubStatus};

use super::messages::{FleetSnapshot, MonitorCommand, TickSummary};

/// Actor that runs the periodic status derivation pass
pub struct MonitorActor {
    devices: Arc<dyn DeviceStore>,

    alerts: Arc<dyn AlertStore>,

    policy: EscalationPolicy,

    config: MonitorConfig,

    /// Deadline for one device's classify+write step
    device_timeout: Duration,

    /// Broadcast sender for dashboard pushes
    push_tx: PushSender,

    /// Command receiver
    command_rx: mpsc::Receiver<MonitorCommand>,

    /// Start time of the most recent completed pass
    last_check: Option<chrono::DateTime<chrono::Utc>>,
}

impl MonitorActor {
    pub fn new(
        config: MonitorConfig,
        devices: Arc<dyn DeviceStore>,
        alerts: Arc<dyn AlertStore>,
        push_tx: PushSender,
        command_rx: mpsc::Receiver<MonitorCommand>,
    ) -> Self {
        Self {
            devices,
            alerts,
            policy: EscalationPolicy::new(config.thresholds),
            device_timeout: Duration::from_secs(config.device_timeout_secs),
            config,
            push_tx,
            command_rx,
            last_check: None,
        }
    }

    /// Run the actor's main loop
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!(
            "starting monitor actor (interval {}s)",
            self.config.tick_interval_secs
        );

        // first pass after one full period; TickNow covers "right now" needs
        let period = Duration::from_secs(self.config.tick_interval_secs);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Timer tick - one pass over the fleet
                _ = ticker.tick() => {
                    match self.run_tick().await {
                        Ok(summary) => trace!(
                            "pass complete: {} checked, {} updated, {} alerts, {} failures",
                            summary.checked, summary.updated, summary.alerts_raised, summary.failures
                        ),
                        // enumeration failed - skip this pass, stay on schedule
                        Err(e) => warn!("pass skipped: {e:#}"),
                    }
                }

                // Handle commands
                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        MonitorCommand::TickNow { respond_to } => {
                            let _ = respond_to.send(self.run_tick().await);
                        }

                        MonitorCommand::SetMaintenance { device_id, actor, reason, respond_to } => {
                            let result = self
                                .apply_override(
                                    &device_id,
                                    DeviceStatus::Maintenance,
                                    DeviceSubStatus::ManualOverride,
                                    &actor,
                                    reason.as_deref(),
                                )
                                .await;
                            let _ = respond_to.send(result);
                        }

                        MonitorCommand::SetShutdown { device_id, actor, reason, respond_to } => {
                            let result = self
                                .apply_override(
                                    &device_id,
                                    DeviceStatus::Shutdown,
                                    DeviceSubStatus::SiteShutdown,
                                    &actor,
                                    reason.as_deref(),
                                )
                                .await;
                            let _ = respond_to.send(result);
                        }

                        MonitorCommand::Resume { device_id, actor, respond_to } => {
                            let _ = respond_to.send(self.apply_resume(&device_id, &actor).await);
                        }

                        MonitorCommand::GetSnapshot { respond_to } => {
                            let _ = respond_to.send(self.snapshot().await);
                        }

                        MonitorCommand::UpdateInterval { interval_secs } => {
                            debug!("updating tick interval to {interval_secs}s");
                            self.config.tick_interval_secs = interval_secs;
                            let period = Duration::from_secs(interval_secs);
                            ticker = interval_at(Instant::now() + period, period);
                            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        }

                        MonitorCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                // Command channel closed
                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("monitor actor stopped");
    }

    /// One pass: classify every device not under a manual override and
    /// persist any change.
    #[instrument(skip(self))]
    async fn run_tick(&mut self) -> anyhow::Result<TickSummary> {
        let started_at = Utc::now();
        let devices = self
            .devices
            .list_devices()
            .await
            .context("device enumeration failed")?;

        let mut summary = TickSummary::new(started_at);

        for device in devices {
            // operator overrides suspend automatic classification entirely
            if device.status.is_manual_override() {
                continue;
            }
            summary.checked += 1;

            let (new_status, new_sub) =
                classify(device.last_transaction, started_at, &self.config.thresholds);
            if new_status == device.status && new_sub == device.sub_status {
                continue;
            }

            match timeout(
                self.device_timeout,
                self.apply_classification(&device, new_status, new_sub),
            )
            .await
            {
                Ok(Ok(alert_raised)) => {
                    summary.updated += 1;
                    if alert_raised {
                        summary.alerts_raised += 1;
                    }
                }
                Ok(Err(e)) => {
                    warn!("{}: status update failed, will retry next pass: {e}", device.id);
                    summary.failures += 1;
                }
                Err(_) => {
                    warn!(
                        "{}: status update timed out after {:?}",
                        device.id, self.device_timeout
                    );
                    summary.failures += 1;
                }
            }
        }

        // summary push goes out after all of this pass's mutations committed
        if summary.alerts_raised > 0 {
            publisher::publish_alerts_summary(self.alerts.as_ref(), &self.push_tx).await;
        }

        self.last_check = Some(started_at);
        Ok(summary)
    }

    /// Persist one device's new classification and raise any alert the
    /// escalation policy asks for. Returns whether an alert was recorded.
    async fn apply_classification(
        &self,
        device: &Device,
        new_status: DeviceStatus,
        new_sub: Option<DeviceSubStatus>,
    ) -> StoreResult<bool> {
        let updated = self
            .devices
            .update_device_status(&device.id, new_status, new_sub)
            .await?;

        debug!("{}: {} -> {}", device.id, device.status, new_status);

        let mut alert_raised = false;
        if let Some(draft) = self.policy.on_transition(device, device.status, new_status) {
            // the status change is already committed; a failed alert write
            // must not undo it
            match self.alerts.create_alert(draft).await {
                Ok(alert) => {
                    alert_raised = true;
                    debug!("{}: raised {:?} alert #{}", device.id, alert.alert_type, alert.id);
                }
                Err(e) => warn!("{}: failed to record alert: {e}", device.id),
            }
        }

        let _ = self
            .push_tx
            .send(PushMessage::device_metrics(updated, Some(device.status)));

        Ok(alert_raised)
    }

    /// Operator override: unconditionally write the target state and log it
    /// as an alert. Idempotent beyond alert noise.
    async fn apply_override(
        &self,
        device_id: &str,
        target: DeviceStatus,
        sub: DeviceSubStatus,
        actor: &str,
        reason: Option<&str>,
    ) -> StoreResult<Device> {
        let Some(device) = self.devices.get_device(device_id).await? else {
            return Err(StoreError::NotFound(format!("device {device_id}")));
        };

        let updated = self
            .devices
            .update_device_status(device_id, target, Some(sub))
            .await?;

        let draft = self.policy.manual_override(&device, target, actor, reason);
        if let Err(e) = self.alerts.create_alert(draft).await {
            warn!("{device_id}: failed to record override alert: {e}");
        }

        let _ = self
            .push_tx
            .send(PushMessage::device_metrics(updated.clone(), Some(device.status)));
        publisher::publish_alerts_summary(self.alerts.as_ref(), &self.push_tx).await;

        info!("{device_id}: {target} set by {actor}");
        Ok(updated)
    }

    /// Lift an override: reclassify from the last transaction right away so
    /// the device re-enters the automatic loop in a consistent state.
    async fn apply_resume(&self, device_id: &str, actor: &str) -> StoreResult<Device> {
        let Some(device) = self.devices.get_device(device_id).await? else {
            return Err(StoreError::NotFound(format!("device {device_id}")));
        };

        let (new_status, new_sub) =
            classify(device.last_transaction, Utc::now(), &self.config.thresholds);
        let updated = self
            .devices
            .update_device_status(device_id, new_status, new_sub)
            .await?;

        let draft = self.policy.resume(&device, new_status, actor);
        if let Err(e) = self.alerts.create_alert(draft).await {
            warn!("{device_id}: failed to record resume alert: {e}");
        }

        let _ = self
            .push_tx
            .send(PushMessage::device_metrics(updated.clone(), Some(device.status)));
        publisher::publish_alerts_summary(self.alerts.as_ref(), &self.push_tx).await;

        info!("{device_id}: monitoring resumed by {actor} ({new_status})");
        Ok(updated)
    }

    /// Fresh fleet counts straight from the store, never a cached copy.
    async fn snapshot(&self) -> StoreResult<FleetSnapshot> {
        let devices = self.devices.list_devices().await?;
        Ok(FleetSnapshot::from_devices(&devices, self.last_check))
    }
}

/// Handle for controlling the MonitorActor
#[derive(Clone)]
pub struct MonitorHandle {
    sender: mpsc::Sender<MonitorCommand>,
}

impl MonitorHandle {
    /// Spawn a new monitor actor
    pub fn spawn(
        config: MonitorConfig,
        devices: Arc<dyn DeviceStore>,
        alerts: Arc<dyn AlertStore>,
        push_tx: PushSender,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = MonitorActor::new(config, devices, alerts, push_tx, cmd_rx);
        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Run one pass immediately and wait for its summary.
    pub async fn tick_now(&self) -> anyhow::Result<TickSummary> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::TickNow { respond_to: tx })
            .await
            .context("monitor actor unavailable")?;
        rx.await.context("monitor actor dropped the request")?
    }

    pub async fn set_maintenance(
        &self,
        device_id: impl Into<String>,
        actor: impl Into<String>,
        reason: Option<String>,
    ) -> StoreResult<Device> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::SetMaintenance {
                device_id: device_id.into(),
                actor: actor.into(),
                reason,
                respond_to: tx,
            })
            .await
            .map_err(|_| StoreError::Unavailable("monitor actor unavailable".to_string()))?;
        rx.await
            .map_err(|_| StoreError::Unavailable("monitor actor dropped the request".to_string()))?
    }

    pub async fn set_shutdown(
        &self,
        device_id: impl Into<String>,
        actor: impl Into<String>,
        reason: Option<String>,
    ) -> StoreResult<Device> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::SetShutdown {
                device_id: device_id.into(),
                actor: actor.into(),
                reason,
                respond_to: tx,
            })
            .await
            .map_err(|_| StoreError::Unavailable("monitor actor unavailable".to_string()))?;
        rx.await
            .map_err(|_| StoreError::Unavailable("monitor actor dropped the request".to_string()))?
    }

    pub async fn resume(
        &self,
        device_id: impl Into<String>,
        actor: impl Into<String>,
    ) -> StoreResult<Device> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::Resume {
                device_id: device_id.into(),
                actor: actor.into(),
                respond_to: tx,
            })
            .await
            .map_err(|_| StoreError::Unavailable("monitor actor unavailable".to_string()))?;
        rx.await
            .map_err(|_| StoreError::Unavailable("monitor actor dropped the request".to_string()))?
    }

    /// Fleet counts by status, computed fresh.
    pub async fn snapshot(&self) -> StoreResult<FleetSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::GetSnapshot { respond_to: tx })
            .await
            .map_err(|_| StoreError::Unavailable("monitor actor unavailable".to_string()))?;
        rx.await
            .map_err(|_| StoreError::Unavailable("monitor actor dropped the request".to_string()))?
    }

    /// Update the tick period.
    pub async fn update_interval(&self, interval_secs: u64) {
        let _ = self
            .sender
            .send(MonitorCommand::UpdateInterval { interval_secs })
            .await;
    }

    /// Shut down the monitor actor.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(MonitorCommand::Shutdown).await;
    }
}
