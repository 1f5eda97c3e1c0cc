//! WeatherActor - slow-cadence environment snapshots for dashboards
//!
//! Publishes a `weather_update` push for each configured site on a slow
//! period (hourly by default). Conditions are synthesized deterministically
//! from the site and the hour - the real upstream feed is an external
//! integration owned by another service, and dashboards only need a
//! plausible, steady trickle of environment context.

use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, instrument, trace, warn};

use crate::config::WeatherConfig;
use crate::publisher::{PushMessage, PushSender, WeatherSnapshot};

use super::messages::WeatherCommand;

const CONDITIONS: [&str; 6] = [
    "Clear",
    "Partly Cloudy",
    "Overcast",
    "Light Rain",
    "Fog",
    "Windy",
];

/// Actor that periodically publishes weather snapshots
pub struct WeatherActor {
    config: WeatherConfig,

    push_tx: PushSender,

    command_rx: mpsc::Receiver<WeatherCommand>,
}

impl WeatherActor {
    pub fn new(
        config: WeatherConfig,
        push_tx: PushSender,
        command_rx: mpsc::Receiver<WeatherCommand>,
    ) -> Self {
        Self {
            config,
            push_tx,
            command_rx,
        }
    }

    /// Run the actor's main loop
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!(
            "starting weather actor ({} sites, interval {}s)",
            self.config.sites.len(),
            self.config.interval_secs
        );

        let mut ticker = interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.publish_snapshots();
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        WeatherCommand::PublishNow { respond_to } => {
                            let published = self.publish_snapshots();
                            let _ = respond_to.send(published);
                        }

                        WeatherCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("weather actor stopped");
    }

    fn publish_snapshots(&self) -> usize {
        let now = Utc::now();
        for site in &self.config.sites {
            let snapshot = synthesize(site, now);
            trace!("{site}: {} {:.1}C", snapshot.conditions, snapshot.temperature_c);
            let _ = self.push_tx.send(PushMessage::weather_update(snapshot));
        }
        self.config.sites.len()
    }
}

/// Deterministic per-site, per-hour conditions.
fn synthesize(site: &str, now: DateTime<Utc>) -> WeatherSnapshot {
    let site_seed: u64 = site.bytes().map(u64::from).sum();
    let hour = u64::from(now.hour());
    let seed = site_seed.wrapping_mul(31).wrapping_add(hour);

    let conditions = CONDITIONS[(seed % CONDITIONS.len() as u64) as usize];
    // mild diurnal swing around a site-specific base
    let base = 8.0 + (site_seed % 15) as f64;
    let swing = ((hour as f64 - 14.0).abs() / 14.0) * -6.0;
    let temperature_c = base + swing;
    let wind_kph = (seed % 40) as f64;

    WeatherSnapshot {
        site: site.to_string(),
        conditions: conditions.to_string(),
        temperature_c,
        wind_kph,
        observed_at: now,
    }
}

/// Handle for controlling the WeatherActor
#[derive(Clone)]
pub struct WeatherHandle {
    sender: mpsc::Sender<WeatherCommand>,
}

impl WeatherHandle {
    /// Spawn a new weather actor
    pub fn spawn(config: WeatherConfig, push_tx: PushSender) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);

        let actor = WeatherActor::new(config, push_tx, cmd_rx);
        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Publish a snapshot for every site now; returns how many went out.
    pub async fn publish_now(&self) -> Option<usize> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(WeatherCommand::PublishNow { respond_to: tx })
            .await
            .ok()?;
        rx.await.ok()
    }

    /// Shut down the weather actor.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(WeatherCommand::Shutdown).await;
    }
}
