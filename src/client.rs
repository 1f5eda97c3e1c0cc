//! WebSocket client for the realtime dashboard stream
//!
//! Dashboards own their resilience: on disconnect the client reconnects
//! with exponential backoff up to a bounded number of consecutive failures,
//! then gives up silently by closing its channel. The server keeps no
//! per-client state - there is no backlog to replay, the next snapshots
//! supersede whatever was missed.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, trace, warn};

use crate::publisher::PushMessage;

/// Reconnect behavior for a dashboard connection
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Consecutive failed attempts before giving up
    pub max_attempts: u32,

    /// Delay before the first retry
    pub base_delay: Duration,

    /// Ceiling for the doubled delay
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1-based): base doubled per
    /// failure, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Client for streaming push messages from the hub
pub struct DashboardClient {
    url: String,
    policy: ReconnectPolicy,
}

impl DashboardClient {
    pub fn new(api_url: &str) -> Self {
        // Convert http:// to ws:// and https:// to wss://
        let ws_url = api_url
            .replace("http://", "ws://")
            .replace("https://", "wss://");

        Self {
            url: format!("{}/api/v1/stream", ws_url.trim_end_matches('/')),
            policy: ReconnectPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Connect and start streaming messages.
    ///
    /// The receiver yields every push message, handshake included. It closes
    /// once reconnect attempts are exhausted or the receiver side hangs up.
    pub async fn connect(self) -> Result<mpsc::UnboundedReceiver<PushMessage>> {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(self.run(tx));

        Ok(rx)
    }

    async fn run(self, tx: mpsc::UnboundedSender<PushMessage>) {
        let mut failures = 0u32;

        loop {
            info!("connecting to stream: {}", self.url);

            match self.connect_once(&tx).await {
                Ok(()) => {
                    // served a session; start the backoff ladder fresh
                    failures = 0;
                    info!("stream disconnected, reconnecting");
                }
                Err(e) => {
                    failures += 1;
                    if failures >= self.policy.max_attempts {
                        debug!("giving up after {failures} failed attempts: {e:#}");
                        return;
                    }
                    warn!("stream connection failed (attempt {failures}): {e:#}");
                }
            }

            if tx.is_closed() {
                return;
            }

            tokio::time::sleep(self.policy.delay_for(failures.max(1))).await;
        }
    }

    async fn connect_once(&self, tx: &mpsc::UnboundedSender<PushMessage>) -> Result<()> {
        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("failed to connect to {}", self.url))?;

        info!("stream connected");

        let (_write, mut read) = ws_stream.split();

        while let Some(msg) = read.next().await {
            let msg = msg.context("websocket message error")?;

            match msg {
                Message::Text(text) => match serde_json::from_str::<PushMessage>(&text) {
                    Ok(message) => {
                        if tx.send(message).is_err() {
                            // receiver dropped, stop streaming
                            return Ok(());
                        }
                    }
                    Err(e) => {
                        warn!("failed to parse push message: {e}");
                        trace!("raw payload: {text}");
                    }
                },
                Message::Close(_) => {
                    info!("stream closed by server");
                    break;
                }
                _ => {
                    // ping/pong and binary frames carry nothing for us
                }
            }
        }

        Ok(())
    }
}
