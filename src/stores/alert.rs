//! Alert store trait definition

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Alert;
use crate::escalation::AlertDraft;

use super::error::StoreResult;

/// Aggregate alert counts, pushed to dashboards as `alerts_summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total: usize,

    pub unread: usize,

    pub unresolved: usize,

    /// Unresolved counts broken down by type
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

/// Create/query/acknowledge/resolve access to alert records.
///
/// Alerts are append-only: acknowledge and resolve mutate flags and audit
/// fields, nothing is ever deleted, and a resolved alert refuses further
/// lifecycle changes. Notification fan-out (email/SMS/push) is a concern of
/// the store's downstream consumers - creating an alert must not block on
/// delivery.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Persist a draft, assigning id and creation time.
    async fn create_alert(&self, draft: AlertDraft) -> StoreResult<Alert>;

    /// Mark an alert read, recording the acting operator.
    async fn acknowledge_alert(&self, id: u64, actor: &str) -> StoreResult<Alert>;

    /// Mark an alert resolved, recording the acting operator.
    async fn resolve_alert(&self, id: u64, actor: &str) -> StoreResult<Alert>;

    /// List alerts, newest first.
    async fn list_alerts(&self, unresolved_only: bool) -> StoreResult<Vec<Alert>>;

    /// Aggregate counts for the dashboard summary push.
    async fn summary(&self) -> StoreResult<AlertSummary>;
}
