//! Alert endpoints: listing, acknowledge, resolve
//!
//! Lifecycle mutations push a fresh `alerts_summary` to connected
//! dashboards so badge counts stay current without polling.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::Alert;
use crate::api::{error::ApiResult, state::ApiState};
use crate::publisher;
use crate::stores::AlertStore as _;

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Only alerts still awaiting resolution
    #[serde(default)]
    pub unresolved_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub actor: String,
}

/// GET /api/v1/alerts
pub async fn list_alerts(
    State(state): State<ApiState>,
    Query(query): Query<AlertQuery>,
) -> ApiResult<Json<Value>> {
    let alerts = state.alerts.list_alerts(query.unresolved_only).await?;

    Ok(Json(json!({
        "count": alerts.len(),
        "alerts": alerts,
    })))
}

/// POST /api/v1/alerts/:id/acknowledge
pub async fn acknowledge_alert(
    State(state): State<ApiState>,
    Path(alert_id): Path<u64>,
    Json(request): Json<ActorRequest>,
) -> ApiResult<Json<Alert>> {
    let alert = state
        .alerts
        .acknowledge_alert(alert_id, &request.actor)
        .await?;

    publisher::publish_alerts_summary(state.alerts.as_ref(), &state.push_tx).await;

    Ok(Json(alert))
}

/// POST /api/v1/alerts/:id/resolve
pub async fn resolve_alert(
    State(state): State<ApiState>,
    Path(alert_id): Path<u64>,
    Json(request): Json<ActorRequest>,
) -> ApiResult<Json<Alert>> {
    let alert = state.alerts.resolve_alert(alert_id, &request.actor).await?;

    publisher::publish_alerts_summary(state.alerts.as_ref(), &state.push_tx).await;

    Ok(Json(alert))
}
