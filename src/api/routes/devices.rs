//! Device endpoints: listings, fleet snapshot, manual overrides
//!
//! Override requests are forwarded to the monitor actor rather than written
//! to the store directly, so they serialize with the monitoring pass.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::actors::messages::FleetSnapshot;
use crate::api::{error::ApiResult, state::ApiState};
use crate::{Device, stores::DeviceStore as _};

/// Body for maintenance/shutdown overrides
#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    /// Operator performing the action
    pub actor: String,

    /// Free-text justification, recorded on the alert
    pub reason: Option<String>,
}

/// Body for resume
#[derive(Debug, Deserialize)]
pub struct ResumeRequest {
    pub actor: String,
}

/// GET /api/v1/devices
pub async fn list_devices(State(state): State<ApiState>) -> ApiResult<Json<Value>> {
    let devices = state.devices.list_devices().await?;

    Ok(Json(json!({
        "count": devices.len(),
        "devices": devices,
    })))
}

/// GET /api/v1/devices/snapshot
///
/// Fleet counts by status, recomputed from the device store.
pub async fn fleet_snapshot(State(state): State<ApiState>) -> ApiResult<Json<FleetSnapshot>> {
    let snapshot = state.monitor.snapshot().await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/devices/:id/maintenance
pub async fn set_maintenance(
    State(state): State<ApiState>,
    Path(device_id): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> ApiResult<Json<Device>> {
    let device = state
        .monitor
        .set_maintenance(device_id, request.actor, request.reason)
        .await?;
    Ok(Json(device))
}

/// POST /api/v1/devices/:id/shutdown
pub async fn set_shutdown(
    State(state): State<ApiState>,
    Path(device_id): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> ApiResult<Json<Device>> {
    let device = state
        .monitor
        .set_shutdown(device_id, request.actor, request.reason)
        .await?;
    Ok(Json(device))
}

/// POST /api/v1/devices/:id/resume
pub async fn resume(
    State(state): State<ApiState>,
    Path(device_id): Path<String>,
    Json(request): Json<ResumeRequest>,
) -> ApiResult<Json<Device>> {
    let device = state.monitor.resume(device_id, request.actor).await?;
    Ok(Json(device))
}
