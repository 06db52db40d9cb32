//! Fault API endpoints
//!
//! `POST /` installs a fault, `DELETE /` removes every installed fault

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use metrics::increment_counter;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::AppState;
use crate::error::{AppError, AppResult};

/// Install a fault
#[utoipa::path(
    post,
    path = "/",
    tag = "faults",
    request_body = crate::fault::FaultRequest,
    responses(
        (status = 200, description = "Fault installed, empty object body"),
        (status = 400, description = "Invalid JSON, unknown type or field errors", body = super::openapi::ErrorsResponse),
        (status = 500, description = "A shell command failed on the agent", body = String),
    )
)]
pub async fn add(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Value>> {
    let _guard = state.request_lock.lock().await;

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Rejected fault request: {}", e);
            increment_counter!("saboteur_faults_rejected_total");
            return Err(AppError::InvalidJson);
        }
    };

    match state.agent.add_fault(&payload).await {
        Ok(fault) => {
            increment_counter!(
                "saboteur_faults_added_total",
                "type" => fault.fault_type().to_string()
            );
            Ok(Json(json!({})))
        }
        Err(e) => {
            match &e {
                AppError::ShellFailure { .. } | AppError::Internal(_) => {
                    let fault_type = payload
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    increment_counter!("saboteur_fault_failures_total", "type" => fault_type);
                }
                _ => {
                    info!("Rejected fault request: {}", e);
                    increment_counter!("saboteur_faults_rejected_total");
                }
            }
            Err(e)
        }
    }
}

/// Remove all faults. Always succeeds.
#[utoipa::path(
    delete,
    path = "/",
    tag = "faults",
    responses(
        (status = 200, description = "Firewall flushed and qdiscs removed, empty body"),
    )
)]
pub async fn reset(State(state): State<AppState>) -> StatusCode {
    let _guard = state.request_lock.lock().await;

    let results = state.agent.reset().await;
    let failed = results.iter().filter(|r| !r.success()).count();
    info!(
        "Reset complete ({} commands, {} non-zero exits ignored)",
        results.len(),
        failed
    );
    increment_counter!("saboteur_resets_total");

    StatusCode::OK
}
