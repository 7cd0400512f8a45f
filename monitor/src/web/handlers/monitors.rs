// Monitor status endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

use super::common::{ApiResponse, ApiResult};
use crate::health::MonitorStatus;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: &'static str,
    pub machine_name: String,
    pub version: &'static str,
    pub monitors: usize,
}

pub async fn get_service_health(State(state): State<AppState>) -> ApiResult<ServiceHealth> {
    Ok(Json(ApiResponse::success(ServiceHealth {
        status: "ok",
        machine_name: state.config.machine_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        monitors: state.board.len(),
    })))
}

/// Latest status of every monitor
pub async fn get_all_monitors(State(state): State<AppState>) -> ApiResult<Vec<MonitorStatus>> {
    Ok(Json(ApiResponse::success(state.board.all())))
}

pub async fn get_monitor(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<MonitorStatus> {
    match state.board.get(&name) {
        Some(status) => Ok(Json(ApiResponse::success(status))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Monitor {} not found", name))),
        )),
    }
}
