// Notification channel check

use axum::{extract::State, response::Json};
use tracing::info;

use super::common::{ApiResponse, ApiResult};
use crate::services::notify_service::{Notice, NoticeEvent};
use crate::web::AppState;

/// Push a test notice through the configured channel
pub async fn send_test_notification(State(state): State<AppState>) -> ApiResult<String> {
    info!("Test notification requested via API");
    let notice = Notice::new(
        &state.config.machine_name,
        NoticeEvent::Test,
        "Notification channel check",
    )
    .with_remark("Requested via status API");
    state.notifier.notify(notice).await;

    Ok(Json(ApiResponse::success(
        "Test notification dispatched".to_string(),
    )))
}
