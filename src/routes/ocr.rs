//! OCR job endpoints

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::ocr::OcrJobStatus;
use crate::state::AppState;

/// Create the OCR router
pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}

/// Current bulk job status
async fn get_status(State(state): State<AppState>) -> Json<OcrJobStatus> {
    Json(state.ocr_job().status())
}
