//! Book page endpoints
//!
//! Serves reconstructed OCR text and vocabulary analysis per page, and
//! starts the bulk OCR job for a whole book.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::analysis::ImageAnalysis;
use crate::ocr::OcrPage;
use crate::state::AppState;

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

impl ErrorResponse {
    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Response for a started OCR job
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrStartResponse {
    pub book_id: String,
    pub message: String,
}

/// Create the books router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:book_id/pages/:page/ocr", get(get_page_ocr))
        .route("/:book_id/pages/:page/analysis", get(get_page_analysis))
        .route("/:book_id/ocr", post(start_book_ocr))
}

/// Reconstructed OCR text model of one page
async fn get_page_ocr(
    State(state): State<AppState>,
    Path((book_id, page)): Path<(String, usize)>,
) -> Result<Json<OcrPage>, (StatusCode, Json<ErrorResponse>)> {
    let ocr_page = state
        .analysis()
        .page_ocr(&book_id, page)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to load OCR for {}/{}: {}", book_id, page, e);
            (
                e.status_code(),
                Json(ErrorResponse::with_details(
                    "Failed to load page OCR",
                    e.to_string(),
                )),
            )
        })?;

    Ok(Json(ocr_page))
}

/// Vocabulary analysis of one page
async fn get_page_analysis(
    State(state): State<AppState>,
    Path((book_id, page)): Path<(String, usize)>,
) -> Result<Json<ImageAnalysis>, (StatusCode, Json<ErrorResponse>)> {
    let analysis = state
        .analysis()
        .analyze_page(&book_id, page)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to analyze {}/{}: {}", book_id, page, e);
            (
                e.status_code(),
                Json(ErrorResponse::with_details(
                    "Failed to analyze page",
                    e.to_string(),
                )),
            )
        })?;

    Ok(Json(analysis))
}

/// Start the bulk OCR job for a book
///
/// Responds 409 while another book is being processed.
async fn start_book_ocr(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<(StatusCode, Json<OcrStartResponse>), (StatusCode, Json<ErrorResponse>)> {
    // Surface missing books before the job detaches.
    state.storage().list_pages(&book_id).await.map_err(|e| {
        tracing::warn!("Cannot OCR '{}': {}", book_id, e);
        (
            e.status_code(),
            Json(ErrorResponse::with_details(
                "Failed to start OCR",
                e.to_string(),
            )),
        )
    })?;

    state.ocr_job().start(&book_id).map_err(|e| {
        tracing::warn!("Cannot OCR '{}': {}", book_id, e);
        (
            e.status_code(),
            Json(ErrorResponse::with_details(
                "Failed to start OCR",
                e.to_string(),
            )),
        )
    })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(OcrStartResponse {
            book_id,
            message: "OCR started".to_string(),
        }),
    ))
}
