//! Text analysis endpoint
//!
//! Analyzes arbitrary text against the vocabulary service, for text hooked
//! from games or pasted by the user rather than OCRed from a page.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::analysis::TextAnalysis;
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

#[derive(Deserialize)]
struct AnalyzeParams {
    #[serde(default)]
    text: String,
}

/// Create the analyze router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(analyze_text))
}

/// Analyze a text snippet
async fn analyze_text(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Json<TextAnalysis>, (StatusCode, Json<ErrorResponse>)> {
    let analysis = state
        .analysis()
        .analyze_text(&params.text)
        .await
        .map_err(|e| {
            tracing::warn!("Text analysis failed: {}", e);
            (
                e.status_code(),
                Json(ErrorResponse::with_details(
                    "Failed to analyze text",
                    e.to_string(),
                )),
            )
        })?;

    Ok(Json(analysis))
}
