//! jpdb endpoints
//!
//! Deck membership updates, deck listing, and the highlight rule set the
//! frontend colors words with.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::jpdb::{DeckId, DeckUpdateMode, HighlightRule, JpdbDeck};
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
#[serde(rename_all = "camelCase")]
struct DeckUpdateRequest {
    deck_id: DeckId,
    vid: u64,
    sid: u64,
    mode: DeckUpdateMode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDecksRequest {
    #[serde(default)]
    override_api_key: Option<String>,
}

/// Response for deck listing
#[derive(Serialize)]
pub struct DeckListResponse {
    pub decks: Vec<JpdbDeck>,
}

/// Create the jpdb router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/deck", post(update_deck))
        .route("/list-decks", post(list_decks))
        .route("/rules", get(get_rules))
}

/// Add or remove one word in a deck
async fn update_deck(
    State(state): State<AppState>,
    Json(request): Json<DeckUpdateRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .jpdb()
        .modify_deck(request.deck_id, request.vid, request.sid, request.mode)
        .await
        .map_err(|e| {
            tracing::warn!("Deck update failed: {}", e);
            (
                e.status_code(),
                Json(ErrorResponse::with_details(
                    "Failed to update deck",
                    e.to_string(),
                )),
            )
        })?;

    Ok(StatusCode::OK)
}

/// List the user's decks
async fn list_decks(
    State(state): State<AppState>,
    Json(request): Json<ListDecksRequest>,
) -> Result<Json<DeckListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let decks = state
        .jpdb()
        .list_decks(request.override_api_key.as_deref())
        .await
        .map_err(|e| {
            tracing::warn!("Deck listing failed: {}", e);
            (
                e.status_code(),
                Json(ErrorResponse::with_details(
                    "Failed to list decks",
                    e.to_string(),
                )),
            )
        })?;

    Ok(Json(DeckListResponse { decks }))
}

/// Highlight rule set for word coloring
async fn get_rules(State(state): State<AppState>) -> Json<Vec<HighlightRule>> {
    Json(state.highlight_rules().to_vec())
}
