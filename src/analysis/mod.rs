//! Text and page analysis
//!
//! Reconciles the two independent segmentations of a page: the OCR engine's
//! pixel-located symbols and the parse service's linguistic tokens. Text
//! analysis aligns tokens over the extracted text; page analysis also
//! projects the aligned tokens back onto symbol geometry for overlay
//! rendering.

mod image;
mod service;
mod text;

pub use image::{
    map_tokens_to_regions, ImageAnalysis, ImageAnalysisFragment, ImageAnalysisParagraph,
};
pub use service::{AnalysisService, TextAnalysis};
pub use text::{align_tokens, normalize_tokens, AnalysisToken, NO_VOCABULARY};

/// Analysis error types
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Jpdb(#[from] crate::jpdb::JpdbError),

    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),

    /// The aligned token stream and the page's symbols disagree. Raised
    /// loudly instead of rendering a misplaced overlay.
    #[error("token stream desynced from page symbols: {0}")]
    SymbolStreamDesync(String),
}

impl AnalysisError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::Jpdb(err) => err.status_code(),
            Self::Storage(err) => err.status_code(),
            Self::SymbolStreamDesync(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
