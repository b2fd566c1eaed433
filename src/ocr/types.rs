//! OCR page model
//!
//! The reconstructed Paragraph → Line → Symbol structure produced from a raw
//! recognition tree. All coordinates are raw page-image pixels; the reader
//! frontend scales them to the displayed size.

use serde::{Deserialize, Serialize};

use super::geometry::Rectangle;

/// Writing direction of one recognized line.
///
/// The recognition engine does not report writing direction, so this is
/// derived from the line's symbol envelope during layout reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOrientation {
    Horizontal,
    Vertical,
}

/// Wire row for a symbol: `[text, x, y, w, h]`.
///
/// Page payloads carry thousands of symbols, so they are serialized as
/// positional arrays instead of objects. Field order is part of the wire
/// contract with the reader frontend.
#[derive(Serialize, Deserialize)]
struct PackedSymbol(String, f32, f32, f32, f32);

/// Smallest OCR-recognized text unit (roughly one glyph) with its bounding
/// rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PackedSymbol", into = "PackedSymbol")]
pub struct OcrSymbol {
    pub text: String,
    pub bounds: Rectangle,
}

impl From<PackedSymbol> for OcrSymbol {
    fn from(packed: PackedSymbol) -> Self {
        let PackedSymbol(text, x, y, w, h) = packed;
        OcrSymbol {
            text,
            bounds: Rectangle::new(x, y, w, h),
        }
    }
}

impl From<OcrSymbol> for PackedSymbol {
    fn from(symbol: OcrSymbol) -> Self {
        let Rectangle { x, y, w, h } = symbol.bounds;
        PackedSymbol(symbol.text, x, y, w, h)
    }
}

/// Ordered run of symbols sharing one writing direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub orientation: TextOrientation,
    pub symbols: Vec<OcrSymbol>,
}

/// One recognized paragraph: ordered lines plus the engine-reported outline
/// polygon and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrParagraph {
    /// Index of this paragraph in block-flattening order.
    pub id: usize,
    pub confidence: f32,
    pub lines: Vec<OcrLine>,
    /// Outline polygon as a flat `[x0, y0, x1, y1, ...]` vertex list.
    pub points: Vec<f32>,
}

/// Full OCR result for one page image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrPage {
    pub paragraphs: Vec<OcrParagraph>,
    /// Total symbol text length in UTF-16 code units, used by the frontend
    /// for reading-speed statistics.
    pub character_count: usize,
}

impl OcrPage {
    /// Text of the page as the vocabulary analyzer consumes it: paragraph
    /// symbol texts concatenated, paragraphs joined with `\n`. Literal
    /// newline symbols emitted by some engines are dropped so the only line
    /// breaks in the output are the paragraph separators.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|paragraph| {
                paragraph
                    .lines
                    .iter()
                    .flat_map(|line| &line.symbols)
                    .map(|symbol| symbol.text.as_str())
                    .filter(|text| *text != "\n")
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("no OCR engine is configured")]
    NotConfigured,

    #[error("OCR request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR engine returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("an OCR job is already running")]
    JobAlreadyRunning,

    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),
}

impl OcrError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::Request(_) | Self::Api { .. } => StatusCode::BAD_GATEWAY,
            Self::JobAlreadyRunning => StatusCode::CONFLICT,
            Self::Storage(err) => err.status_code(),
        }
    }
}
