//! OCR Module
//!
//! Turns page images into the paragraph → line → symbol model the reader
//! overlays on top of the page.
//!
//! The pipeline has two halves:
//! - the engine side (`engine`, `job`) sends page images to the recognition
//!   engine and persists the raw annotation trees it returns;
//! - the layout side (`annotation`, `layout`) rebuilds stored annotations
//!   into ordered paragraphs and lines with per-line writing direction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use yomeru_server::ocr::{reconstruct_page, ImageAnnotation};
//!
//! let annotation: ImageAnnotation = serde_json::from_slice(&raw)?;
//! let page = reconstruct_page(&annotation);
//! println!("{} characters on page", page.character_count);
//! ```

pub mod annotation;
mod engine;
pub mod geometry;
mod job;
mod layout;
mod types;

pub use annotation::ImageAnnotation;
pub use engine::{OcrEngine, VisionOcrEngine};
pub use geometry::{bounding_rectangle, union_rectangles, Rectangle};
pub use job::{OcrJobReport, OcrJobRunner, OcrJobStatus, PageFailure};
pub use layout::reconstruct_page;
pub use types::{OcrError, OcrLine, OcrPage, OcrParagraph, OcrSymbol, TextOrientation};

#[cfg(test)]
pub use engine::MockEngine;
