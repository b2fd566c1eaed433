//! Raw recognition tree
//!
//! Wire types for the document-text annotation returned by the OCR engine:
//! a nested pages → blocks → paragraphs → words → symbols tree where every
//! symbol carries a bounding polygon and an optional detected-break
//! classification. This is the format persisted to disk per page and the
//! input of layout reconstruction.

use serde::{Deserialize, Serialize};

/// Top-level full-text annotation for one page image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageAnnotation {
    #[serde(default)]
    pub pages: Vec<AnnotationPage>,
    /// Engine-assembled plain text of the whole image.
    #[serde(default)]
    pub text: String,
}

impl ImageAnnotation {
    /// True when the engine recognized nothing on the page.
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|page| page.blocks.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationPage {
    #[serde(default)]
    pub blocks: Vec<AnnotationBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationBlock {
    #[serde(default)]
    pub paragraphs: Vec<AnnotationParagraph>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationParagraph {
    #[serde(default)]
    pub words: Vec<AnnotationWord>,
    #[serde(default)]
    pub bounding_box: Option<BoundingPoly>,
    #[serde(default)]
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationWord {
    #[serde(default)]
    pub symbols: Vec<AnnotationSymbol>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSymbol {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bounding_box: Option<BoundingPoly>,
    #[serde(default)]
    pub property: Option<TextProperty>,
}

impl AnnotationSymbol {
    /// The break detected after this symbol, if the engine reported one.
    pub fn detected_break(&self) -> Option<&DetectedBreak> {
        self.property.as_ref()?.detected_break.as_ref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProperty {
    #[serde(default)]
    pub detected_break: Option<DetectedBreak>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedBreak {
    #[serde(rename = "type", default)]
    pub break_type: BreakType,
}

impl DetectedBreak {
    /// Space-like breaks separate words within a line; everything else ends
    /// the line.
    pub fn is_space(&self) -> bool {
        self.break_type == BreakType::Space
    }
}

/// Detected-break classification as reported by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakType {
    #[default]
    Unknown,
    Space,
    SureSpace,
    EolSureSpace,
    Hyphen,
    LineBreak,
    /// Forward compatibility with break kinds this server does not know.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

/// Polygon vertex; the engine omits coordinates that are zero or unknown.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
}

impl Vertex {
    /// Coordinates with absent values defaulted to zero.
    pub fn point(&self) -> (f32, f32) {
        (self.x.unwrap_or(0.0), self.y.unwrap_or(0.0))
    }
}
