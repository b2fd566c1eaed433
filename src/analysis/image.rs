//! Image region mapping
//!
//! Replays a page's aligned token stream against its reconstructed
//! paragraphs, pairing each token character with the next symbol in
//! paragraph order. The output is highlight geometry: one fragment per
//! token-and-line stretch, grouped into paragraphs for the overlay
//! renderer.
//!
//! The caller guarantees that the token stream was aligned against exactly
//! the text of these paragraphs. When that does not hold the cursors run
//! out of symbols mid-token, which is reported as a desync error instead
//! of producing a misplaced overlay.

use serde::{Deserialize, Serialize};

use crate::jpdb::JpdbVocabulary;
use crate::ocr::{union_rectangles, OcrParagraph, OcrSymbol, Rectangle, TextOrientation};

use super::text::AnalysisToken;
use super::AnalysisError;

/// Highlight geometry for one token stretch within a single line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysisFragment {
    pub vocabulary_index: i32,
    /// Union of the member symbol rectangles.
    pub bounds: Rectangle,
    pub orientation: TextOrientation,
    pub symbols: Vec<OcrSymbol>,
}

/// Fragments of one source paragraph, keeping its id and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysisParagraph {
    pub id: usize,
    pub confidence: f32,
    pub fragments: Vec<ImageAnalysisFragment>,
}

/// Vocabulary analysis of one page image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub paragraphs: Vec<ImageAnalysisParagraph>,
    pub vocabulary: Vec<JpdbVocabulary>,
}

/// Walk the token stream over the page's paragraphs. Line break markers
/// close the current paragraph; every other token consumes one symbol per
/// UTF-16 unit of its text, the unit token lengths are counted in.
/// Paragraphs that contribute no fragments are absent from the result.
pub fn map_tokens_to_regions(
    paragraphs: &[OcrParagraph],
    tokens: &[AnalysisToken],
) -> Result<Vec<ImageAnalysisParagraph>, AnalysisError> {
    let mut mapped = Vec::new();
    let mut pending: Vec<ImageAnalysisFragment> = Vec::new();
    let mut stream = SymbolStream::new(paragraphs);

    for token in tokens {
        if token.is_line_break() {
            commit_paragraph(&mut mapped, &mut pending, &stream)?;
            stream.next_paragraph();
        } else {
            let count = token.text.encode_utf16().count();
            pending.extend(stream.next_symbols(count, token.vocabulary_index)?);
        }
    }
    commit_paragraph(&mut mapped, &mut pending, &stream)?;

    Ok(mapped)
}

fn commit_paragraph(
    mapped: &mut Vec<ImageAnalysisParagraph>,
    pending: &mut Vec<ImageAnalysisFragment>,
    stream: &SymbolStream<'_>,
) -> Result<(), AnalysisError> {
    if pending.is_empty() {
        return Ok(());
    }
    let paragraph = stream.current_paragraph().ok_or_else(|| stream.desync())?;
    mapped.push(ImageAnalysisParagraph {
        id: paragraph.id,
        confidence: paragraph.confidence,
        fragments: std::mem::take(pending),
    });
    Ok(())
}

/// Cursor over a page's symbols in paragraph, line, symbol order.
struct SymbolStream<'a> {
    paragraphs: &'a [OcrParagraph],
    paragraph_index: usize,
    line_index: usize,
    symbol_index: usize,
}

impl<'a> SymbolStream<'a> {
    fn new(paragraphs: &'a [OcrParagraph]) -> Self {
        Self {
            paragraphs,
            paragraph_index: 0,
            line_index: 0,
            symbol_index: 0,
        }
    }

    fn current_paragraph(&self) -> Option<&'a OcrParagraph> {
        self.paragraphs.get(self.paragraph_index)
    }

    fn next_paragraph(&mut self) {
        self.paragraph_index += 1;
        self.line_index = 0;
        self.symbol_index = 0;
    }

    /// Consume `count` symbols for one token. Fragments never span lines:
    /// exhausting a line closes the buffered symbols with that line's
    /// orientation, and any remainder closes against the line the cursor
    /// stops in.
    fn next_symbols(
        &mut self,
        count: usize,
        vocabulary_index: i32,
    ) -> Result<Vec<ImageAnalysisFragment>, AnalysisError> {
        let mut fragments = Vec::new();
        let mut pending: Vec<OcrSymbol> = Vec::new();

        let paragraph = self.current_paragraph().ok_or_else(|| self.desync())?;
        for _ in 0..count {
            let line = paragraph
                .lines
                .get(self.line_index)
                .ok_or_else(|| self.desync())?;
            let symbol = line
                .symbols
                .get(self.symbol_index)
                .ok_or_else(|| self.desync())?;
            pending.push(symbol.clone());
            self.symbol_index += 1;
            if self.symbol_index >= line.symbols.len() {
                fragments.push(close_fragment(
                    &mut pending,
                    line.orientation,
                    vocabulary_index,
                ));
                self.line_index += 1;
                self.symbol_index = 0;
            }
        }
        if !pending.is_empty() {
            let orientation = paragraph
                .lines
                .get(self.line_index)
                .map(|line| line.orientation)
                .ok_or_else(|| self.desync())?;
            fragments.push(close_fragment(&mut pending, orientation, vocabulary_index));
        }

        Ok(fragments)
    }

    fn desync(&self) -> AnalysisError {
        AnalysisError::SymbolStreamDesync(format!(
            "ran out of symbols at paragraph {}, line {}, symbol {}",
            self.paragraph_index, self.line_index, self.symbol_index
        ))
    }
}

fn close_fragment(
    pending: &mut Vec<OcrSymbol>,
    orientation: TextOrientation,
    vocabulary_index: i32,
) -> ImageAnalysisFragment {
    let symbols = std::mem::take(pending);
    ImageAnalysisFragment {
        vocabulary_index,
        bounds: union_rectangles(symbols.iter().map(|symbol| &symbol.bounds)),
        orientation,
        symbols,
    }
}
