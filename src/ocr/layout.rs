//! Layout reconstruction
//!
//! Turns the raw recognition tree into the ordered paragraph → line → symbol
//! model served to readers. Lines are cut wherever the engine detected a
//! non-space break, and each committed line is classified horizontal or
//! vertical from the spread of its symbol origins.

use crate::ocr::annotation::{AnnotationParagraph, ImageAnnotation};
use crate::ocr::geometry::bounding_rectangle;
use crate::ocr::types::{OcrLine, OcrPage, OcrParagraph, OcrSymbol, TextOrientation};

/// Rebuilds the paragraph model for one page image from its raw annotation.
///
/// Blocks of the first annotation page are flattened into a single ordered
/// paragraph list; paragraph ids are indices in that flattening order.
/// Paragraphs that recognized no symbols still appear, so ids stay aligned
/// with per-paragraph metadata kept elsewhere.
pub fn reconstruct_page(annotation: &ImageAnnotation) -> OcrPage {
    let paragraphs: Vec<OcrParagraph> = annotation
        .pages
        .first()
        .map(|page| {
            page.blocks
                .iter()
                .flat_map(|block| &block.paragraphs)
                .enumerate()
                .map(|(id, paragraph)| reconstruct_paragraph(id, paragraph))
                .collect()
        })
        .unwrap_or_default();

    let character_count = paragraphs
        .iter()
        .flat_map(|paragraph| &paragraph.lines)
        .flat_map(|line| &line.symbols)
        .map(|symbol| symbol.text.encode_utf16().count())
        .sum();

    OcrPage {
        paragraphs,
        character_count,
    }
}

fn reconstruct_paragraph(id: usize, paragraph: &AnnotationParagraph) -> OcrParagraph {
    let mut lines: Vec<OcrLine> = Vec::new();
    let mut buffer: Vec<OcrSymbol> = Vec::new();

    for word in &paragraph.words {
        for symbol in &word.symbols {
            let vertices = symbol
                .bounding_box
                .as_ref()
                .map(|poly| poly.vertices.as_slice())
                .unwrap_or_default();
            buffer.push(OcrSymbol {
                text: symbol.text.clone(),
                bounds: bounding_rectangle(vertices.iter().map(|vertex| vertex.point())),
            });
            // Space breaks separate words within a line; any other detected
            // break ends the line.
            if symbol.detected_break().is_some_and(|brk| !brk.is_space()) {
                commit_line(&mut lines, &mut buffer);
            }
        }
    }
    commit_line(&mut lines, &mut buffer);

    let points = paragraph
        .bounding_box
        .as_ref()
        .map(|poly| {
            poly.vertices
                .iter()
                .flat_map(|vertex| {
                    let (x, y) = vertex.point();
                    [x, y]
                })
                .collect()
        })
        .unwrap_or_default();

    OcrParagraph {
        id,
        confidence: paragraph.confidence,
        lines,
        points,
    }
}

fn commit_line(lines: &mut Vec<OcrLine>, buffer: &mut Vec<OcrSymbol>) {
    if buffer.is_empty() {
        return;
    }
    let orientation = line_orientation(buffer);
    lines.push(OcrLine {
        orientation,
        symbols: std::mem::take(buffer),
    });
}

/// The engine does not report writing direction, so it is inferred from the
/// envelope of the symbol origins: text running left-to-right scatters
/// origins along x, top-to-bottom along y. A line with no horizontal spread
/// (including a single symbol) reads as vertical.
fn line_orientation(symbols: &[OcrSymbol]) -> TextOrientation {
    let mut min_x = f32::MAX;
    let mut max_x = f32::MIN;
    let mut min_y = f32::MAX;
    let mut max_y = f32::MIN;
    for symbol in symbols {
        min_x = min_x.min(symbol.bounds.x);
        max_x = max_x.max(symbol.bounds.x);
        min_y = min_y.min(symbol.bounds.y);
        max_y = max_y.max(symbol.bounds.y);
    }
    if (max_x - min_x).abs() > (max_y - min_y).abs() {
        TextOrientation::Horizontal
    } else {
        TextOrientation::Vertical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::annotation::{
        AnnotationBlock, AnnotationPage, AnnotationSymbol, AnnotationWord, BoundingPoly,
        BreakType, DetectedBreak, TextProperty, Vertex,
    };

    fn vertex(x: f32, y: f32) -> Vertex {
        Vertex {
            x: Some(x),
            y: Some(y),
        }
    }

    fn symbol_at(text: &str, x: f32, y: f32, w: f32, h: f32) -> AnnotationSymbol {
        AnnotationSymbol {
            text: text.to_owned(),
            bounding_box: Some(BoundingPoly {
                vertices: vec![
                    vertex(x, y),
                    vertex(x + w, y),
                    vertex(x + w, y + h),
                    vertex(x, y + h),
                ],
            }),
            property: None,
        }
    }

    fn with_break(mut symbol: AnnotationSymbol, break_type: BreakType) -> AnnotationSymbol {
        symbol.property = Some(TextProperty {
            detected_break: Some(DetectedBreak { break_type }),
        });
        symbol
    }

    fn annotation_with_paragraphs(paragraphs: Vec<AnnotationParagraph>) -> ImageAnnotation {
        ImageAnnotation {
            pages: vec![AnnotationPage {
                blocks: vec![AnnotationBlock { paragraphs }],
            }],
            text: String::new(),
        }
    }

    #[test]
    fn three_symbols_without_breaks_form_one_horizontal_line() {
        let annotation = annotation_with_paragraphs(vec![AnnotationParagraph {
            words: vec![AnnotationWord {
                symbols: vec![
                    symbol_at("A", 0.0, 0.0, 8.0, 10.0),
                    symbol_at("B", 10.0, 0.0, 8.0, 10.0),
                    symbol_at("C", 20.0, 0.0, 8.0, 10.0),
                ],
            }],
            bounding_box: None,
            confidence: 0.9,
        }]);

        let page = reconstruct_page(&annotation);
        assert_eq!(page.paragraphs.len(), 1);
        let paragraph = &page.paragraphs[0];
        assert_eq!(paragraph.id, 0);
        assert_eq!(paragraph.lines.len(), 1);
        let line = &paragraph.lines[0];
        assert_eq!(line.symbols.len(), 3);
        assert_eq!(line.orientation, TextOrientation::Horizontal);
        assert_eq!(page.character_count, 3);
    }

    #[test]
    fn line_break_commits_a_line_and_space_does_not() {
        let annotation = annotation_with_paragraphs(vec![AnnotationParagraph {
            words: vec![AnnotationWord {
                symbols: vec![
                    symbol_at("a", 0.0, 0.0, 8.0, 10.0),
                    with_break(symbol_at("b", 10.0, 0.0, 8.0, 10.0), BreakType::Space),
                    with_break(symbol_at("c", 20.0, 0.0, 8.0, 10.0), BreakType::LineBreak),
                    symbol_at("d", 0.0, 14.0, 8.0, 10.0),
                ],
            }],
            bounding_box: None,
            confidence: 1.0,
        }]);

        let page = reconstruct_page(&annotation);
        let lines = &page.paragraphs[0].lines;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].symbols.len(), 3);
        assert_eq!(lines[1].symbols.len(), 1);
    }

    #[test]
    fn stacked_symbols_classify_as_vertical() {
        let annotation = annotation_with_paragraphs(vec![AnnotationParagraph {
            words: vec![AnnotationWord {
                symbols: vec![
                    symbol_at("縦", 100.0, 0.0, 20.0, 20.0),
                    symbol_at("書", 100.0, 24.0, 20.0, 20.0),
                    symbol_at("き", 100.0, 48.0, 20.0, 20.0),
                ],
            }],
            bounding_box: None,
            confidence: 1.0,
        }]);

        let page = reconstruct_page(&annotation);
        assert_eq!(
            page.paragraphs[0].lines[0].orientation,
            TextOrientation::Vertical
        );
    }

    #[test]
    fn single_symbol_line_defaults_to_vertical() {
        let annotation = annotation_with_paragraphs(vec![AnnotationParagraph {
            words: vec![AnnotationWord {
                symbols: vec![symbol_at("!", 5.0, 5.0, 30.0, 10.0)],
            }],
            bounding_box: None,
            confidence: 1.0,
        }]);

        let page = reconstruct_page(&annotation);
        assert_eq!(
            page.paragraphs[0].lines[0].orientation,
            TextOrientation::Vertical
        );
    }

    #[test]
    fn flattening_conserves_every_symbol_in_order() {
        let paragraph_a = AnnotationParagraph {
            words: vec![
                AnnotationWord {
                    symbols: vec![
                        symbol_at("吾", 0.0, 0.0, 10.0, 10.0),
                        with_break(symbol_at("輩", 0.0, 12.0, 10.0, 10.0), BreakType::LineBreak),
                    ],
                },
                AnnotationWord {
                    symbols: vec![symbol_at("は", 0.0, 24.0, 10.0, 10.0)],
                },
            ],
            bounding_box: None,
            confidence: 0.8,
        };
        let paragraph_b = AnnotationParagraph {
            words: vec![AnnotationWord {
                symbols: vec![
                    symbol_at("猫", 40.0, 0.0, 10.0, 10.0),
                    symbol_at("で", 52.0, 0.0, 10.0, 10.0),
                ],
            }],
            bounding_box: None,
            confidence: 0.8,
        };

        let raw_order: String = [&paragraph_a, &paragraph_b]
            .iter()
            .flat_map(|paragraph| &paragraph.words)
            .flat_map(|word| &word.symbols)
            .map(|symbol| symbol.text.as_str())
            .collect();

        let annotation = annotation_with_paragraphs(vec![paragraph_a.clone(), paragraph_b.clone()]);
        let page = reconstruct_page(&annotation);
        let reconstructed: String = page
            .paragraphs
            .iter()
            .flat_map(|paragraph| &paragraph.lines)
            .flat_map(|line| &line.symbols)
            .map(|symbol| symbol.text.as_str())
            .collect();

        assert_eq!(reconstructed, raw_order);
    }

    #[test]
    fn empty_paragraph_is_preserved_for_index_alignment() {
        let annotation = annotation_with_paragraphs(vec![
            AnnotationParagraph {
                words: vec![],
                bounding_box: None,
                confidence: 0.0,
            },
            AnnotationParagraph {
                words: vec![AnnotationWord {
                    symbols: vec![symbol_at("x", 0.0, 0.0, 5.0, 5.0)],
                }],
                bounding_box: None,
                confidence: 0.5,
            },
        ]);

        let page = reconstruct_page(&annotation);
        assert_eq!(page.paragraphs.len(), 2);
        assert!(page.paragraphs[0].lines.is_empty());
        assert_eq!(page.paragraphs[1].id, 1);
    }

    #[test]
    fn missing_bounding_data_defaults_to_zero() {
        let annotation = annotation_with_paragraphs(vec![AnnotationParagraph {
            words: vec![AnnotationWord {
                symbols: vec![AnnotationSymbol {
                    text: "?".to_owned(),
                    bounding_box: None,
                    property: None,
                }],
            }],
            bounding_box: Some(BoundingPoly {
                vertices: vec![Vertex { x: Some(3.0), y: None }],
            }),
            confidence: 1.0,
        }]);

        let page = reconstruct_page(&annotation);
        let paragraph = &page.paragraphs[0];
        let bounds = paragraph.lines[0].symbols[0].bounds;
        assert_eq!((bounds.x, bounds.y, bounds.w, bounds.h), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(paragraph.points, vec![3.0, 0.0]);
    }

    #[test]
    fn character_count_uses_utf16_units() {
        let annotation = annotation_with_paragraphs(vec![AnnotationParagraph {
            words: vec![AnnotationWord {
                symbols: vec![
                    symbol_at("𠮷", 0.0, 0.0, 10.0, 10.0),
                    symbol_at("野", 12.0, 0.0, 10.0, 10.0),
                ],
            }],
            bounding_box: None,
            confidence: 1.0,
        }]);

        // "𠮷" is an astral character occupying two UTF-16 units.
        assert_eq!(reconstruct_page(&annotation).character_count, 3);
    }
}
