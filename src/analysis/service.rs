//! Analysis service
//!
//! Ties the pipeline together: stored annotations are reconstructed into
//! page models, page text goes through the parse client, and the aligned
//! tokens are mapped back onto the page's symbol geometry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::jpdb::{JpdbClient, JpdbVocabulary};
use crate::ocr::{reconstruct_page, OcrPage};
use crate::storage::BookStorage;

use super::image::{map_tokens_to_regions, ImageAnalysis};
use super::text::{align_tokens, normalize_tokens, AnalysisToken};
use super::AnalysisError;

/// Vocabulary analysis of one plain text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub tokens: Vec<AnalysisToken>,
    pub vocabulary: Vec<JpdbVocabulary>,
}

pub struct AnalysisService {
    jpdb: JpdbClient,
    storage: Arc<dyn BookStorage>,
}

impl AnalysisService {
    pub fn new(jpdb: JpdbClient, storage: Arc<dyn BookStorage>) -> Self {
        Self { jpdb, storage }
    }

    /// Parse arbitrary text and align the result into a covering token
    /// sequence. Empty text never reaches the network.
    pub async fn analyze_text(&self, text: &str) -> Result<TextAnalysis, AnalysisError> {
        if text.is_empty() {
            return Ok(TextAnalysis::default());
        }
        let parsed = self.jpdb.parse(text).await?;
        let aligned = align_tokens(text, &parsed.tokens);
        Ok(TextAnalysis {
            tokens: normalize_tokens(aligned),
            vocabulary: parsed.vocabulary.clone(),
        })
    }

    /// Reconstruct the stored OCR annotation of one page into the paragraph
    /// model.
    pub async fn page_ocr(&self, book_id: &str, page: usize) -> Result<OcrPage, AnalysisError> {
        let annotation = self.storage.read_annotation(book_id, page).await?;
        Ok(reconstruct_page(&annotation))
    }

    /// Analyze one page image: the reconstructed text goes through the
    /// parser, and the aligned tokens are projected back onto the page's
    /// symbols as highlight geometry.
    pub async fn analyze_page(
        &self,
        book_id: &str,
        page: usize,
    ) -> Result<ImageAnalysis, AnalysisError> {
        let ocr_page = self.page_ocr(book_id, page).await?;
        let analysis = self.analyze_text(&ocr_page.text()).await?;
        let paragraphs = map_tokens_to_regions(&ocr_page.paragraphs, &analysis.tokens)?;
        Ok(ImageAnalysis {
            paragraphs,
            vocabulary: analysis.vocabulary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::text::NO_VOCABULARY;
    use crate::ocr::annotation::{
        AnnotationBlock, AnnotationPage, AnnotationParagraph, AnnotationSymbol, AnnotationWord,
        BoundingPoly, ImageAnnotation, Vertex,
    };
    use crate::ocr::TextOrientation;
    use crate::storage::{PageEntry, StorageError};
    use async_trait::async_trait;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::net::SocketAddr;

    struct MemoryStorage {
        annotation: ImageAnnotation,
    }

    #[async_trait]
    impl BookStorage for MemoryStorage {
        async fn list_pages(&self, _book_id: &str) -> Result<Vec<PageEntry>, StorageError> {
            Ok(vec![PageEntry {
                index: 0,
                image: "001.png".to_string(),
                has_annotation: true,
            }])
        }

        async fn read_page_image(
            &self,
            _book_id: &str,
            _page: usize,
        ) -> Result<Vec<u8>, StorageError> {
            Ok(vec![])
        }

        async fn read_annotation(
            &self,
            _book_id: &str,
            _page: usize,
        ) -> Result<ImageAnnotation, StorageError> {
            Ok(self.annotation.clone())
        }

        async fn write_annotation(
            &self,
            _book_id: &str,
            _image: &str,
            _annotation: &ImageAnnotation,
        ) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn symbol_at(text: &str, x: f32, y: f32) -> AnnotationSymbol {
        let vertex = |x, y| Vertex {
            x: Some(x),
            y: Some(y),
        };
        AnnotationSymbol {
            text: text.to_string(),
            bounding_box: Some(BoundingPoly {
                vertices: vec![
                    vertex(x, y),
                    vertex(x + 10.0, y),
                    vertex(x + 10.0, y + 10.0),
                    vertex(x, y + 10.0),
                ],
            }),
            property: None,
        }
    }

    fn paragraph_of(symbols: Vec<AnnotationSymbol>, confidence: f32) -> AnnotationParagraph {
        AnnotationParagraph {
            words: vec![AnnotationWord { symbols }],
            bounding_box: None,
            confidence,
        }
    }

    /// Two paragraphs reading "猫が" (vertical) and "好き" (horizontal).
    fn two_paragraph_annotation() -> ImageAnnotation {
        ImageAnnotation {
            pages: vec![AnnotationPage {
                blocks: vec![AnnotationBlock {
                    paragraphs: vec![
                        paragraph_of(
                            vec![symbol_at("猫", 0.0, 0.0), symbol_at("が", 0.0, 12.0)],
                            0.9,
                        ),
                        paragraph_of(
                            vec![symbol_at("好", 30.0, 0.0), symbol_at("き", 42.0, 0.0)],
                            0.8,
                        ),
                    ],
                }],
            }],
            text: "猫が\n好き\n".to_string(),
        }
    }

    async fn spawn_parse_server(body: serde_json::Value) -> SocketAddr {
        let app = Router::new()
            .route(
                "/api/v1/parse",
                post(move || {
                    let body = body.clone();
                    async move { Json(body) }
                }),
            )
            .with_state(());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn service(addr: SocketAddr, annotation: ImageAnnotation) -> AnalysisService {
        let jpdb = JpdbClient::new(&format!("http://{addr}"), "test-key");
        AnalysisService::new(jpdb, Arc::new(MemoryStorage { annotation }))
    }

    #[tokio::test]
    async fn empty_text_analyzes_to_nothing() {
        let service = service(
            "127.0.0.1:9".parse().unwrap(),
            ImageAnnotation::default(),
        );
        let analysis = service.analyze_text("").await.unwrap();
        assert!(analysis.tokens.is_empty());
        assert!(analysis.vocabulary.is_empty());
    }

    #[tokio::test]
    async fn text_analysis_interleaves_gaps() {
        // "猫が好き": recognized tokens at positions 0 and 2.
        let addr = spawn_parse_server(serde_json::json!({
            "tokens": [[0, 0, 1], [1, 2, 2]],
            "vocabulary": [
                [2, 3, 2, "猫", "ねこ", 100, ["cat"], ["known"]],
                [5, 6, 5, "好き", "すき", 200, ["liking"], null],
            ],
        }))
        .await;
        let service = service(addr, ImageAnnotation::default());

        let analysis = service.analyze_text("猫が好き").await.unwrap();
        let texts: Vec<&str> = analysis
            .tokens
            .iter()
            .map(|token| token.text.as_str())
            .collect();
        assert_eq!(texts, vec!["猫", "が", "好き"]);
        assert_eq!(analysis.tokens[1].vocabulary_index, NO_VOCABULARY);
        assert_eq!(analysis.vocabulary.len(), 2);
    }

    #[tokio::test]
    async fn page_ocr_reconstructs_the_stored_annotation() {
        let service = service("127.0.0.1:9".parse().unwrap(), two_paragraph_annotation());

        let page = service.page_ocr("book", 0).await.unwrap();
        assert_eq!(page.paragraphs.len(), 2);
        assert_eq!(page.character_count, 4);
        assert_eq!(page.text(), "猫が\n好き");
    }

    #[tokio::test]
    async fn page_analysis_maps_tokens_onto_both_paragraphs() {
        // Page text is "猫が\n好き": tokens for 猫 and 好き, the rest gaps.
        let addr = spawn_parse_server(serde_json::json!({
            "tokens": [[0, 0, 1], [1, 3, 2]],
            "vocabulary": [
                [2, 3, 2, "猫", "ねこ", 100, ["cat"], ["known"]],
                [5, 6, 5, "好き", "すき", 200, ["liking"], null],
            ],
        }))
        .await;
        let service = service(addr, two_paragraph_annotation());

        let analysis = service.analyze_page("book", 0).await.unwrap();
        assert_eq!(analysis.vocabulary.len(), 2);
        assert_eq!(analysis.paragraphs.len(), 2);

        let first = &analysis.paragraphs[0];
        assert_eq!((first.id, first.confidence), (0, 0.9));
        assert_eq!(first.fragments.len(), 2);
        assert_eq!(first.fragments[0].vocabulary_index, 0);
        assert_eq!(first.fragments[1].vocabulary_index, NO_VOCABULARY);
        assert_eq!(first.fragments[0].orientation, TextOrientation::Vertical);

        let second = &analysis.paragraphs[1];
        assert_eq!((second.id, second.confidence), (1, 0.8));
        assert_eq!(second.fragments.len(), 1);
        assert_eq!(second.fragments[0].vocabulary_index, 1);
        assert_eq!(
            second.fragments[0].orientation,
            TextOrientation::Horizontal
        );
        let fragment_text: String = second.fragments[0]
            .symbols
            .iter()
            .map(|symbol| symbol.text.as_str())
            .collect();
        assert_eq!(fragment_text, "好き");
    }
}
