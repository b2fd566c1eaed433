//! Book storage
//!
//! Contract for page images and their stored OCR annotations. A book is a
//! directory of page images; annotations live next to the images and are
//! written once per page by the OCR job.

mod fs;

pub use fs::FsBookStorage;

use async_trait::async_trait;
use serde::Serialize;

use crate::ocr::annotation::ImageAnnotation;

/// One page image of a book, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    /// Zero-based page number.
    pub index: usize,
    /// Image file name within the book directory.
    pub image: String,
    /// Whether an OCR annotation is stored for this page.
    pub has_annotation: bool,
}

/// Storage backend for books and their per-page OCR annotations.
#[async_trait]
pub trait BookStorage: Send + Sync {
    /// Page images of a book, sorted by file name (reading order).
    async fn list_pages(&self, book_id: &str) -> Result<Vec<PageEntry>, StorageError>;

    /// Raw bytes of one page image.
    async fn read_page_image(&self, book_id: &str, page: usize) -> Result<Vec<u8>, StorageError>;

    /// The stored annotation for one page.
    async fn read_annotation(
        &self,
        book_id: &str,
        page: usize,
    ) -> Result<ImageAnnotation, StorageError>;

    /// Persist the annotation for the page backed by `image`.
    async fn write_annotation(
        &self,
        book_id: &str,
        image: &str,
        annotation: &ImageAnnotation,
    ) -> Result<(), StorageError>;
}

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("book '{0}' not found")]
    BookNotFound(String),

    #[error("page {page} is out of range for book '{book_id}'")]
    PageOutOfRange { book_id: String, page: usize },

    #[error("no OCR results exist for this page")]
    MissingAnnotation,

    #[error("invalid book id '{0}'")]
    InvalidBookId(String),

    #[error("malformed annotation file: {0}")]
    MalformedAnnotation(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::BookNotFound(_) | Self::PageOutOfRange { .. } | Self::MissingAnnotation => {
                StatusCode::NOT_FOUND
            }
            Self::InvalidBookId(_) => StatusCode::BAD_REQUEST,
            Self::MalformedAnnotation(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
