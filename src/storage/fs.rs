//! Filesystem book storage
//!
//! Books are directories directly under the data dir. Page images are the
//! `.png`/`.jpg`/`.jpeg` files in the book directory, sorted by name;
//! annotations are stored as `<image>.json` under `.app/ocr/` inside the
//! book directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{BookStorage, PageEntry, StorageError};
use crate::ocr::annotation::ImageAnnotation;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Book storage rooted at a local data directory.
pub struct FsBookStorage {
    data_dir: PathBuf,
}

impl FsBookStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Book ids are bare directory names. Anything path-like is rejected so
    /// a request cannot reach outside the data dir.
    async fn book_dir(&self, book_id: &str) -> Result<PathBuf, StorageError> {
        if book_id.is_empty() || book_id.starts_with('.') || book_id.contains(['/', '\\']) {
            return Err(StorageError::InvalidBookId(book_id.to_string()));
        }
        let dir = self.data_dir.join(book_id);
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            _ => Err(StorageError::BookNotFound(book_id.to_string())),
        }
    }

    async fn page_entry(&self, book_id: &str, page: usize) -> Result<PageEntry, StorageError> {
        let mut pages = self.list_pages(book_id).await?;
        if page >= pages.len() {
            return Err(StorageError::PageOutOfRange {
                book_id: book_id.to_string(),
                page,
            });
        }
        Ok(pages.swap_remove(page))
    }

    fn ocr_dir(&self, book_dir: &Path) -> PathBuf {
        book_dir.join(".app").join("ocr")
    }
}

fn is_page_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn annotation_name(image: &str) -> String {
    format!("{image}.json")
}

#[async_trait]
impl BookStorage for FsBookStorage {
    async fn list_pages(&self, book_id: &str) -> Result<Vec<PageEntry>, StorageError> {
        let dir = self.book_dir(book_id).await?;

        let mut images = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_page_image(&name) {
                images.push(name);
            }
        }
        images.sort();

        let ocr_dir = self.ocr_dir(&dir);
        let mut pages = Vec::with_capacity(images.len());
        for (index, image) in images.into_iter().enumerate() {
            let has_annotation = tokio::fs::try_exists(ocr_dir.join(annotation_name(&image)))
                .await
                .unwrap_or(false);
            pages.push(PageEntry {
                index,
                image,
                has_annotation,
            });
        }
        Ok(pages)
    }

    async fn read_page_image(&self, book_id: &str, page: usize) -> Result<Vec<u8>, StorageError> {
        let entry = self.page_entry(book_id, page).await?;
        let path = self.data_dir.join(book_id).join(&entry.image);
        Ok(tokio::fs::read(&path).await?)
    }

    async fn read_annotation(
        &self,
        book_id: &str,
        page: usize,
    ) -> Result<ImageAnnotation, StorageError> {
        let entry = self.page_entry(book_id, page).await?;
        if !entry.has_annotation {
            return Err(StorageError::MissingAnnotation);
        }
        let path = self
            .ocr_dir(&self.data_dir.join(book_id))
            .join(annotation_name(&entry.image));
        let raw = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write_annotation(
        &self,
        book_id: &str,
        image: &str,
        annotation: &ImageAnnotation,
    ) -> Result<(), StorageError> {
        let dir = self.book_dir(book_id).await?;
        let ocr_dir = self.ocr_dir(&dir);
        tokio::fs::create_dir_all(&ocr_dir).await?;
        let raw = serde_json::to_vec(annotation)?;
        tokio::fs::write(ocr_dir.join(annotation_name(image)), raw).await?;
        Ok(())
    }
}
