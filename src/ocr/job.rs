//! Bulk OCR job
//!
//! Runs OCR over every page of a book. Exactly one job may run per process:
//! the runner is an explicit Idle/Running machine and a second invocation
//! fails fast instead of queuing. Pages that already have a stored
//! annotation are skipped, and a failing page is recorded without aborting
//! the rest of the job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;

use super::engine::OcrEngine;
use super::types::OcrError;
use crate::storage::{BookStorage, PageEntry};

pub struct OcrJobRunner {
    engine: Arc<dyn OcrEngine>,
    storage: Arc<dyn BookStorage>,
    state: Mutex<JobPhase>,
    concurrency: usize,
}

#[derive(Debug, Default)]
enum JobPhase {
    #[default]
    Idle,
    Running {
        book_id: String,
        current_image: usize,
        total_images: usize,
        started_at: DateTime<Utc>,
    },
}

/// Snapshot of the runner state for status reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrJobStatus {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    pub current_image: usize,
    pub total_images: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

/// Outcome of one completed job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrJobReport {
    pub processed: usize,
    pub skipped: usize,
    pub failures: Vec<PageFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub image: String,
    pub error: String,
}

enum PageOutcome {
    Processed,
    Skipped,
    Failed(PageFailure),
}

impl OcrJobRunner {
    pub fn new(engine: Arc<dyn OcrEngine>, storage: Arc<dyn BookStorage>, concurrency: usize) -> Self {
        Self {
            engine,
            storage,
            state: Mutex::new(JobPhase::Idle),
            concurrency: concurrency.max(1),
        }
    }

    pub fn status(&self) -> OcrJobStatus {
        match &*self.state.lock() {
            JobPhase::Idle => OcrJobStatus {
                running: false,
                book_id: None,
                current_image: 0,
                total_images: 0,
                started_at: None,
            },
            JobPhase::Running {
                book_id,
                current_image,
                total_images,
                started_at,
            } => OcrJobStatus {
                running: true,
                book_id: Some(book_id.clone()),
                current_image: *current_image,
                total_images: *total_images,
                started_at: Some(*started_at),
            },
        }
    }

    /// Runs the whole job and waits for it to complete.
    pub async fn run_book(&self, book_id: &str) -> Result<OcrJobReport, OcrError> {
        self.try_begin(book_id)?;
        let result = self.run_pages(book_id).await;
        self.finish();
        result
    }

    /// Starts the job in the background. The Idle/Running transition happens
    /// before this returns, so a concurrent start observes the conflict
    /// immediately.
    pub fn start(self: &Arc<Self>, book_id: &str) -> Result<(), OcrError> {
        self.try_begin(book_id)?;
        let runner = Arc::clone(self);
        let book_id = book_id.to_string();
        tokio::spawn(async move {
            let result = runner.run_pages(&book_id).await;
            runner.finish();
            match result {
                Ok(report) if report.failures.is_empty() => {
                    tracing::info!(
                        book = %book_id,
                        processed = report.processed,
                        skipped = report.skipped,
                        "OCR completed"
                    );
                }
                Ok(report) => {
                    for failure in &report.failures {
                        tracing::warn!(image = %failure.image, error = %failure.error, "page OCR failed");
                    }
                    tracing::warn!(
                        book = %book_id,
                        failures = report.failures.len(),
                        "OCR completed with failures"
                    );
                }
                Err(err) => {
                    tracing::error!(book = %book_id, error = %err, "OCR failed");
                }
            }
        });
        Ok(())
    }

    fn try_begin(&self, book_id: &str) -> Result<(), OcrError> {
        let mut phase = self.state.lock();
        if matches!(*phase, JobPhase::Running { .. }) {
            return Err(OcrError::JobAlreadyRunning);
        }
        *phase = JobPhase::Running {
            book_id: book_id.to_string(),
            current_image: 0,
            total_images: 0,
            started_at: Utc::now(),
        };
        Ok(())
    }

    fn finish(&self) {
        *self.state.lock() = JobPhase::Idle;
    }

    fn set_total(&self, total: usize) {
        if let JobPhase::Running { total_images, .. } = &mut *self.state.lock() {
            *total_images = total;
        }
    }

    fn advance(&self) {
        if let JobPhase::Running { current_image, .. } = &mut *self.state.lock() {
            *current_image += 1;
        }
    }

    async fn run_pages(&self, book_id: &str) -> Result<OcrJobReport, OcrError> {
        let pages = self.storage.list_pages(book_id).await?;
        self.set_total(pages.len());
        tracing::info!(book = %book_id, pages = pages.len(), engine = self.engine.name(), "OCR started");

        let outcomes: Vec<PageOutcome> = stream::iter(pages)
            .map(|page| self.process_page(book_id, page))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = OcrJobReport {
            processed: 0,
            skipped: 0,
            failures: Vec::new(),
        };
        for outcome in outcomes {
            match outcome {
                PageOutcome::Processed => report.processed += 1,
                PageOutcome::Skipped => report.skipped += 1,
                PageOutcome::Failed(failure) => report.failures.push(failure),
            }
        }
        Ok(report)
    }

    async fn process_page(&self, book_id: &str, page: PageEntry) -> PageOutcome {
        self.advance();
        if page.has_annotation {
            tracing::debug!(image = %page.image, "annotation already present, skipping");
            return PageOutcome::Skipped;
        }
        match self.annotate_page(book_id, &page).await {
            Ok(()) => {
                tracing::debug!(image = %page.image, "annotation saved");
                PageOutcome::Processed
            }
            Err(err) => PageOutcome::Failed(PageFailure {
                image: page.image,
                error: err.to_string(),
            }),
        }
    }

    async fn annotate_page(&self, book_id: &str, page: &PageEntry) -> Result<(), OcrError> {
        let image = self.storage.read_page_image(book_id, page.index).await?;
        let annotation = self.engine.annotate_image(&image).await?;
        self.storage
            .write_annotation(book_id, &page.image, &annotation)
            .await?;
        Ok(())
    }
}
