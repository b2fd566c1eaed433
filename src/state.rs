//! Application state management

use std::sync::Arc;

use crate::analysis::AnalysisService;
use crate::config::Config;
use crate::jpdb::{default_rules, HighlightRule, JpdbClient};
use crate::ocr::{OcrEngine, OcrJobRunner, VisionOcrEngine};
use crate::storage::{BookStorage, FsBookStorage};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    jpdb: JpdbClient,
    analysis: AnalysisService,
    storage: Arc<dyn BookStorage>,
    ocr_job: Arc<OcrJobRunner>,
    rules: Vec<HighlightRule>,
}

impl AppState {
    /// Wire up the full service graph from the configuration.
    pub fn new(config: Config) -> Self {
        let storage: Arc<dyn BookStorage> =
            Arc::new(FsBookStorage::new(&config.storage.data_dir));
        let jpdb = JpdbClient::new(&config.jpdb.base_url, &config.jpdb.api_key);
        let engine: Arc<dyn OcrEngine> =
            Arc::new(VisionOcrEngine::new(&config.ocr.base_url, &config.ocr.api_key));
        let ocr_job = Arc::new(OcrJobRunner::new(
            engine,
            storage.clone(),
            config.ocr.concurrency,
        ));
        let analysis = AnalysisService::new(jpdb.clone(), storage.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                jpdb,
                analysis,
                storage,
                ocr_job,
                rules: default_rules(),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The shared jpdb client (throttle and parse cache included).
    pub fn jpdb(&self) -> &JpdbClient {
        &self.inner.jpdb
    }

    pub fn analysis(&self) -> &AnalysisService {
        &self.inner.analysis
    }

    pub fn storage(&self) -> &Arc<dyn BookStorage> {
        &self.inner.storage
    }

    pub fn ocr_job(&self) -> &Arc<OcrJobRunner> {
        &self.inner.ocr_job
    }

    /// Highlight rules served to the frontend.
    pub fn highlight_rules(&self) -> &[HighlightRule] {
        &self.inner.rules
    }
}
