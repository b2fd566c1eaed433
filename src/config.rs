//! Server configuration
//!
//! All settings come from environment variables with working defaults, so a
//! bare `cargo run` serves a local data directory. API keys default to empty,
//! which disables the features that need them rather than failing startup.

use std::env;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_JPDB_BASE_URL: &str = "https://jpdb.io";
const DEFAULT_VISION_BASE_URL: &str = "https://vision.googleapis.com";
const DEFAULT_OCR_CONCURRENCY: usize = 4;

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub jpdb: JpdbConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding one subdirectory of page images per book.
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct JpdbConfig {
    /// API key for the jpdb service; empty disables vocabulary analysis.
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Vision API key; empty disables the OCR job.
    pub api_key: String,
    pub base_url: String,
    /// How many pages the bulk OCR job annotates concurrently.
    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: DEFAULT_PORT },
            storage: StorageConfig {
                data_dir: DEFAULT_DATA_DIR.to_string(),
            },
            jpdb: JpdbConfig {
                api_key: String::new(),
                base_url: DEFAULT_JPDB_BASE_URL.to_string(),
            },
            ocr: OcrConfig {
                api_key: String::new(),
                base_url: DEFAULT_VISION_BASE_URL.to_string(),
                concurrency: DEFAULT_OCR_CONCURRENCY,
            },
        }
    }
}

impl Config {
    /// Read the configuration from the environment, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig {
                port: parse_env("SERVER_PORT", DEFAULT_PORT)?,
            },
            storage: StorageConfig {
                data_dir: env_or("DATA_DIR", DEFAULT_DATA_DIR),
            },
            jpdb: JpdbConfig {
                api_key: env_or("JPDB_API_KEY", ""),
                base_url: env_or("JPDB_BASE_URL", DEFAULT_JPDB_BASE_URL),
            },
            ocr: OcrConfig {
                api_key: env_or("VISION_API_KEY", ""),
                base_url: env_or("VISION_BASE_URL", DEFAULT_VISION_BASE_URL),
                concurrency: parse_env("OCR_CONCURRENCY", DEFAULT_OCR_CONCURRENCY)?,
            },
        })
    }
}

fn env_or(name: &str, fallback: &str) -> String {
    env::var(name).unwrap_or_else(|_| fallback.to_string())
}

fn parse_env<T>(name: &'static str, fallback: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_keys_empty() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.jpdb.base_url, "https://jpdb.io");
        assert!(config.jpdb.api_key.is_empty());
        assert!(config.ocr.api_key.is_empty());
        assert_eq!(config.ocr.concurrency, 4);
    }
}
