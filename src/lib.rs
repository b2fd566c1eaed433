//! Yomeru Server Library
//!
//! This crate exposes the reader backend: OCR layout reconstruction,
//! jpdb-backed text analysis, and the image region mapper. The server
//! binary is in main.rs.
//!
//! # Modules
//!
//! - `ocr`: Recognition tree decoding and page layout reconstruction
//! - `jpdb`: Rate-limited, cached client for the jpdb API
//! - `analysis`: Token alignment and token-to-region mapping
//! - `storage`: Book and annotation persistence
//! - `routes`: HTTP API surface

pub mod analysis;
pub mod config;
pub mod jpdb;
pub mod ocr;
pub mod routes;
pub mod state;
pub mod storage;
