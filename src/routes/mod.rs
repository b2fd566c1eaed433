//! Route modules for Yomeru Server

pub mod analyze;
pub mod books;
pub mod jpdb;
pub mod ocr;
