//! jpdb integration
//!
//! Client, cache, and word models for the jpdb dictionary service. The
//! client fronts the REST API with a request throttle and a TTL cache of
//! parse results; highlight rule evaluation decides how a frontend should
//! color each parsed word based on its card states.

mod cache;
mod client;
mod rules;
mod types;

pub use cache::ParseCache;
pub use client::JpdbClient;
pub use rules::{default_rules, evaluate_rules, HighlightRule};
pub use types::{
    CardState, DeckId, DeckUpdateMode, JpdbDeck, JpdbError, JpdbParseResult, JpdbToken,
    JpdbVocabulary, SpecialDeck,
};
