//! jpdb wire types
//!
//! The jpdb API exchanges compact positional arrays instead of objects; each
//! row kind here pairs a tuple struct encoding the exact field order with
//! the field list the requests ask for. Keep the two in sync.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token fields requested from the parse endpoint, in wire order.
pub const TOKEN_FIELDS: [&str; 3] = ["vocabulary_index", "position", "length"];

/// Vocabulary fields requested from the parse endpoint, in wire order.
pub const VOCABULARY_FIELDS: [&str; 8] = [
    "vid",
    "sid",
    "rid",
    "spelling",
    "reading",
    "frequency_rank",
    "meanings",
    "card_state",
];

/// Deck fields requested from the deck-list endpoint, in wire order.
pub const DECK_FIELDS: [&str; 2] = ["id", "name"];

/// Wire row for a parse token, ordered as [`TOKEN_FIELDS`].
#[derive(Deserialize)]
struct PackedToken(i32, usize, usize);

/// One span the parser recognized in the submitted text.
///
/// `position` and `length` are in UTF-16 code units, the offset unit the
/// jpdb API counts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PackedToken")]
pub struct JpdbToken {
    /// Index into the parallel vocabulary array of the same parse result.
    pub vocabulary_index: i32,
    pub position: usize,
    pub length: usize,
}

impl From<PackedToken> for JpdbToken {
    fn from(packed: PackedToken) -> Self {
        let PackedToken(vocabulary_index, position, length) = packed;
        JpdbToken {
            vocabulary_index,
            position,
            length,
        }
    }
}

/// Wire row for a vocabulary entry, ordered as [`VOCABULARY_FIELDS`].
#[derive(Deserialize)]
struct PackedVocabulary(
    u64,
    u64,
    u64,
    String,
    String,
    Option<u32>,
    Vec<String>,
    Option<Vec<CardState>>,
);

/// One dictionary entry with the user's study state baked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PackedVocabulary")]
pub struct JpdbVocabulary {
    pub vid: u64,
    pub sid: u64,
    pub rid: u64,
    pub spelling: String,
    pub reading: String,
    pub frequency_rank: Option<u32>,
    pub meanings: Vec<String>,
    pub card_states: Vec<CardState>,
}

impl From<PackedVocabulary> for JpdbVocabulary {
    fn from(packed: PackedVocabulary) -> Self {
        let PackedVocabulary(vid, sid, rid, spelling, reading, frequency_rank, meanings, card_states) =
            packed;
        JpdbVocabulary {
            vid,
            sid,
            rid,
            spelling,
            reading,
            frequency_rank,
            meanings,
            // The API reports null for words in no deck at all.
            card_states: card_states.unwrap_or_else(|| vec![CardState::NotInDeck]),
        }
    }
}

/// Study-progress classification of a vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardState {
    New,
    NeverForget,
    Known,
    Due,
    Suspended,
    Locked,
    Learning,
    Failed,
    Blacklisted,
    Redundant,
    NotInDeck,
    Unparsed,
}

/// Full decoded answer of one parse call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JpdbParseResult {
    /// Sorted ascending by `position`.
    pub tokens: Vec<JpdbToken>,
    pub vocabulary: Vec<JpdbVocabulary>,
}

/// Wire row for a user deck, ordered as [`DECK_FIELDS`].
#[derive(Deserialize)]
struct PackedDeck(u64, String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PackedDeck")]
pub struct JpdbDeck {
    pub id: u64,
    pub name: String,
}

impl From<PackedDeck> for JpdbDeck {
    fn from(packed: PackedDeck) -> Self {
        let PackedDeck(id, name) = packed;
        JpdbDeck { id, name }
    }
}

/// Deck reference accepted by the mutation endpoint: a numeric user deck or
/// one of the named standard decks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeckId {
    Special(SpecialDeck),
    User(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialDeck {
    Blacklist,
    NeverForget,
    Mining,
}

impl SpecialDeck {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blacklist => "blacklist",
            Self::NeverForget => "never-forget",
            Self::Mining => "mining",
        }
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Special(deck) => f.write_str(deck.as_str()),
            Self::User(id) => write!(f, "{id}"),
        }
    }
}

/// Direction of a deck mutation; names the `{mode}-vocabulary` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckUpdateMode {
    Add,
    Remove,
}

impl DeckUpdateMode {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Add => "add-vocabulary",
            Self::Remove => "remove-vocabulary",
        }
    }
}

/// jpdb client error types
#[derive(Debug, thiserror::Error)]
pub enum JpdbError {
    #[error("no jpdb API key is configured")]
    NotConfigured,

    #[error("jpdb request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("jpdb returned {status}: {body}")]
    Api { status: u16, body: String },
}

impl JpdbError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::Request(_) | Self::Api { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}
