//! Token alignment
//!
//! The parse service reports tokens as UTF-16 offsets into the submitted
//! text and skips runs it cannot match. Alignment projects those tokens
//! back onto the text so that every character lands in exactly one token,
//! with the unmatched runs carried as gap tokens. Normalization then makes
//! each line break its own token so paragraph boundaries are explicit.

use serde::{Deserialize, Serialize};

use crate::jpdb::JpdbToken;

/// Vocabulary index of tokens with no dictionary match, including line
/// break markers.
pub const NO_VOCABULARY: i32 = -1;

/// One span of analyzed text. The index points into the vocabulary list
/// returned alongside the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisToken {
    pub text: String,
    pub vocabulary_index: i32,
}

impl AnalysisToken {
    fn new(text: &str, vocabulary_index: i32) -> Self {
        Self {
            text: text.to_string(),
            vocabulary_index,
        }
    }

    pub fn is_line_break(&self) -> bool {
        self.text == "\n"
    }
}

/// Cursor over a string addressed in UTF-16 code units, the unit the parse
/// service counts positions in.
struct Utf16Walker<'a> {
    text: &'a str,
    byte_pos: usize,
    unit_pos: usize,
}

impl<'a> Utf16Walker<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte_pos: 0,
            unit_pos: 0,
        }
    }

    fn unit_pos(&self) -> usize {
        self.unit_pos
    }

    fn at_end(&self) -> bool {
        self.byte_pos >= self.text.len()
    }

    /// Walk forward until the cursor reaches `unit_end` or the text runs
    /// out, returning the slice covered.
    fn take_until(&mut self, unit_end: usize) -> &'a str {
        let start = self.byte_pos;
        for ch in self.text[self.byte_pos..].chars() {
            if self.unit_pos >= unit_end {
                break;
            }
            self.byte_pos += ch.len_utf8();
            self.unit_pos += ch.len_utf16();
        }
        &self.text[start..self.byte_pos]
    }

    fn take_rest(&mut self) -> &'a str {
        self.take_until(usize::MAX)
    }
}

/// Project parse tokens onto `text`, producing a token sequence that covers
/// every character. Stretches the parser skipped become gap tokens.
pub fn align_tokens(text: &str, tokens: &[JpdbToken]) -> Vec<AnalysisToken> {
    let mut aligned = Vec::new();
    let mut walker = Utf16Walker::new(text);
    let mut next = 0;

    while !walker.at_end() {
        match tokens.get(next) {
            // Tokens starting behind the cursor cannot be aligned any more.
            Some(token) if token.position < walker.unit_pos() => {
                next += 1;
            }
            Some(token) if token.position == walker.unit_pos() => {
                let span = walker.take_until(token.position + token.length);
                aligned.push(AnalysisToken::new(span, token.vocabulary_index));
                next += 1;
            }
            Some(token) => {
                let gap = walker.take_until(token.position);
                aligned.push(AnalysisToken::new(gap, NO_VOCABULARY));
            }
            None => {
                let rest = walker.take_rest();
                aligned.push(AnalysisToken::new(rest, NO_VOCABULARY));
            }
        }
    }
    aligned
}

/// Split tokens spanning line breaks so every `"\n"` stands alone as a
/// structural marker, and drop tokens left empty. Markers never carry a
/// vocabulary index; text on either side keeps the original one.
pub fn normalize_tokens(tokens: Vec<AnalysisToken>) -> Vec<AnalysisToken> {
    let mut normalized = Vec::with_capacity(tokens.len());
    for token in tokens {
        if !token.text.contains('\n') {
            if !token.text.is_empty() {
                normalized.push(token);
            }
            continue;
        }
        for part in token.text.split_inclusive('\n') {
            match part.strip_suffix('\n') {
                Some(body) => {
                    if !body.is_empty() {
                        normalized.push(AnalysisToken::new(body, token.vocabulary_index));
                    }
                    normalized.push(AnalysisToken::new("\n", NO_VOCABULARY));
                }
                None => normalized.push(AnalysisToken::new(part, token.vocabulary_index)),
            }
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(vocabulary_index: i32, position: usize, length: usize) -> JpdbToken {
        JpdbToken {
            vocabulary_index,
            position,
            length,
        }
    }

    fn concatenated(tokens: &[AnalysisToken]) -> String {
        tokens.iter().map(|token| token.text.as_str()).collect()
    }

    #[test]
    fn recognized_and_gap_tokens_interleave() {
        let text = "猫が好き";
        let tokens = vec![token(0, 0, 1), token(1, 2, 2)];

        let aligned = align_tokens(text, &tokens);
        assert_eq!(
            aligned,
            vec![
                AnalysisToken::new("猫", 0),
                AnalysisToken::new("が", NO_VOCABULARY),
                AnalysisToken::new("好き", 1),
            ]
        );
        assert_eq!(concatenated(&aligned), text);
    }

    #[test]
    fn empty_text_aligns_to_nothing() {
        assert!(align_tokens("", &[token(0, 0, 1)]).is_empty());
    }

    #[test]
    fn no_tokens_yields_one_gap() {
        let aligned = align_tokens("ただの文", &[]);
        assert_eq!(aligned, vec![AnalysisToken::new("ただの文", NO_VOCABULARY)]);
    }

    #[test]
    fn positions_count_utf16_units() {
        // "𠮷" occupies two UTF-16 units, so the following token starts at 3.
        let text = "𠮷野家";
        let tokens = vec![token(0, 0, 2), token(1, 2, 2)];

        let aligned = align_tokens(text, &tokens);
        assert_eq!(
            aligned,
            vec![AnalysisToken::new("𠮷", 0), AnalysisToken::new("野家", 1)]
        );
        assert_eq!(concatenated(&aligned), text);
    }

    #[test]
    fn overlapping_tokens_are_skipped() {
        let text = "abcd";
        let tokens = vec![token(0, 0, 2), token(1, 1, 2)];

        let aligned = align_tokens(text, &tokens);
        assert_eq!(
            aligned,
            vec![
                AnalysisToken::new("ab", 0),
                AnalysisToken::new("cd", NO_VOCABULARY),
            ]
        );
    }

    #[test]
    fn coverage_holds_for_sparse_tokens() {
        let text = "この本は面白い\nでも長い";
        let tokens = vec![token(2, 2, 1), token(7, 4, 3)];

        let aligned = align_tokens(text, &tokens);
        assert_eq!(concatenated(&aligned), text);
    }

    #[test]
    fn gap_with_line_break_splits_into_three() {
        let tokens = vec![AnalysisToken::new("が\nこ", NO_VOCABULARY)];

        let normalized = normalize_tokens(tokens);
        assert_eq!(
            normalized,
            vec![
                AnalysisToken::new("が", NO_VOCABULARY),
                AnalysisToken::new("\n", NO_VOCABULARY),
                AnalysisToken::new("こ", NO_VOCABULARY),
            ]
        );
    }

    #[test]
    fn recognized_token_split_keeps_its_index_around_the_break() {
        let tokens = vec![AnalysisToken::new("好\nき", 5)];

        let normalized = normalize_tokens(tokens);
        assert_eq!(
            normalized,
            vec![
                AnalysisToken::new("好", 5),
                AnalysisToken::new("\n", NO_VOCABULARY),
                AnalysisToken::new("き", 5),
            ]
        );
        assert!(normalized[1].is_line_break());
    }

    #[test]
    fn consecutive_breaks_become_separate_markers() {
        let tokens = vec![AnalysisToken::new("あ\n\nい", 2)];

        let normalized = normalize_tokens(tokens);
        assert_eq!(
            normalized,
            vec![
                AnalysisToken::new("あ", 2),
                AnalysisToken::new("\n", NO_VOCABULARY),
                AnalysisToken::new("\n", NO_VOCABULARY),
                AnalysisToken::new("い", 2),
            ]
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let tokens = vec![
            AnalysisToken::new("一行目\n二行目", 0),
            AnalysisToken::new("\n", NO_VOCABULARY),
            AnalysisToken::new("三行目", 1),
        ];

        let once = normalize_tokens(tokens);
        let twice = normalize_tokens(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_tokens_are_dropped() {
        let tokens = vec![
            AnalysisToken::new("", 0),
            AnalysisToken::new("\n", 7),
            AnalysisToken::new("字", 1),
        ];

        let normalized = normalize_tokens(tokens);
        assert_eq!(
            normalized,
            vec![
                AnalysisToken::new("\n", NO_VOCABULARY),
                AnalysisToken::new("字", 1),
            ]
        );
    }
}
