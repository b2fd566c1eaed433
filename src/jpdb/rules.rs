//! Word highlight rules
//!
//! A rule maps a set of card states to the colors a reader frontend should
//! paint matching words with. Evaluation is first-match-wins over the rule
//! list, so more specific rules belong before catch-alls.

use serde::{Deserialize, Serialize};

use super::types::{CardState, JpdbVocabulary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRule {
    pub enabled: bool,
    /// Card states the rule applies to. An empty list matches every word.
    #[serde(default)]
    pub states: Vec<CardState>,
    /// Background color as `#rrggbbaa`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_color: Option<String>,
    /// Text color as `#rrggbbaa`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

/// Pick the first enabled rule that matches the word's card states. Words
/// without a vocabulary entry count as unparsed.
pub fn evaluate_rules<'a>(
    rules: &'a [HighlightRule],
    vocabulary: Option<&JpdbVocabulary>,
) -> Option<&'a HighlightRule> {
    const UNPARSED: &[CardState] = &[CardState::Unparsed];
    let states = vocabulary
        .map(|vocabulary| vocabulary.card_states.as_slice())
        .unwrap_or(UNPARSED);
    rules
        .iter()
        .filter(|rule| rule.enabled)
        .find(|rule| rule.states.is_empty() || states.iter().any(|state| rule.states.contains(state)))
}

/// Built-in rule list served until the frontend overrides it.
pub fn default_rules() -> Vec<HighlightRule> {
    fn rule(enabled: bool, states: &[CardState], overlay: &str, text: &str) -> HighlightRule {
        HighlightRule {
            enabled,
            states: states.to_vec(),
            overlay_color: Some(overlay.to_string()),
            text_color: Some(text.to_string()),
        }
    }

    vec![
        rule(true, &[CardState::Learning], "#4AE78126", "#68D391FF"),
        rule(
            false,
            &[CardState::Known, CardState::NeverForget],
            "#33B25E26",
            "#449462FF",
        ),
        rule(
            true,
            &[CardState::Locked, CardState::Suspended],
            "#54414326",
            "#8999A2FF",
        ),
        rule(true, &[CardState::New], "#20309126", "#63B3EDFF"),
        rule(true, &[CardState::NotInDeck], "#2A3BB026", "#618AB0FF"),
        rule(true, &[CardState::Due], "#FF450026", "#FF4500FF"),
        rule(false, &[CardState::Failed], "#FF000026", "#FF0000FF"),
        rule(false, &[], "#8134B426", "#AA1DB4FF"),
    ]
}
