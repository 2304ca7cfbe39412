use unicode_segmentation::UnicodeSegmentation;

use crate::models::Query;

/// Shortest question, in user-perceived characters, worth answering.
pub const MIN_QUERY_CHARS: usize = 5;

pub const NAME_HINT: &str = "プレイヤー名を正確に入力してください(例: LeBron James、レブロン)";
pub const SEASON_HINT: &str = "シーズンを「2023-24」の形式で指定してください";
pub const LENGTH_HINT: &str = "もう少し具体的に質問してください";
pub const GENERIC_HINT: &str = "質問内容を確認して、もう一度入力してください";

/// Decides whether a parsed query can be answered and what to tell the
/// user when it cannot.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryValidator;

impl QueryValidator {
    pub fn new() -> Self {
        Self
    }

    /// A player name and at least [`MIN_QUERY_CHARS`] characters of
    /// trimmed text.
    pub fn validate(&self, query: &Query) -> bool {
        query.player_name.is_some() && text_len(&query.text) >= MIN_QUERY_CHARS
    }

    /// One hint per missing signal, in a fixed order. The generic hint is
    /// only returned when nothing specific applies.
    pub fn suggest(&self, query: &Query) -> Vec<String> {
        let mut suggestions = Vec::new();
        if query.player_name.is_none() {
            suggestions.push(NAME_HINT.to_string());
        }
        if query.season.is_none() {
            suggestions.push(SEASON_HINT.to_string());
        }
        if text_len(&query.text) < MIN_QUERY_CHARS {
            suggestions.push(LENGTH_HINT.to_string());
        }
        if suggestions.is_empty() {
            suggestions.push(GENERIC_HINT.to_string());
        }
        suggestions
    }
}

fn text_len(text: &str) -> usize {
    text.trim().graphemes(true).count()
}
