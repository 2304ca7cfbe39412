use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::ParserConfig;
use crate::llm::{prompts, LlmProvider};
use crate::models::season::{is_season_label, season_ending_in};
use crate::models::{Query, StatType};

use super::extraction_cache::{ExtractedFields, ExtractionCache};

/// Nicknames and Japanese renderings mapped to canonical names. Keys are
/// lowercase; when several match, the longest key wins.
const PLAYER_ALIASES: &[(&str, &str)] = &[
    ("レブロンジェームズ", "LeBron James"),
    ("レブロン・ジェームズ", "LeBron James"),
    ("レブロン", "LeBron James"),
    ("king james", "LeBron James"),
    ("lebron", "LeBron James"),
    ("ステフィンカリー", "Stephen Curry"),
    ("ステフィン・カリー", "Stephen Curry"),
    ("ステフィン", "Stephen Curry"),
    ("steph curry", "Stephen Curry"),
    ("steph", "Stephen Curry"),
    ("ケビンデュラント", "Kevin Durant"),
    ("ケビン・デュラント", "Kevin Durant"),
    ("デュラント", "Kevin Durant"),
    ("kd", "Kevin Durant"),
    ("ヤニス・アデトクンボ", "Giannis Antetokounmpo"),
    ("アデトクンボ", "Giannis Antetokounmpo"),
    ("ヤニス", "Giannis Antetokounmpo"),
    ("greek freak", "Giannis Antetokounmpo"),
    ("giannis", "Giannis Antetokounmpo"),
    ("ニコラ・ヨキッチ", "Nikola Jokic"),
    ("ヨキッチ", "Nikola Jokic"),
    ("jokic", "Nikola Jokic"),
    ("ルカ・ドンチッチ", "Luka Doncic"),
    ("ドンチッチ", "Luka Doncic"),
    ("doncic", "Luka Doncic"),
    ("マイケルジョーダン", "Michael Jordan"),
    ("マイケル・ジョーダン", "Michael Jordan"),
    ("コービーブライアント", "Kobe Bryant"),
    ("コービー・ブライアント", "Kobe Bryant"),
    ("コービー", "Kobe Bryant"),
    ("ジョエル・エンビード", "Joel Embiid"),
    ("エンビード", "Joel Embiid"),
    ("ジェイソン・テイタム", "Jayson Tatum"),
    ("テイタム", "Jayson Tatum"),
    ("ウェンバンヤマ", "Victor Wembanyama"),
    ("wemby", "Victor Wembanyama"),
    ("八村塁", "Rui Hachimura"),
    ("八村", "Rui Hachimura"),
    ("渡邊雄太", "Yuta Watanabe"),
    ("渡辺雄太", "Yuta Watanabe"),
    ("河村勇輝", "Yuki Kawamura"),
];

/// Statistic keywords, lowercase. Longest match wins.
const STAT_KEYWORDS: &[(&str, StatType)] = &[
    ("3ポイント成功率", StatType::Fg3Pct),
    ("スリーポイント", StatType::Fg3Pct),
    ("3ポイント", StatType::Fg3Pct),
    ("three point", StatType::Fg3Pct),
    ("3p%", StatType::Fg3Pct),
    ("フリースロー", StatType::FtPct),
    ("free throw", StatType::FtPct),
    ("ft%", StatType::FtPct),
    ("フィールドゴール", StatType::FgPct),
    ("シュート成功率", StatType::FgPct),
    ("field goal", StatType::FgPct),
    ("fg%", StatType::FgPct),
    ("得点", StatType::Pts),
    ("points", StatType::Pts),
    ("scoring", StatType::Pts),
    ("ppg", StatType::Pts),
    ("リバウンド", StatType::Reb),
    ("rebounds", StatType::Reb),
    ("rpg", StatType::Reb),
    ("アシスト", StatType::Ast),
    ("assists", StatType::Ast),
    ("apg", StatType::Ast),
    ("スティール", StatType::Stl),
    ("steals", StatType::Stl),
    ("ブロック", StatType::Blk),
    ("blocks", StatType::Blk),
    ("出場時間", StatType::Min),
    ("minutes", StatType::Min),
    ("出場試合", StatType::Gp),
    ("games played", StatType::Gp),
];

/// Capitalized words that start or end a sentence rather than a name.
const NAME_STOPWORDS: &[&str] = &[
    "What", "How", "Who", "Show", "Tell", "Give", "Me", "Please", "Is", "Was", "Did", "Does",
    "The", "In", "For", "Of", "And", "Season", "Seasons", "Regular", "Playoffs", "Stats",
    "Statistics", "Career", "Compare", "Points", "NBA",
];

const MAX_NAME_LEN: usize = 64;

fn season_regex() -> &'static Regex {
    static SEASON: OnceLock<Regex> = OnceLock::new();
    SEASON.get_or_init(|| {
        Regex::new(r"(?:^|\D)(\d{4})-(\d{4}|\d{2})(?:\D|$)").expect("season regex")
    })
}

fn year_regex() -> &'static Regex {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| {
        Regex::new(r"(?i)(?:(?:^|\D)(\d{4})\s*年|season\s*(\d{4})(?:\D|$))").expect("year regex")
    })
}

fn capitalized_run_regex() -> &'static Regex {
    static RUN: OnceLock<Regex> = OnceLock::new();
    RUN.get_or_init(|| {
        Regex::new(r"[A-Z][A-Za-z'.\-]*(?:\s+[A-Z][A-Za-z'.\-]*)*").expect("name regex")
    })
}

/// True when `term` occurs in `haystack`; ASCII terms must sit on word
/// boundaries so `kd` does not match inside another word.
///
/// Boundaries are taken between grapheme clusters, so an accented letter
/// next to the term (precomposed or with a combining mark) still counts as
/// part of the word.
fn contains_term(haystack: &str, term: &str) -> bool {
    if !term.is_ascii() {
        return haystack.contains(term);
    }
    let clusters: Vec<(usize, &str)> = haystack.grapheme_indices(true).collect();
    let cluster_at = |offset: usize| clusters.binary_search_by_key(&offset, |&(i, _)| i);

    haystack.match_indices(term).any(|(start, _)| {
        let end = start + term.len();
        let Ok(first) = cluster_at(start) else {
            return false;
        };
        let before = first.checked_sub(1).map(|i| clusters[i].1);
        let after = if end == haystack.len() {
            None
        } else {
            match cluster_at(end) {
                Ok(i) => Some(clusters[i].1),
                // A mark extends the term's last character.
                Err(_) => return false,
            }
        };
        !before.is_some_and(is_word_cluster) && !after.is_some_and(is_word_cluster)
    })
}

/// Letters and digits, except kana and kanji: Japanese questions put Latin
/// terms directly against them ("kdの得点").
fn is_word_cluster(cluster: &str) -> bool {
    cluster.chars().next().is_some_and(|c| {
        c.is_alphanumeric()
            && !matches!(
                c,
                '\u{3040}'..='\u{30FF}'
                    | '\u{3400}'..='\u{4DBF}'
                    | '\u{4E00}'..='\u{9FFF}'
                    | '\u{FF66}'..='\u{FF9F}'
            )
    })
}

fn longest_match<T: Copy>(lowered: &str, table: &[(&'static str, T)]) -> Option<T> {
    table
        .iter()
        .filter(|(term, _)| contains_term(lowered, term))
        .fold(None, |best: Option<(usize, T)>, (term, value)| {
            let len = term.chars().count();
            match best {
                Some((best_len, _)) if best_len >= len => best,
                _ => Some((len, *value)),
            }
        })
        .map(|(_, value)| value)
}

/// First well-formed season label in `text`.
///
/// `2023-24` and `2023-2024` are read as written. Without one, a bare year
/// followed by `年` or preceded by `season` names the season ending in that
/// year, so `2016年` is `2015-16`.
pub fn extract_season(text: &str) -> Option<String> {
    for caps in season_regex().captures_iter(text) {
        let start = &caps[1];
        let end = &caps[2];
        let label = if end.len() == 4 {
            format!("{start}-{}", &end[2..])
        } else {
            format!("{start}-{end}")
        };
        if is_season_label(&label) {
            return Some(label);
        }
    }

    year_regex().captures_iter(text).find_map(|caps| {
        let year = caps.get(1).or_else(|| caps.get(2))?;
        season_ending_in(year.as_str().parse().ok()?)
    })
}

/// Canonical player name from the alias table (or a canonical name written
/// in any case), else a run of two or three capitalized words.
pub fn extract_player_name(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    if let Some(name) = longest_match(&lowered, PLAYER_ALIASES) {
        return Some(name.to_string());
    }
    if let Some((_, name)) = PLAYER_ALIASES
        .iter()
        .find(|(_, name)| contains_term(&lowered, &name.to_lowercase()))
    {
        return Some(name.to_string());
    }

    capitalized_run_regex().find_iter(text).find_map(|run| {
        let mut words: Vec<&str> = run.as_str().split_whitespace().collect();
        while words.first().is_some_and(|w| NAME_STOPWORDS.contains(w)) {
            words.remove(0);
        }
        while words.last().is_some_and(|w| NAME_STOPWORDS.contains(w)) {
            words.pop();
        }
        (2..=3).contains(&words.len()).then(|| words.join(" "))
    })
}

pub fn extract_stat_type(text: &str) -> Option<StatType> {
    longest_match(&text.to_lowercase(), STAT_KEYWORDS)
}

/// Turns free text into a [`Query`].
///
/// Heuristics always run. When enabled, the language model is asked for
/// the fields the heuristics left unset; its answers never override a
/// heuristic value.
#[derive(Clone)]
pub struct QueryParser {
    llm: LlmProvider,
    use_llm: bool,
    llm_timeout: Duration,
    cache: Option<ExtractionCache>,
}

impl QueryParser {
    pub fn new(llm: LlmProvider, config: &ParserConfig) -> Self {
        let cache = config.use_llm.then(|| ExtractionCache::new(config.cache_size));
        Self {
            llm,
            use_llm: config.use_llm,
            llm_timeout: Duration::from_secs(config.llm_timeout_secs),
            cache,
        }
    }

    /// Parser that never consults a language model.
    pub fn heuristic() -> Self {
        Self {
            llm: LlmProvider::unavailable("Heuristic parser"),
            use_llm: false,
            llm_timeout: Duration::ZERO,
            cache: None,
        }
    }

    /// Never fails. Fields that cannot be extracted stay `None`.
    pub async fn parse(&self, text: &str) -> Query {
        let mut query = Query {
            text: text.to_string(),
            player_name: extract_player_name(text),
            season: extract_season(text),
            stat_type: extract_stat_type(text),
        };

        let complete =
            query.player_name.is_some() && query.season.is_some() && query.stat_type.is_some();
        if !complete {
            if let Some(fields) = self.extract_with_llm(text).await {
                merge_extracted(&mut query, fields);
            }
        }

        tracing::debug!(
            player = ?query.player_name,
            season = ?query.season,
            stat = ?query.stat_type,
            "Query parsed"
        );
        query
    }

    async fn extract_with_llm(&self, text: &str) -> Option<ExtractedFields> {
        if !self.use_llm {
            return None;
        }

        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if !self.llm.is_available() {
            tracing::debug!("LLM extraction enabled but no model is available");
            return None;
        }

        if let Some(ref cache) = self.cache {
            if let Some(cached) = cache.get(&cache.generate_key(text)) {
                return Some(cached);
            }
        }

        let prompt = prompts::query_extraction_prompt(text);
        let call = self
            .llm
            .complete_structured::<ExtractedFields>(Some(prompts::EXTRACTION_SYSTEM_PROMPT), &prompt);

        match tokio::time::timeout(self.llm_timeout, call).await {
            Ok(Ok(fields)) => {
                if let Some(ref cache) = self.cache {
                    cache.put(cache.generate_key(text), fields.clone());
                }
                Some(fields)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "LLM extraction failed, using heuristics only");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.llm_timeout.as_secs(),
                    "LLM extraction timed out, using heuristics only"
                );
                None
            }
        }
    }
}

/// Fill unset fields from the model's answer, discarding values that do
/// not have the expected shape.
fn merge_extracted(query: &mut Query, fields: ExtractedFields) {
    if query.player_name.is_none() {
        query.player_name = fields
            .player_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty() && name.chars().count() <= MAX_NAME_LEN);
    }

    if query.season.is_none() {
        query.season = fields
            .season
            .map(|season| season.trim().to_string())
            .filter(|season| is_season_label(season));
    }

    if query.stat_type.is_none() {
        query.stat_type = fields.stat_type.and_then(|raw| raw.parse().ok());
    }
}
