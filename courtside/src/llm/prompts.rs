//! Prompt templates for the language model.
//!
//! These templates use basic `format!()` interpolation for type safety.
//! Every field of a statistics record is rendered in a fixed order so the
//! same record always yields the same prompt.

use crate::models::PlayerStats;

/// System instruction for narrating statistics.
pub const ANALYST_SYSTEM_PROMPT: &str = r#"あなたはNBAプレイヤーの統計について質問に答える専門アシスタントです。以下のルールに従って日本語で回答してください。

## NBAシーズンの理解
- シーズンは「2023-24」のような形式で表現されます
- 2024年と書かれていたら2023-24シーズンとして解釈してください

## 回答のガイドライン
1. 統計データは分かりやすく日本語で説明してください
2. 数値は適切に四捨五入して表示してください
3. 成功率はパーセント表記で説明してください
4. 統計の意味や重要性についても説明してください
5. 合計値は1試合平均×出場試合数から算出した概算値です

常に親切で分かりやすい回答を心がけてください。"#;

/// System instruction for pulling structured fields out of a question.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You extract structured fields from questions about NBA player statistics.
Respond with a single JSON object and nothing else."#;

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Render every field of a statistics record as a labelled block.
pub fn stats_block(stats: &PlayerStats) -> String {
    format!(
        r#"選手: {name} (ID: {id})
シーズン: {season}
チーム: {team}
ポジション: {position}
出場試合数: {gp} (先発 {gs})
平均出場時間: {min:.1}分
平均得点: {pts:.1}
平均リバウンド: {reb:.1}
平均アシスト: {ast:.1}
平均スティール: {stl:.1}
平均ブロック: {blk:.1}
フィールドゴール成功率: {fg}
3ポイント成功率: {fg3}
フリースロー成功率: {ft}
合計得点(概算): {tpts}
合計リバウンド(概算): {treb}
合計アシスト(概算): {tast}
合計スティール(概算): {tstl}
合計ブロック(概算): {tblk}"#,
        name = stats.player_name,
        id = stats.player_id,
        season = stats.season,
        team = if stats.team.is_empty() { "不明" } else { stats.team.as_str() },
        position = stats.position.as_deref().unwrap_or("不明"),
        gp = stats.games_played,
        gs = stats.games_started,
        min = stats.minutes_per_game,
        pts = stats.points_per_game,
        reb = stats.rebounds_per_game,
        ast = stats.assists_per_game,
        stl = stats.steals_per_game,
        blk = stats.blocks_per_game,
        fg = percent(stats.field_goal_percentage),
        fg3 = percent(stats.three_point_percentage),
        ft = percent(stats.free_throw_percentage),
        tpts = stats.total_points,
        treb = stats.total_rebounds,
        tast = stats.total_assists,
        tstl = stats.total_steals,
        tblk = stats.total_blocks,
    )
}

/// Prompt asking the model to explain one player's season.
///
/// # Example
/// ```
/// use courtside::llm::prompts::stats_analysis_prompt;
/// use courtside::models::{PerGameLine, PlayerId, PlayerStats};
///
/// let stats = PlayerStats::from_per_game(
///     PlayerId(2544),
///     "LeBron James",
///     "2024-25",
///     PerGameLine { games_played: 70, points: 24.4, ..Default::default() },
///     None,
/// );
/// let prompt = stats_analysis_prompt(&stats);
/// assert!(prompt.contains("LeBron James"));
/// assert!(prompt.contains("2024-25"));
/// ```
pub fn stats_analysis_prompt(stats: &PlayerStats) -> String {
    format!(
        r#"以下の統計データをもとに、{name}の{season}シーズンのパフォーマンスを分析してください。
強みと特徴的な数字を挙げ、最後に一言でまとめてください。

{block}"#,
        name = stats.player_name,
        season = stats.season,
        block = stats_block(stats),
    )
}

/// Prompt asking the model to compare two player seasons.
pub fn stats_comparison_prompt(first: &PlayerStats, second: &PlayerStats) -> String {
    format!(
        r#"以下の2つの統計データを比較し、{a}({a_season})と{b}({b_season})の違いを分析してください。
得点・リバウンド・アシスト・シュート効率の観点で比較し、最後にどちらがどの点で優れているかをまとめてください。

## 1人目
{block_a}

## 2人目
{block_b}"#,
        a = first.player_name,
        a_season = first.season,
        b = second.player_name,
        b_season = second.season,
        block_a = stats_block(first),
        block_b = stats_block(second),
    )
}

/// Prompt asking the model for `{player_name, season, stat_type}` as JSON.
pub fn query_extraction_prompt(text: &str) -> String {
    format!(
        r#"Extract the NBA player, season and statistic from the question below.

Rules:
- "player_name": the player's full official English name (e.g. "LeBron James"), or null.
  Translate Japanese or nickname spellings to the official name.
- "season": a season label like "2023-24", or null. A bare year such as "2016" or
  "2016年" means the season ending in that year ("2015-16").
- "stat_type": one of "PTS", "REB", "AST", "STL", "BLK", "FG_PCT", "FG3_PCT",
  "FT_PCT", "MIN", "GP", or null when no single statistic is asked for.

Question:
{text}

Respond with JSON only, for example:
{{"player_name": "LeBron James", "season": "2023-24", "stat_type": "PTS"}}"#
    )
}
