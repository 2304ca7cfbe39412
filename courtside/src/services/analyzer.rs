use crate::llm::{prompts, LlmProvider};
use crate::models::PlayerStats;

/// Narrates statistics through the language model.
///
/// Always answers: any model failure, including no model being configured,
/// produces a fixed sentence naming the player and season.
#[derive(Clone)]
pub struct StatsAnalyzer {
    llm: LlmProvider,
}

impl StatsAnalyzer {
    pub fn new(llm: LlmProvider) -> Self {
        Self { llm }
    }

    pub async fn analyze(&self, stats: &PlayerStats) -> String {
        let prompt = prompts::stats_analysis_prompt(stats);
        match self.narrate(&prompt).await {
            Some(answer) => answer,
            None => analysis_fallback(stats),
        }
    }

    pub async fn compare(&self, first: &PlayerStats, second: &PlayerStats) -> String {
        let prompt = prompts::stats_comparison_prompt(first, second);
        match self.narrate(&prompt).await {
            Some(answer) => answer,
            None => comparison_fallback(first, second),
        }
    }

    async fn narrate(&self, prompt: &str) -> Option<String> {
        let reply = self
            .llm
            .complete(Some(prompts::ANALYST_SYSTEM_PROMPT), prompt)
            .await;

        // Blank replies already surface as errors from the client.
        match reply {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "Stats analysis failed, using fallback text");
                None
            }
        }
    }
}

pub fn analysis_fallback(stats: &PlayerStats) -> String {
    format!(
        "{}の{}シーズンの統計データを分析できませんでした。",
        stats.player_name, stats.season
    )
}

pub fn comparison_fallback(first: &PlayerStats, second: &PlayerStats) -> String {
    format!(
        "{}({})と{}({})の統計データを比較できませんでした。",
        first.player_name, first.season, second.player_name, second.season
    )
}
