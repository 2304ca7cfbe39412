use std::sync::Arc;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::models::{DataSource, Player, PlayerStats, Query, QueryResult, StatType, TrendSeries};
use crate::repository::{PlayerRepository, QueryHistoryStore};

use super::analyzer::StatsAnalyzer;
use super::parser::QueryParser;
use super::validator::QueryValidator;

pub const NO_PLAYER_ANSWER: &str = "プレイヤー名が指定されていません。";

fn invalid_answer(suggestions: &[String]) -> String {
    format!("クエリが無効です。修正案: {}", suggestions.join(", "))
}

fn player_not_found_answer(name: &str) -> String {
    format!("プレイヤー '{name}' が見つかりませんでした。")
}

fn stats_not_found_answer(player: &str, season: &str) -> String {
    format!("{player}の{season}シーズンの統計データが見つかりませんでした。")
}

/// The question-to-answer use case: parse, validate, resolve the player,
/// fetch the season, narrate, record.
///
/// Every call to [`execute`](Self::execute) yields exactly one
/// [`QueryResult`]. Only answers built from provider data are written to
/// history.
#[derive(Clone)]
pub struct QueryPipeline {
    parser: QueryParser,
    validator: QueryValidator,
    analyzer: StatsAnalyzer,
    players: Arc<dyn PlayerRepository>,
    history: Arc<dyn QueryHistoryStore>,
    default_season: String,
}

impl QueryPipeline {
    pub fn new(
        parser: QueryParser,
        analyzer: StatsAnalyzer,
        players: Arc<dyn PlayerRepository>,
        history: Arc<dyn QueryHistoryStore>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            parser,
            validator: QueryValidator::new(),
            analyzer,
            players,
            history,
            default_season: config.default_season.clone(),
        }
    }

    pub fn default_season(&self) -> &str {
        &self.default_season
    }

    pub async fn execute(&self, text: &str) -> QueryResult {
        let started = Instant::now();
        let result = self.run(text).await;

        tracing::info!(
            data_source = %result.data_source,
            player = ?result.query.player_name,
            season = ?result.query.season,
            latency_ms = started.elapsed().as_millis() as u64,
            "Query answered"
        );
        result
    }

    async fn run(&self, text: &str) -> QueryResult {
        let query = self.parser.parse(text).await;

        if !self.validator.validate(&query) {
            let suggestions = self.validator.suggest(&query);
            return QueryResult::new(query, invalid_answer(&suggestions), DataSource::Validation);
        }

        let Some(name) = query.player_name.clone() else {
            return QueryResult::new(query, NO_PLAYER_ANSWER, DataSource::Validation);
        };

        let Some(player) = self.players.find_by_name(&name).await else {
            return QueryResult::new(query, player_not_found_answer(&name), DataSource::PlayerSearch);
        };

        let season = query
            .season
            .clone()
            .unwrap_or_else(|| self.default_season.clone());

        let Some(stats) = self.players.get_stats(player.id, &season).await else {
            return QueryResult::new(
                query,
                stats_not_found_answer(&player.name, &season),
                DataSource::StatsSearch,
            );
        };

        let answer = self.analyzer.analyze(&stats).await;
        let result = QueryResult::new(query, answer, DataSource::Provider);
        self.history.save(result.clone()).await;
        result
    }

    /// Candidate players for a name fragment, at most ten.
    pub async fn search_players(&self, text: &str) -> Vec<Player> {
        self.players.search(text).await
    }

    /// The newest `limit` answered queries, oldest first.
    pub async fn recent_history(&self, limit: usize) -> Vec<QueryResult> {
        self.history.recent(limit).await
    }

    /// Career series of `stat` for the named player. `None` when the player
    /// cannot be resolved; an empty series when the provider has no seasons.
    pub async fn trend(&self, player_name: &str, stat: StatType) -> Option<TrendSeries> {
        let player = self.players.find_by_name(player_name).await?;
        let points = self.players.career_series(player.id, stat).await;
        Some(TrendSeries {
            player_name: player.name,
            stat,
            points,
        })
    }

    /// Narrated comparison of two players' seasons (the default season when
    /// `season` is `None`). Not recorded in history.
    pub async fn compare(&self, first: &str, second: &str, season: Option<&str>) -> String {
        let season = season.unwrap_or(&self.default_season);

        let first = match self.season_stats(first, season).await {
            Ok(stats) => stats,
            Err(answer) => return answer,
        };
        let second = match self.season_stats(second, season).await {
            Ok(stats) => stats,
            Err(answer) => return answer,
        };

        self.analyzer.compare(&first, &second).await
    }

    async fn season_stats(&self, name: &str, season: &str) -> std::result::Result<PlayerStats, String> {
        let player = self
            .players
            .find_by_name(name)
            .await
            .ok_or_else(|| player_not_found_answer(name))?;
        self.players
            .get_stats(player.id, season)
            .await
            .ok_or_else(|| stats_not_found_answer(&player.name, season))
    }

    /// Parse without executing, for callers that only need the structure.
    pub async fn parse(&self, text: &str) -> Query {
        self.parser.parse(text).await
    }
}
