use async_trait::async_trait;

use crate::models::{Player, PlayerId, PlayerStats, QueryResult, StatType, TrendPoint};

/// Player lookups behind the pipeline.
///
/// Lookups never fail at this boundary: a provider outage, a malformed
/// response or an unknown player all come back as "absent". Implementations
/// log the underlying cause.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Resolve a free-form name to one player.
    async fn find_by_name(&self, name: &str) -> Option<Player>;

    /// Regular-season statistics for `season` (`YYYY-YY`).
    async fn get_stats(&self, player_id: PlayerId, season: &str) -> Option<PlayerStats>;

    /// Candidate players whose name contains `text`, at most ten.
    async fn search(&self, text: &str) -> Vec<Player>;

    /// One value of `stat` per season the player appeared in, oldest first.
    async fn career_series(&self, player_id: PlayerId, stat: StatType) -> Vec<TrendPoint>;
}

/// Append-only record of answered queries.
#[async_trait]
pub trait QueryHistoryStore: Send + Sync {
    async fn save(&self, result: QueryResult);

    /// The newest `limit` results, oldest first.
    async fn recent(&self, limit: usize) -> Vec<QueryResult>;

    async fn len(&self) -> usize;
}
