use async_trait::async_trait;

use crate::error::Result;
use crate::models::PlayerId;

use super::table::ResultTable;

/// Raw access to the external stats provider.
///
/// Implementations return the provider's tables untouched; callers own the
/// mapping from positional columns to named fields. Any method may fail for
/// reasons outside the process, so callers must treat errors as "no data".
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Every player the provider knows, one row per player
    /// (`CommonAllPlayers` layout).
    async fn player_index(&self) -> Result<ResultTable>;

    /// Biographical row for one player (`CommonPlayerInfo` layout).
    async fn player_info(&self, player_id: PlayerId) -> Result<ResultTable>;

    /// Per-game regular-season rows, one per season and team
    /// (`SeasonTotalsRegularSeason` layout).
    async fn career_table(&self, player_id: PlayerId) -> Result<ResultTable>;
}
