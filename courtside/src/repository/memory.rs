use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::{Player, PlayerId, PlayerIndexEntry, PlayerStats, StatType, TrendPoint};

use super::index::PlayerIndex;
use super::traits::PlayerRepository;

/// Fixed, in-process [`PlayerRepository`] with the same matching rules as
/// the provider-backed one. Used for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlayerRepository {
    players: HashMap<PlayerId, Player>,
    order: Vec<PlayerId>,
    stats: HashMap<PlayerId, Vec<PlayerStats>>,
    index: PlayerIndex,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player(mut self, player: Player) -> Self {
        if !self.players.contains_key(&player.id) {
            self.order.push(player.id);
        }
        self.players.insert(player.id, player);
        self.reindex();
        self
    }

    /// Add one season. A second record for the same season replaces the first.
    pub fn with_stats(mut self, stats: PlayerStats) -> Self {
        let seasons = self.stats.entry(stats.player_id).or_default();
        seasons.retain(|existing| existing.season != stats.season);
        seasons.push(stats);
        seasons.sort_by(|a, b| a.season.cmp(&b.season));
        self
    }

    fn reindex(&mut self) {
        let entries = self
            .order
            .iter()
            .filter_map(|id| self.players.get(id))
            .map(|player| PlayerIndexEntry {
                id: player.id,
                full_name: player.name.clone(),
                first_name: String::new(),
                last_name: String::new(),
                is_active: true,
                team: player.team.clone(),
            })
            .collect();
        self.index = PlayerIndex::new(entries);
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn find_by_name(&self, name: &str) -> Option<Player> {
        let entry = self.index.best_match(name)?;
        self.players.get(&entry.id).cloned()
    }

    async fn get_stats(&self, player_id: PlayerId, season: &str) -> Option<PlayerStats> {
        self.stats
            .get(&player_id)?
            .iter()
            .find(|stats| stats.season == season)
            .cloned()
    }

    async fn search(&self, text: &str) -> Vec<Player> {
        self.index
            .search(text)
            .into_iter()
            .filter_map(|entry| self.players.get(&entry.id).cloned())
            .collect()
    }

    async fn career_series(&self, player_id: PlayerId, stat: StatType) -> Vec<TrendPoint> {
        self.stats
            .get(&player_id)
            .map(|seasons| {
                seasons
                    .iter()
                    .map(|stats| TrendPoint {
                        season: stats.season.clone(),
                        value: stat.value_of(stats),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PerGameLine;

    fn season(id: u64, season: &str, points: f64) -> PlayerStats {
        PlayerStats::from_per_game(
            PlayerId(id),
            "LeBron James",
            season,
            PerGameLine {
                games_played: 70,
                points,
                ..PerGameLine::default()
            },
            None,
        )
    }

    fn repo() -> InMemoryPlayerRepository {
        InMemoryPlayerRepository::new()
            .with_player(Player::new(PlayerId(2544), "LeBron James", "LAL"))
            .with_player(Player::new(PlayerId(201939), "Stephen Curry", "GSW"))
            .with_stats(season(2544, "2024-25", 24.4))
            .with_stats(season(2544, "2023-24", 25.7))
    }

    #[tokio::test]
    async fn test_find_and_get_stats() {
        let repo = repo();

        let player = repo.find_by_name("lebron james").await.unwrap();
        let stats = repo.get_stats(player.id, "2023-24").await.unwrap();

        assert_eq!(stats.points_per_game, 25.7);
        assert!(repo.get_stats(player.id, "2010-11").await.is_none());
        assert!(repo.find_by_name("Michael Jordan").await.is_none());
    }

    #[tokio::test]
    async fn test_career_series_is_chronological() {
        let series = repo().career_series(PlayerId(2544), StatType::Pts).await;

        let seasons: Vec<&str> = series.iter().map(|p| p.season.as_str()).collect();
        assert_eq!(seasons, vec!["2023-24", "2024-25"]);
    }

    #[tokio::test]
    async fn test_search_by_fragment() {
        let found = repo().search("curry").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].team, "GSW");
    }
}
