use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lru::LruCache;

use crate::config::StatsConfig;
use crate::error::Result;
use crate::models::{Player, PlayerId, PlayerIndexEntry, PlayerStats, StatType, TrendPoint};
use crate::stats::{load_roster_file, StatsProvider};

use super::index::PlayerIndex;
use super::normalize;
use super::traits::PlayerRepository;

const DETAILS_CACHE_SIZE: usize = 512;

/// [`PlayerRepository`] backed by the live stats provider.
///
/// The name index is loaded once at construction, from the roster file when
/// one is configured and from the provider otherwise. Biographical details
/// fetched by [`find_by_name`](PlayerRepository::find_by_name) are memoized
/// for the life of the process.
pub struct ProviderPlayerRepository {
    provider: Arc<dyn StatsProvider>,
    index: PlayerIndex,
    details: Mutex<LruCache<PlayerId, Player>>,
}

impl ProviderPlayerRepository {
    /// Build the repository. Never fails: an index that cannot be loaded is
    /// logged and replaced by an empty one, and name lookups then go to the
    /// provider directly.
    pub async fn new(provider: Arc<dyn StatsProvider>, config: &StatsConfig) -> Self {
        let entries = match load_index(provider.as_ref(), config).await {
            Ok(entries) => {
                tracing::info!(players = entries.len(), "Player index loaded");
                entries
            }
            Err(error) => {
                tracing::warn!(error = %error, "Player index unavailable, continuing with an empty index");
                Vec::new()
            }
        };
        Self::with_index(provider, entries)
    }

    /// Build the repository around an already loaded index.
    pub fn with_index(provider: Arc<dyn StatsProvider>, entries: Vec<PlayerIndexEntry>) -> Self {
        let capacity = NonZeroUsize::new(DETAILS_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            provider,
            index: PlayerIndex::new(entries),
            details: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    fn cached_details(&self, id: PlayerId) -> Option<Player> {
        let mut cache = self.details.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get(&id).cloned()
    }

    fn remember_details(&self, player: &Player) {
        let mut cache = self.details.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.put(player.id, player.clone());
    }

    /// Enrich an index entry with the provider's biographical row. Falls
    /// back to the bare entry when the provider has nothing usable.
    async fn details_for(&self, entry: &PlayerIndexEntry) -> Player {
        if let Some(player) = self.cached_details(entry.id) {
            return player;
        }

        let player = match self.provider.player_info(entry.id).await {
            Ok(table) => match normalize::player_from_info(&table) {
                Some(mut player) => {
                    if player.team.is_empty() {
                        player.team = entry.team.clone();
                    }
                    player
                }
                None => entry.to_player(),
            },
            Err(error) => {
                tracing::warn!(player_id = %entry.id, error = %error, "Player info lookup failed");
                return entry.to_player();
            }
        };

        self.remember_details(&player);
        player
    }

    /// Index fallback: refetch the full list and look for an exact name.
    async fn find_live(&self, name: &str) -> Option<PlayerIndexEntry> {
        match self.provider.player_index().await {
            Ok(table) => {
                let live = PlayerIndex::new(normalize::index_from_table(&table));
                live.exact(name).cloned()
            }
            Err(error) => {
                tracing::warn!(name, error = %error, "Live player lookup failed");
                None
            }
        }
    }

    /// Display name and position for a stats record, cheapest source first.
    async fn identity(&self, player_id: PlayerId) -> (String, Option<String>) {
        if let Some(player) = self.cached_details(player_id) {
            return (player.name, player.position);
        }
        if let Some(entry) = self.index.get(player_id) {
            return (entry.full_name.clone(), None);
        }
        match self.provider.player_info(player_id).await {
            Ok(table) => match normalize::player_from_info(&table) {
                Some(player) => {
                    self.remember_details(&player);
                    (player.name, player.position)
                }
                None => (String::new(), None),
            },
            Err(error) => {
                tracing::debug!(%player_id, error = %error, "No biographical row for stats record");
                (String::new(), None)
            }
        }
    }
}

async fn load_index(provider: &dyn StatsProvider, config: &StatsConfig) -> Result<Vec<PlayerIndexEntry>> {
    if let Some(path) = &config.roster_path {
        return load_roster_file(path).await;
    }
    let table = provider.player_index().await?;
    Ok(normalize::index_from_table(&table))
}

#[async_trait]
impl PlayerRepository for ProviderPlayerRepository {
    async fn find_by_name(&self, name: &str) -> Option<Player> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let entry = match self.index.best_match(name) {
            Some(entry) => entry.clone(),
            None => self.find_live(name).await?,
        };

        tracing::debug!(query = name, player_id = %entry.id, matched = %entry.full_name, "Player resolved");
        Some(self.details_for(&entry).await)
    }

    async fn get_stats(&self, player_id: PlayerId, season: &str) -> Option<PlayerStats> {
        let table = match self.provider.career_table(player_id).await {
            Ok(table) => table,
            Err(error) => {
                tracing::warn!(%player_id, season, error = %error, "Career stats lookup failed");
                return None;
            }
        };

        if table.is_empty() {
            tracing::debug!(%player_id, "Career table is empty");
            return None;
        }

        let (name, position) = self.identity(player_id).await;
        normalize::stats_from_career(&table, player_id, &name, season, position)
    }

    async fn search(&self, text: &str) -> Vec<Player> {
        self.index
            .search(text)
            .into_iter()
            .map(PlayerIndexEntry::to_player)
            .collect()
    }

    async fn career_series(&self, player_id: PlayerId, stat: StatType) -> Vec<TrendPoint> {
        match self.provider.career_table(player_id).await {
            Ok(table) => normalize::series_from_career(&table, stat),
            Err(error) => {
                tracing::warn!(%player_id, %stat, error = %error, "Career series lookup failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CourtsideError;
    use crate::stats::ResultTable;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider serving canned tables and counting calls.
    #[derive(Default)]
    struct FakeProvider {
        index: Option<ResultTable>,
        info: Option<ResultTable>,
        career: Option<ResultTable>,
        index_calls: AtomicUsize,
        info_calls: AtomicUsize,
    }

    fn unavailable() -> CourtsideError {
        CourtsideError::Provider("offline".to_string())
    }

    #[async_trait]
    impl StatsProvider for FakeProvider {
        async fn player_index(&self) -> Result<ResultTable> {
            self.index_calls.fetch_add(1, Ordering::SeqCst);
            self.index.clone().ok_or_else(unavailable)
        }

        async fn player_info(&self, _player_id: PlayerId) -> Result<ResultTable> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            self.info.clone().ok_or_else(unavailable)
        }

        async fn career_table(&self, _player_id: PlayerId) -> Result<ResultTable> {
            self.career.clone().ok_or_else(unavailable)
        }
    }

    fn entry(id: u64, name: &str) -> PlayerIndexEntry {
        PlayerIndexEntry {
            id: PlayerId(id),
            full_name: name.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            team: "LAL".to_string(),
        }
    }

    fn index_table() -> ResultTable {
        ResultTable {
            name: "CommonAllPlayers".to_string(),
            headers: vec![
                "PERSON_ID".to_string(),
                "DISPLAY_LAST_COMMA_FIRST".to_string(),
                "DISPLAY_FIRST_LAST".to_string(),
                "ROSTERSTATUS".to_string(),
            ],
            rows: vec![vec![json!(201939), json!("Curry, Stephen"), json!("Stephen Curry"), json!(1)]],
        }
    }

    fn info_table() -> ResultTable {
        let mut row = vec![Value::Null; 21];
        row[0] = json!(2544);
        row[3] = json!("LeBron James");
        row[15] = json!("Forward");
        row[20] = json!("LAL");
        ResultTable {
            name: "CommonPlayerInfo".to_string(),
            headers: Vec::new(),
            rows: vec![row],
        }
    }

    fn career_table() -> ResultTable {
        let mut row = vec![Value::Null; 27];
        row[1] = json!("2024-25");
        row[4] = json!("LAL");
        row[6] = json!(70);
        row[26] = json!(25.3);
        ResultTable {
            name: "SeasonTotalsRegularSeason".to_string(),
            headers: Vec::new(),
            rows: vec![row],
        }
    }

    #[tokio::test]
    async fn test_new_loads_index_from_provider() {
        let provider = Arc::new(FakeProvider {
            index: Some(index_table()),
            ..Default::default()
        });

        let repo = ProviderPlayerRepository::new(provider.clone(), &StatsConfig::default()).await;

        assert_eq!(repo.index_len(), 1);
        assert_eq!(provider.index_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_new_survives_unavailable_provider() {
        let repo = ProviderPlayerRepository::new(Arc::new(FakeProvider::default()), &StatsConfig::default()).await;

        assert_eq!(repo.index_len(), 0);
        assert!(repo.find_by_name("LeBron James").await.is_none());
    }

    #[tokio::test]
    async fn test_find_by_name_enriches_and_memoizes() {
        let provider = Arc::new(FakeProvider {
            info: Some(info_table()),
            ..Default::default()
        });
        let repo = ProviderPlayerRepository::with_index(provider.clone(), vec![entry(2544, "LeBron James")]);

        let first = repo.find_by_name("lebron james").await.unwrap();
        let second = repo.find_by_name("LEBRON JAMES").await.unwrap();

        assert_eq!(first.id, PlayerId(2544));
        assert_eq!(first.position.as_deref(), Some("Forward"));
        assert_eq!(first, second);
        assert_eq!(provider.info_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_find_by_name_falls_back_to_bare_entry() {
        let repo = ProviderPlayerRepository::with_index(
            Arc::new(FakeProvider::default()),
            vec![entry(2544, "LeBron James")],
        );

        let player = repo.find_by_name("LeBron").await.unwrap();

        assert_eq!(player.name, "LeBron James");
        assert_eq!(player.team, "LAL");
        assert!(player.position.is_none());
    }

    #[tokio::test]
    async fn test_find_by_name_live_fallback_requires_exact_name() {
        let provider = Arc::new(FakeProvider {
            index: Some(index_table()),
            ..Default::default()
        });
        let repo = ProviderPlayerRepository::with_index(provider, Vec::new());

        assert_eq!(
            repo.find_by_name("stephen curry").await.map(|p| p.id),
            Some(PlayerId(201939))
        );
        assert!(repo.find_by_name("Curry").await.is_none());
    }

    #[tokio::test]
    async fn test_get_stats_uses_index_name() {
        let provider = Arc::new(FakeProvider {
            career: Some(career_table()),
            ..Default::default()
        });
        let repo = ProviderPlayerRepository::with_index(provider.clone(), vec![entry(2544, "LeBron James")]);

        let stats = repo.get_stats(PlayerId(2544), "2024-25").await.unwrap();

        assert_eq!(stats.player_name, "LeBron James");
        assert_eq!(stats.points_per_game, 25.3);
        assert_eq!(stats.total_points, 1771);
        assert_eq!(provider.info_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_stats_absent_cases() {
        let repo = ProviderPlayerRepository::with_index(
            Arc::new(FakeProvider {
                career: Some(career_table()),
                ..Default::default()
            }),
            vec![entry(2544, "LeBron James")],
        );
        assert!(repo.get_stats(PlayerId(2544), "1999-00").await.is_none());

        let offline = ProviderPlayerRepository::with_index(Arc::new(FakeProvider::default()), Vec::new());
        assert!(offline.get_stats(PlayerId(2544), "2024-25").await.is_none());
        assert!(offline.career_series(PlayerId(2544), StatType::Pts).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let entries = (0..15).map(|i| entry(i, &format!("James Player{i}"))).collect();
        let repo = ProviderPlayerRepository::with_index(Arc::new(FakeProvider::default()), entries);

        assert_eq!(repo.search("james").await.len(), 10);
        assert!(repo.search("nobody").await.is_empty());
    }
}
