use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use tokio::sync::Semaphore;
use url::Url;

use crate::config::StatsConfig;
use crate::error::{CourtsideError, Result};
use crate::models::PlayerId;

use super::table::{ResultTable, StatsResponse};
use super::traits::StatsProvider;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Stats provider speaking the stats.nba.com JSON API.
///
/// Outbound requests are bounded by a semaphore so concurrent pipeline runs
/// cannot flood the upstream API. Nothing is retried.
#[derive(Clone)]
pub struct HttpStatsProvider {
    client: reqwest::Client,
    base_url: Url,
    index_season: String,
    permits: Arc<Semaphore>,
}

impl HttpStatsProvider {
    pub fn new(config: &StatsConfig) -> Result<Self> {
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers())
            .build()
            .map_err(|error| {
                CourtsideError::Provider(format!("Failed to create stats HTTP client: {error}"))
            })?;

        Ok(Self {
            client,
            base_url,
            index_season: config.index_season.clone(),
            permits: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.join(endpoint)?;
        url.query_pairs_mut().extend_pairs(params.iter().copied());
        Ok(url)
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)], table: &str) -> Result<ResultTable> {
        let url = self.endpoint(endpoint, params)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|error| CourtsideError::Worker(format!("Stats request gate closed: {error}")))?;

        tracing::debug!(%url, "Requesting stats table");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CourtsideError::Provider(format!(
                "{endpoint} returned HTTP {status}"
            )));
        }

        let body: StatsResponse = response.json().await?;
        let table = body.into_table(table);
        tracing::debug!(
            endpoint,
            rows = table.rows.len(),
            columns = table.headers.len(),
            "Stats table received"
        );
        Ok(table)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
    headers.insert("x-nba-stats-token", HeaderValue::from_static("true"));
    headers
}

#[async_trait]
impl StatsProvider for HttpStatsProvider {
    async fn player_index(&self) -> Result<ResultTable> {
        self.fetch(
            "commonallplayers",
            &[
                ("IsOnlyCurrentSeason", "0"),
                ("LeagueID", "00"),
                ("Season", self.index_season.as_str()),
            ],
            "CommonAllPlayers",
        )
        .await
    }

    async fn player_info(&self, player_id: PlayerId) -> Result<ResultTable> {
        let id = player_id.to_string();
        self.fetch(
            "commonplayerinfo",
            &[("PlayerID", id.as_str()), ("LeagueID", "00")],
            "CommonPlayerInfo",
        )
        .await
    }

    async fn career_table(&self, player_id: PlayerId) -> Result<ResultTable> {
        let id = player_id.to_string();
        self.fetch(
            "playercareerstats",
            &[
                ("PlayerID", id.as_str()),
                ("PerMode", "PerGame"),
                ("LeagueID", "00"),
            ],
            "SeasonTotalsRegularSeason",
        )
        .await
    }
}
