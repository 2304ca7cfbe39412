// Shared fixtures for integration tests. Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Once;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use courtside::config::{LlmConfig, StatsConfig};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const CAREER_HEADERS: [&str; 27] = [
    "PLAYER_ID", "SEASON_ID", "LEAGUE_ID", "TEAM_ID", "TEAM_ABBREVIATION", "PLAYER_AGE", "GP",
    "GS", "MIN", "FGM", "FGA", "FG_PCT", "FG3M", "FG3A", "FG3_PCT", "FTM", "FTA", "FT_PCT",
    "OREB", "DREB", "REB", "AST", "STL", "BLK", "TOV", "PF", "PTS",
];

pub fn llm_config(base_url: &str) -> LlmConfig {
    LlmConfig {
        model: "openai/gpt-4o-mini".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(format!("{base_url}/v1")),
        timeout_secs: 5,
        max_retries: 0,
        temperature: None,
    }
}

pub fn stats_config(base_url: &str) -> StatsConfig {
    StatsConfig {
        base_url: format!("{base_url}/stats"),
        timeout_secs: 5,
        ..StatsConfig::default()
    }
}

pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {
            "prompt_tokens": 1,
            "completion_tokens": 1,
            "total_tokens": 2
        }
    })
}

pub fn api_error_body(message: &str, error_type: &str, code: &str) -> Value {
    json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": Value::Null,
            "code": code
        }
    })
}

/// A full per-game career row for LeBron James.
pub fn career_row(season: &str, team: &str, gp: u32, pts: f64) -> Value {
    json!([
        2544, season, "00", 1610612747, team, 40, gp, gp, 34.9, 9.1, 17.8, 0.513, 2.1, 5.6,
        0.376, 4.3, 5.5, 0.782, 1.0, 6.8, 7.8, 8.2, 1.0, 0.6, 3.7, 1.3, pts
    ])
}

pub fn career_body(rows: Vec<Value>) -> Value {
    json!({
        "resource": "playercareerstats",
        "resultSets": [
            { "name": "SeasonTotalsRegularSeason", "headers": CAREER_HEADERS, "rowSet": rows },
            { "name": "CareerTotalsRegularSeason", "headers": [], "rowSet": [] }
        ]
    })
}

pub fn all_players_body(players: &[(u64, &str, &str, bool)]) -> Value {
    let rows: Vec<Value> = players
        .iter()
        .map(|(id, first, last, active)| {
            json!([
                id,
                format!("{last}, {first}"),
                format!("{first} {last}"),
                if *active { 1 } else { 0 },
                "2003",
                "2025",
                "",
                "",
                0,
                "",
                "",
                "LAL"
            ])
        })
        .collect();

    json!({
        "resource": "commonallplayers",
        "resultSets": [{
            "name": "CommonAllPlayers",
            "headers": [
                "PERSON_ID", "DISPLAY_LAST_COMMA_FIRST", "DISPLAY_FIRST_LAST", "ROSTERSTATUS",
                "FROM_YEAR", "TO_YEAR", "PLAYERCODE", "PLAYER_SLUG", "TEAM_ID", "TEAM_CITY",
                "TEAM_NAME", "TEAM_ABBREVIATION"
            ],
            "rowSet": rows
        }]
    })
}

pub fn player_info_body(id: u64, name: &str, team: &str, position: &str) -> Value {
    let mut row = vec![Value::Null; 21];
    row[0] = json!(id);
    row[3] = json!(name);
    row[7] = json!("1984-12-30T00:00:00");
    row[11] = json!("6-9");
    row[12] = json!("250");
    row[15] = json!(position);
    row[20] = json!(team);

    json!({
        "resource": "commonplayerinfo",
        "resultSets": [{ "name": "CommonPlayerInfo", "headers": [], "rowSet": [row] }]
    })
}

/// Serve the player index, LeBron's bio and LeBron's career table.
pub async fn mount_stats(server: &MockServer, career_rows: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/stats/commonallplayers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(all_players_body(&[
            (2544, "LeBron", "James", true),
            (201939, "Stephen", "Curry", true),
            (893, "Michael", "Jordan", false),
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/stats/commonplayerinfo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(player_info_body(2544, "LeBron James", "LAL", "Forward")),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/stats/playercareerstats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(career_body(career_rows)))
        .mount(server)
        .await;
}

/// Answer every chat completion with `content`.
pub async fn mount_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(server)
        .await;
}
