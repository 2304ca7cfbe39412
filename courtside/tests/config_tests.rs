use std::env;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use serial_test::serial;

use courtside::config::{parse_llm_provider_model, Config, KNOWN_LLM_PROVIDERS};
use courtside::error::CourtsideError;

const VARS: &[&str] = &[
    "LLM_MODEL",
    "LLM_API_KEY",
    "OPENAI_API_KEY",
    "LLM_BASE_URL",
    "LLM_TIMEOUT",
    "LLM_MAX_RETRIES",
    "LLM_TEMPERATURE",
    "PARSER_USE_LLM",
    "PARSER_LLM_TIMEOUT_SECS",
    "PARSER_CACHE_SIZE",
    "STATS_BASE_URL",
    "STATS_TIMEOUT",
    "STATS_MAX_CONCURRENT_REQUESTS",
    "STATS_ROSTER_PATH",
    "STATS_INDEX_SEASON",
    "PIPELINE_DEFAULT_SEASON",
    "HISTORY_CAPACITY",
    "CHART_OUTPUT_DIR",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_llm_config_provider_prefixes() {
    assert_eq!(parse_llm_provider_model("openai/gpt-4o"), ("openai", "gpt-4o"));
    assert_eq!(
        parse_llm_provider_model("openrouter/anthropic/claude-3.5-sonnet"),
        ("openrouter", "anthropic/claude-3.5-sonnet")
    );
    assert_eq!(parse_llm_provider_model("unknown/model-name"), ("local", "unknown/model-name"));
    assert_eq!(KNOWN_LLM_PROVIDERS.len(), 4);
}

#[test]
#[serial]
fn test_defaults_when_env_is_empty() {
    clear_env();

    let config = Config::from_env();

    assert_eq!(config.llm.model, "openai/gpt-4o-mini");
    assert!(config.llm.api_key.is_none());
    assert_eq!(config.llm.max_retries, 0);
    assert!(!config.parser.use_llm);
    assert_eq!(config.pipeline.default_season, "2024-25");
    assert_eq!(config.pipeline.history_capacity, 100);
    assert_eq!(config.stats.index_season, "2024-25");
    assert!(config.stats.roster_path.is_none());
    assert_eq!(config.chart.output_dir, PathBuf::from("charts"));
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    env::set_var("LLM_MODEL", "ollama/llama3.2");
    env::set_var("LLM_TEMPERATURE", "0.2");
    env::set_var("PARSER_USE_LLM", "true");
    env::set_var("HISTORY_CAPACITY", "25");
    env::set_var("STATS_ROSTER_PATH", "/data/players.json");
    env::set_var("CHART_OUTPUT_DIR", "/tmp/courtside-charts");
    env::set_var("PIPELINE_DEFAULT_SEASON", "2023-24");

    let config = Config::from_env();
    clear_env();

    assert_eq!(config.llm.model, "ollama/llama3.2");
    assert_eq!(config.llm.temperature, Some(0.2));
    assert!(config.parser.use_llm);
    assert_eq!(config.pipeline.history_capacity, 25);
    assert_eq!(config.pipeline.default_season, "2023-24");
    assert_eq!(config.stats.roster_path, Some(PathBuf::from("/data/players.json")));
    assert_eq!(config.chart.output_dir, PathBuf::from("/tmp/courtside-charts"));
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_openai_key_is_a_fallback() {
    clear_env();
    env::set_var("OPENAI_API_KEY", "sk-openai");

    assert_eq!(Config::from_env().llm.api_key.as_deref(), Some("sk-openai"));

    env::set_var("LLM_API_KEY", "sk-primary");
    assert_eq!(Config::from_env().llm.api_key.as_deref(), Some("sk-primary"));

    env::set_var("LLM_API_KEY", "   ");
    assert_eq!(Config::from_env().llm.api_key.as_deref(), Some("sk-openai"));
    clear_env();
}

#[test]
#[serial]
fn test_invalid_numbers_fall_back_to_defaults() {
    clear_env();
    env::set_var("LLM_TIMEOUT", "soon");
    env::set_var("HISTORY_CAPACITY", "-3");
    env::set_var("PARSER_USE_LLM", "yes please");
    env::set_var("LLM_TEMPERATURE", "warm");

    let config = Config::from_env();
    clear_env();

    assert_eq!(config.llm.timeout_secs, 30);
    assert_eq!(config.pipeline.history_capacity, 100);
    assert!(!config.parser.use_llm);
    assert_eq!(config.llm.temperature, None);
}

#[test]
#[serial]
fn test_validate_rejects_unusable_settings() {
    clear_env();

    let missing_key = Config::from_env().validate();
    match missing_key {
        Err(CourtsideError::Config(message)) => assert!(message.contains("LLM_API_KEY")),
        other => panic!("Expected config error, got: {other:?}"),
    }

    env::set_var("LLM_API_KEY", "sk-test");
    env::set_var("HISTORY_CAPACITY", "0");
    let err = Config::from_env().validate().unwrap_err();
    assert!(err.to_string().contains("HISTORY_CAPACITY"));
    assert_eq!(err.exit_code(), 2);

    env::set_var("HISTORY_CAPACITY", "10");
    env::set_var("PIPELINE_DEFAULT_SEASON", "2024");
    let err = Config::from_env().validate().unwrap_err();
    assert!(err.to_string().contains("PIPELINE_DEFAULT_SEASON"));

    clear_env();
}
