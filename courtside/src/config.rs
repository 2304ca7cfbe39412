use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::error::{CourtsideError, Result};
use crate::models::season;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// First non-empty value among the given environment variables.
fn env_first(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub parser: ParserConfig,
    pub stats: StatsConfig,
    pub pipeline: PipelineConfig,
    pub chart: ChartConfig,
}

/// LLM configuration for chat/completion models
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub temperature: Option<f32>,
}

/// Query parsing: whether the language model may fill fields the heuristics miss.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub use_llm: bool,
    pub llm_timeout_secs: u64,
    pub cache_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_concurrent_requests: usize,
    /// Optional JSON file holding the player index; the provider is asked otherwise.
    pub roster_path: Option<PathBuf>,
    pub index_season: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub default_season: String,
    pub history_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    pub output_dir: PathBuf,
}

pub const DEFAULT_LLM_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_STATS_BASE_URL: &str = "https://stats.nba.com/stats";
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 30,
            max_retries: 0,
            temperature: None,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            use_llm: false,
            llm_timeout_secs: 5,
            cache_size: 256,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STATS_BASE_URL.to_string(),
            timeout_secs: 30,
            max_concurrent_requests: 4,
            roster_path: None,
            index_season: season::CURRENT_SEASON.to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_season: season::CURRENT_SEASON.to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("charts"),
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let llm_defaults = LlmConfig::default();
        let parser_defaults = ParserConfig::default();
        let stats_defaults = StatsConfig::default();
        let pipeline_defaults = PipelineConfig::default();
        let chart_defaults = ChartConfig::default();

        Self {
            llm: LlmConfig {
                model: env_first(&["LLM_MODEL"]).unwrap_or(llm_defaults.model),
                api_key: env_first(&["LLM_API_KEY", "OPENAI_API_KEY"]),
                base_url: env_first(&["LLM_BASE_URL"]),
                timeout_secs: parse_env_or("LLM_TIMEOUT", llm_defaults.timeout_secs),
                max_retries: parse_env_or("LLM_MAX_RETRIES", llm_defaults.max_retries),
                temperature: parse_env_opt("LLM_TEMPERATURE"),
            },
            parser: ParserConfig {
                use_llm: parse_env_or("PARSER_USE_LLM", parser_defaults.use_llm),
                llm_timeout_secs: parse_env_or(
                    "PARSER_LLM_TIMEOUT_SECS",
                    parser_defaults.llm_timeout_secs,
                ),
                cache_size: parse_env_or("PARSER_CACHE_SIZE", parser_defaults.cache_size),
            },
            stats: StatsConfig {
                base_url: env_first(&["STATS_BASE_URL"]).unwrap_or(stats_defaults.base_url),
                timeout_secs: parse_env_or("STATS_TIMEOUT", stats_defaults.timeout_secs),
                max_concurrent_requests: parse_env_or(
                    "STATS_MAX_CONCURRENT_REQUESTS",
                    stats_defaults.max_concurrent_requests,
                ),
                roster_path: env_first(&["STATS_ROSTER_PATH"]).map(PathBuf::from),
                index_season: env_first(&["STATS_INDEX_SEASON"])
                    .unwrap_or(stats_defaults.index_season),
            },
            pipeline: PipelineConfig {
                default_season: env_first(&["PIPELINE_DEFAULT_SEASON"])
                    .unwrap_or(pipeline_defaults.default_season),
                history_capacity: parse_env_or(
                    "HISTORY_CAPACITY",
                    pipeline_defaults.history_capacity,
                ),
            },
            chart: ChartConfig {
                output_dir: env_first(&["CHART_OUTPUT_DIR"])
                    .map(PathBuf::from)
                    .unwrap_or(chart_defaults.output_dir),
            },
        }
    }

    /// Reject configurations the process cannot start with.
    pub fn validate(&self) -> Result<()> {
        let (provider, _) = parse_llm_provider_model(&self.llm.model);
        if requires_api_key(provider) && self.llm.api_key.is_none() {
            return Err(CourtsideError::Config(format!(
                "LLM_API_KEY (or OPENAI_API_KEY) must be set for model '{}'",
                self.llm.model
            )));
        }

        if self.pipeline.history_capacity == 0 {
            return Err(CourtsideError::Config(
                "HISTORY_CAPACITY must be greater than zero".to_string(),
            ));
        }

        if self.stats.max_concurrent_requests == 0 {
            return Err(CourtsideError::Config(
                "STATS_MAX_CONCURRENT_REQUESTS must be greater than zero".to_string(),
            ));
        }

        match url::Url::parse(&self.stats.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(CourtsideError::Config(format!(
                    "STATS_BASE_URL must be an http(s) URL, got scheme '{}'",
                    url.scheme()
                )));
            }
            Err(e) => {
                return Err(CourtsideError::Config(format!(
                    "STATS_BASE_URL is not a valid URL ('{}'): {e}",
                    self.stats.base_url
                )));
            }
        }

        for (var, label) in [
            ("PIPELINE_DEFAULT_SEASON", &self.pipeline.default_season),
            ("STATS_INDEX_SEASON", &self.stats.index_season),
        ] {
            if !season::is_season_label(label) {
                return Err(CourtsideError::Config(format!(
                    "{var} must look like 2024-25, got '{label}'"
                )));
            }
        }

        Ok(())
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}

/// Local runtimes accept requests without a credential.
pub fn requires_api_key(provider: &str) -> bool {
    !matches!(
        provider.to_lowercase().as_str(),
        "ollama" | "local" | "lmstudio"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            llm: LlmConfig {
                api_key: Some("sk-test".to_string()),
                ..LlmConfig::default()
            },
            parser: ParserConfig::default(),
            stats: StatsConfig::default(),
            pipeline: PipelineConfig::default(),
            chart: ChartConfig::default(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = valid_config();
        assert_eq!(config.llm.model, "openai/gpt-4o-mini");
        assert_eq!(config.llm.max_retries, 0);
        assert_eq!(config.pipeline.default_season, "2024-25");
        assert_eq!(config.pipeline.history_capacity, 100);
        assert_eq!(config.stats.base_url, "https://stats.nba.com/stats");
        assert!(!config.parser.use_llm);
    }

    #[test]
    fn test_validate_accepts_defaults_with_key() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_key_for_hosted_provider() {
        let mut config = valid_config();
        config.llm.api_key = None;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, CourtsideError::Config(_)));
        assert!(err.to_string().contains("LLM_API_KEY"));
    }

    #[test]
    fn test_validate_allows_local_provider_without_key() {
        let mut config = valid_config();
        config.llm.api_key = None;
        config.llm.model = "ollama/llama3.2".to_string();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_history_capacity() {
        let mut config = valid_config();
        config.pipeline.history_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_default_season() {
        let mut config = valid_config();
        config.pipeline.default_season = "2024".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unusable_stats_base_url() {
        let mut config = valid_config();

        config.stats.base_url = "stats.nba.com/stats".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CourtsideError::Config(_)));
        assert!(err.to_string().contains("STATS_BASE_URL"));
        assert_eq!(err.exit_code(), 2);

        config.stats.base_url = "ftp://stats.nba.com".to_string();
        assert!(matches!(config.validate(), Err(CourtsideError::Config(_))));

        config.stats.base_url = "http://127.0.0.1:9000/stats/".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_llm_provider_model() {
        assert_eq!(
            parse_llm_provider_model("openrouter/anthropic/claude-3.5-sonnet"),
            ("openrouter", "anthropic/claude-3.5-sonnet")
        );
        assert_eq!(
            parse_llm_provider_model("unknown/model-name"),
            ("local", "unknown/model-name")
        );
    }
}
