use serde::de::DeserializeOwned;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{CourtsideError, Result};
use crate::llm::api::LlmApiClient;

/// Which endpoint family a model prefix selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

impl LlmBackend {
    fn detect(config: &LlmConfig) -> Self {
        let (provider, _) = parse_llm_provider_model(&config.model);
        match (provider.to_lowercase().as_str(), &config.base_url) {
            ("openai", _) => Self::OpenAI,
            ("openrouter", _) => Self::OpenRouter,
            ("ollama", _) => Self::Ollama,
            ("lmstudio", _) => Self::LmStudio,
            (_, Some(base_url)) => Self::OpenAICompatible {
                base_url: base_url.clone(),
            },
            (_, None) => Self::Unavailable {
                reason: format!("Unknown provider in model '{}' and no LLM_BASE_URL", config.model),
            },
        }
    }
}

/// Shape of the reply a prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Text,
    /// JSON mode: the model must answer with one object.
    Json,
}

/// Cheaply clonable handle to the configured chat model.
///
/// Construction never fails: a missing credential or an unrecognised model
/// prefix yields an unavailable provider whose calls fail fast with
/// [`CourtsideError::LlmUnavailable`].
#[derive(Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    client: Option<LlmApiClient>,
}

impl std::fmt::Debug for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmProvider")
            .field("backend", &self.backend)
            .field("model", &self.client.as_ref().map(LlmApiClient::model))
            .finish()
    }
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let backend = LlmBackend::detect(config);
        if let LlmBackend::Unavailable { reason } = &backend {
            return Self::unavailable(reason);
        }

        match LlmApiClient::new(config) {
            Ok(client) => Self {
                backend,
                client: Some(client),
            },
            Err(e) => Self::unavailable(&e.to_string()),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            client: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    /// Endpoint requests go to, `None` when the provider is unavailable.
    pub fn base_url(&self) -> Option<&str> {
        self.client.as_ref().map(LlmApiClient::base_url)
    }

    pub async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        self.client()?.chat(system, prompt, Reply::Text).await
    }

    /// JSON-mode completion decoded into `T`. A Markdown code fence around
    /// the object is tolerated.
    pub async fn complete_structured<T: DeserializeOwned>(
        &self,
        system: Option<&str>,
        prompt: &str,
    ) -> Result<T> {
        let content = self.client()?.chat(system, prompt, Reply::Json).await?;

        serde_json::from_str(strip_code_fence(&content)).map_err(|e| {
            tracing::warn!(
                error = %e,
                preview = %content.chars().take(100).collect::<String>(),
                "LLM reply is not the expected JSON"
            );
            CourtsideError::Llm(format!("Failed to decode LLM JSON reply: {e}"))
        })
    }

    fn client(&self) -> Result<&LlmApiClient> {
        self.client.as_ref().ok_or_else(|| {
            let reason = match &self.backend {
                LlmBackend::Unavailable { reason } => reason.clone(),
                _ => "LLM backend is not available".to_string(),
            };
            CourtsideError::LlmUnavailable(reason)
        })
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_makes_provider_unavailable() {
        let provider = LlmProvider::new(Some(&LlmConfig::default()));

        assert!(!provider.is_available());
        match provider.backend() {
            LlmBackend::Unavailable { reason } => assert!(reason.contains("API key required")),
            other => panic!("expected unavailable backend, got {other:?}"),
        }
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
    }
}
