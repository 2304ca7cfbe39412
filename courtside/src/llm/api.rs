//! Chat-completion client for any OpenAI-compatible endpoint.

use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::error::{ApiError, OpenAIError};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;
use reqwest::StatusCode;

use crate::config::{parse_llm_provider_model, requires_api_key, LlmConfig};
use crate::error::{CourtsideError, Result};

use super::provider::Reply;

const RATE_LIMIT_MARKERS: &[&str] = &[
    "rate limit",
    "rate_limit",
    "too many requests",
    "insufficient_quota",
];

const AUTH_MARKERS: &[&str] = &[
    "unauthorized",
    "forbidden",
    "authentication",
    "invalid api key",
    "invalid_api_key",
];

/// Endpoint for a provider prefix when `LLM_BASE_URL` is unset.
pub(crate) fn default_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "lmstudio" => "http://localhost:1234/v1",
        _ => "https://api.openai.com/v1",
    }
}

#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    max_retries: u32,
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let (provider, model) = parse_llm_provider_model(&config.model);
        if requires_api_key(provider) && config.api_key.is_none() {
            return Err(CourtsideError::Llm(format!(
                "API key required for model '{}'",
                config.model
            )));
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());
        let timeout = Duration::from_secs(config.timeout_secs);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CourtsideError::Llm(format!("Failed to build LLM HTTP client: {e}")))?;

        // async-openai backs off on 429/5xx by itself. A zero budget makes one
        // failed call final; `LLM_MAX_RETRIES` is the only retry knob.
        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let openai = OpenAIConfig::new()
            .with_api_base(base_url.as_str())
            .with_api_key(config.api_key.clone().unwrap_or_default());

        Ok(Self {
            client: Client::with_config(openai)
                .with_http_client(http)
                .with_backoff(backoff),
            base_url,
            model: model.to_string(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One system + user exchange. Returns the first choice's text, which is
    /// never blank.
    pub async fn chat(&self, system: Option<&str>, prompt: &str, reply: Reply) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(CourtsideError::Validation("Prompt cannot be empty".to_string()));
        }

        let request = self.request(system, prompt, reply)?;

        let mut attempt = 0;
        let response = loop {
            match self.client.chat().create(request.clone()).await {
                Ok(response) => break response,
                Err(error) => {
                    let transient = is_transient(&error);
                    let error = classify(error);
                    if !transient || attempt >= self.max_retries {
                        return Err(error);
                    }
                    attempt += 1;
                    tracing::debug!(attempt, error = %error, "Retrying LLM request");
                    tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                }
            }
        };

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(CourtsideError::Llm("LLM returned an empty reply".to_string()));
        }
        Ok(content)
    }

    fn request(
        &self,
        system: Option<&str>,
        prompt: &str,
        reply: Reply,
    ) -> Result<CreateChatCompletionRequest> {
        let invalid = |e: OpenAIError| CourtsideError::Validation(format!("Invalid LLM request: {e}"));

        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);
        if let Some(system) = system.filter(|text| !text.trim().is_empty()) {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(invalid)?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(invalid)?
                .into(),
        );

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.as_str()).messages(messages);
        if let Some(temperature) = self.temperature {
            args.temperature(temperature);
        }
        if reply == Reply::Json {
            args.response_format(ResponseFormat::JsonObject);
        }
        args.build().map_err(invalid)
    }
}

/// Connection failures and 5xx responses are worth another attempt.
fn is_transient(error: &OpenAIError) -> bool {
    match error {
        OpenAIError::Reqwest(e) => e.status().map_or(true, |status| status.is_server_error()),
        _ => false,
    }
}

fn mentions(api: &ApiError, markers: &[&str]) -> bool {
    let text = format!(
        "{} {} {}",
        api.message,
        api.r#type.as_deref().unwrap_or_default(),
        api.code.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    markers.iter().any(|marker| text.contains(marker))
}

/// Map a transport or API failure onto the crate's error kinds.
fn classify(error: OpenAIError) -> CourtsideError {
    match error {
        OpenAIError::Reqwest(e) => match e.status() {
            Some(StatusCode::TOO_MANY_REQUESTS) => CourtsideError::LlmRateLimit { retry_after: None },
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN) => {
                CourtsideError::Llm(format!("LLM authentication failed: {e}"))
            }
            _ => CourtsideError::Llm(format!("LLM request failed: {e}")),
        },
        OpenAIError::ApiError(api) if mentions(&api, RATE_LIMIT_MARKERS) => {
            CourtsideError::LlmRateLimit { retry_after: None }
        }
        OpenAIError::ApiError(api) if mentions(&api, AUTH_MARKERS) => {
            CourtsideError::Llm(format!("LLM authentication failed: {api}"))
        }
        OpenAIError::ApiError(api) => CourtsideError::Llm(format!("LLM API error: {api}")),
        OpenAIError::JSONDeserialize(e) => {
            CourtsideError::Llm(format!("Unreadable LLM response: {e}"))
        }
        OpenAIError::InvalidArgument(message) => CourtsideError::Validation(message),
        other => CourtsideError::Llm(other.to_string()),
    }
}
