use thiserror::Error;

#[derive(Error, Debug)]
pub enum CourtsideError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stats provider error: {0}")]
    Provider(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("Worker error: {0}")]
    Worker(String),
}

impl CourtsideError {
    /// Whether the failure came from a collaborator outside the process
    /// (stats provider, language model, network).
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            CourtsideError::Provider(_)
                | CourtsideError::Http(_)
                | CourtsideError::Json(_)
                | CourtsideError::Llm(_)
                | CourtsideError::LlmUnavailable(_)
                | CourtsideError::LlmRateLimit { .. }
        )
    }

    /// Process exit code used by the binary when this error reaches `main`.
    pub fn exit_code(&self) -> i32 {
        match self {
            CourtsideError::Config(_) => 2,
            CourtsideError::Validation(_) => 64,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CourtsideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_classification() {
        assert!(CourtsideError::Provider("boom".to_string()).is_external());
        assert!(CourtsideError::LlmRateLimit { retry_after: None }.is_external());
        assert!(!CourtsideError::Config("missing key".to_string()).is_external());
        assert!(!CourtsideError::Worker("join".to_string()).is_external());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CourtsideError::Config("x".to_string()).exit_code(), 2);
        assert_eq!(CourtsideError::Validation("x".to_string()).exit_code(), 64);
        assert_eq!(CourtsideError::Worker("x".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_display_messages() {
        let error = CourtsideError::LlmRateLimit {
            retry_after: Some(3),
        };
        assert_eq!(
            error.to_string(),
            "LLM rate limit exceeded, retry after Some(3) seconds"
        );
        assert_eq!(
            CourtsideError::Provider("timeout".to_string()).to_string(),
            "Stats provider error: timeout"
        );
    }
}
