use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::OpenAiProvider;
use crate::config::LlmConfig;
use crate::domain::{DomainError, LlmProvider};

/// Builds the generation client from configuration
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the configured provider, reading the API key from the
    /// environment variable named in the config
    pub fn create(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            DomainError::configuration(format!(
                "Environment variable {} is not set",
                config.api_key_env
            ))
        })?;

        Self::create_with_key(config, api_key)
    }

    pub fn create_with_key(
        config: &LlmConfig,
        api_key: impl Into<String>,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        match config.provider.as_str() {
            "openai" => {
                let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;
                let provider = match config.base_url {
                    Some(ref base_url) => OpenAiProvider::with_base_url(client, api_key, base_url),
                    None => OpenAiProvider::new(client, api_key),
                };
                Ok(Arc::new(provider))
            }
            other => Err(DomainError::configuration(format!(
                "Unsupported LLM provider: {}",
                other
            ))),
        }
    }
}
