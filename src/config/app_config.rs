use serde::Deserialize;

use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Generation client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Only `openai` (any OpenAI-compatible endpoint) is supported
    pub provider: String,
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalBackend {
    #[default]
    InMemory,
    Pgvector,
}

/// Retrieval client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub backend: RetrievalBackend,
    /// Environment variable holding the Postgres URL
    pub database_url_env: String,
    pub table: String,
    pub embedding_model: String,
    pub top_k: usize,
    /// JSON file of passages loaded into the in-memory backend
    pub seed_file: Option<String>,
}

/// Workflow engine settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub step_budget: usize,
    /// Workflow used when a caller does not name one
    pub default_kind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: RetrievalBackend::default(),
            database_url_env: "DATABASE_URL".to_string(),
            table: "passages".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            top_k: 3,
            seed_file: None,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            step_budget: 50,
            default_kind: "self_correcting".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.retrieval.backend, RetrievalBackend::InMemory);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.workflow.step_budget, 50);
        assert!(config.observability.metrics.enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "retrieval": {"backend": "pgvector", "top_k": 5},
                "workflow": {"step_budget": 12},
                "logging": {"level": "debug", "format": "json"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.retrieval.backend, RetrievalBackend::Pgvector);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.table, "passages");
        assert_eq!(config.workflow.step_budget, 12);
        assert_eq!(config.workflow.default_kind, "self_correcting");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
