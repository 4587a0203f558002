//! RAG orchestrator
//!
//! Retrieval-augmented question answering over pluggable collaborators:
//! - A step-budgeted workflow graph engine with partial state merging
//! - Basic, self-correcting, corrective and agentic workflows
//! - OpenAI-compatible generation and embeddings, in-memory and pgvector retrieval
//! - HTTP API and CLI front ends

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use config::RetrievalBackend;
use domain::grading::Grader;
use domain::retrieval::RetrievalClient;
use infrastructure::embedding::{HttpClient, OpenAiEmbeddingProvider};
use infrastructure::grading::LlmGrader;
use infrastructure::llm::LlmProviderFactory;
use infrastructure::retrieval::{InMemoryRetrievalClient, PgVectorRetrievalClient};
use infrastructure::services::{InferenceService, WorkflowKind};
use infrastructure::workflow::{EngineConfig, RagCollaborators, WorkflowEngine};

/// Wire the configured collaborators into an inference service
pub async fn build_inference_service(config: &AppConfig) -> anyhow::Result<InferenceService> {
    if config.workflow.step_budget == 0 {
        anyhow::bail!("workflow.step_budget must be at least 1");
    }

    let llm = LlmProviderFactory::create(&config.llm)?;
    info!(
        provider = llm.provider_name(),
        model = %config.llm.model,
        "Generation client ready"
    );

    let grader: Arc<dyn Grader> = Arc::new(LlmGrader::new(llm.clone(), &config.llm.model));
    let retrieval = create_retrieval_client(config).await?;

    let collaborators = RagCollaborators::new(llm, &config.llm.model, retrieval, grader)
        .with_temperature(config.llm.temperature)
        .with_top_k(config.retrieval.top_k);

    let default_kind = config.workflow.default_kind.parse::<WorkflowKind>()?;
    let engine = WorkflowEngine::with_config(EngineConfig {
        step_budget: config.workflow.step_budget,
    });
    info!(
        step_budget = engine.step_budget(),
        default_workflow = %default_kind,
        "Workflow engine ready"
    );

    Ok(InferenceService::new(collaborators)
        .with_engine(engine)
        .with_default_kind(default_kind))
}

async fn create_retrieval_client(config: &AppConfig) -> anyhow::Result<Arc<dyn RetrievalClient>> {
    let retrieval = &config.retrieval;

    match retrieval.backend {
        RetrievalBackend::InMemory => {
            let client = InMemoryRetrievalClient::new();
            if let Some(ref path) = retrieval.seed_file {
                let count = client.load_seed_file(path).await?;
                info!(path = %path, passages = count, "Seeded in-memory retrieval");
            }
            Ok(Arc::new(client))
        }
        RetrievalBackend::Pgvector => {
            let database_url = std::env::var(&retrieval.database_url_env).map_err(|_| {
                anyhow::anyhow!(
                    "{} environment variable is required for the pgvector backend",
                    retrieval.database_url_env
                )
            })?;
            let api_key = std::env::var(&config.llm.api_key_env).map_err(|_| {
                anyhow::anyhow!("{} environment variable is not set", config.llm.api_key_env)
            })?;

            info!("Connecting to PostgreSQL...");
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            let client = HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs))?;
            let embedder = match config.llm.base_url {
                Some(ref base_url) => OpenAiEmbeddingProvider::with_base_url(client, api_key, base_url),
                None => OpenAiEmbeddingProvider::new(client, api_key),
            };

            Ok(Arc::new(PgVectorRetrievalClient::new(
                pool,
                Arc::new(embedder),
                &retrieval.embedding_model,
                &retrieval.table,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_step_budget_is_rejected() {
        let mut config = AppConfig::default();
        config.workflow.step_budget = 0;

        let err = build_inference_service(&config).await.unwrap_err();
        assert!(err.to_string().contains("step_budget"));
    }
}
