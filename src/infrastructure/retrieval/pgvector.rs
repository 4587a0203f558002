//! pgvector retrieval backend

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgPool;
use tracing::{debug, error};

use crate::domain::retrieval::{DOCUMENT_SET_KEY, Passage, RetrievalClient, SOURCE_KEY, SearchParams};
use crate::domain::{DomainError, EmbeddingProvider};

/// Cosine-distance search over a passages table
///
/// Expected columns: `knowledge_scope text`, `document_set_id text`,
/// `source text`, `content text`, `metadata jsonb`, `embedding vector`.
pub struct PgVectorRetrievalClient {
    pool: PgPool,
    embedder: Arc<dyn EmbeddingProvider>,
    embedding_model: String,
    table: String,
}

impl Debug for PgVectorRetrievalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgVectorRetrievalClient")
            .field("table", &self.table)
            .field("embedding_model", &self.embedding_model)
            .field("embedder", &self.embedder)
            .finish()
    }
}

impl PgVectorRetrievalClient {
    pub fn new(
        pool: PgPool,
        embedder: Arc<dyn EmbeddingProvider>,
        embedding_model: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let table = table.into();
        validate_table_name(&table)?;

        Ok(Self {
            pool,
            embedder,
            embedding_model: embedding_model.into(),
            table,
        })
    }

    fn search_sql(&self) -> String {
        format!(
            r#"
            SELECT content, metadata, document_set_id, source,
                   embedding <=> $1::vector AS distance
            FROM {}
            WHERE knowledge_scope = $2
              AND ($3::text[] IS NULL OR document_set_id = ANY($3))
            ORDER BY distance
            LIMIT $4
            "#,
            self.table
        )
    }
}

/// Table names are interpolated, so only identifiers are accepted
fn validate_table_name(table: &str) -> Result<(), DomainError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && !table.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(DomainError::configuration(format!(
            "Invalid table name: {}",
            table
        )))
    }
}

/// `LIMIT` bind value for a requested passage count
fn limit_param(top_k: usize) -> Result<i64, DomainError> {
    i64::try_from(top_k)
        .map_err(|_| DomainError::validation(format!("top_k {} is out of range", top_k)))
}

fn to_pgvector(embedding: &[f32]) -> String {
    let values: Vec<String> = embedding.iter().map(f32::to_string).collect();
    format!("[{}]", values.join(","))
}

fn distance_to_score(distance: f64) -> f32 {
    (1.0 - distance) as f32
}

#[async_trait]
impl RetrievalClient for PgVectorRetrievalClient {
    async fn search(&self, params: SearchParams) -> Result<Vec<Passage>, DomainError> {
        let embedding = self
            .embedder
            .embed(&self.embedding_model, vec![params.query.clone()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::retrieval("Failed to generate query embedding"))?;

        let document_sets: Option<Vec<String>> = params
            .filter
            .as_ref()
            .map(|f| f.ids().into_iter().map(str::to_string).collect());

        debug!(
            scope = %params.knowledge_scope,
            query = %params.query,
            top_k = params.top_k,
            document_sets = ?document_sets,
            "Starting pgvector search"
        );

        let rows = sqlx::query(&self.search_sql())
            .bind(to_pgvector(&embedding))
            .bind(&params.knowledge_scope)
            .bind(document_sets)
            .bind(limit_param(params.top_k)?)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(scope = %params.knowledge_scope, error = %e, "pgvector search failed");
                DomainError::retrieval(format!("Search failed: {}", e))
            })?;

        rows.iter()
            .map(|row| {
                let content: String = row
                    .try_get("content")
                    .map_err(|e| DomainError::retrieval(format!("Bad content column: {}", e)))?;
                let distance: f64 = row
                    .try_get("distance")
                    .map_err(|e| DomainError::retrieval(format!("Bad distance column: {}", e)))?;
                let document_set_id: String = row
                    .try_get("document_set_id")
                    .map_err(|e| DomainError::retrieval(format!("Bad document_set_id: {}", e)))?;
                let source: Option<String> = row.try_get("source").unwrap_or(None);
                let metadata: Option<serde_json::Value> = row.try_get("metadata").unwrap_or(None);

                let mut passage = Passage::new(content, distance_to_score(distance));
                if let Some(serde_json::Value::Object(map)) = metadata {
                    passage.metadata.extend(map);
                }
                passage = passage
                    .with_metadata(DOCUMENT_SET_KEY, serde_json::Value::String(document_set_id));
                if let Some(source) = source {
                    passage = passage.with_metadata(SOURCE_KEY, serde_json::Value::String(source));
                }
                Ok(passage)
            })
            .collect()
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| DomainError::retrieval(format!("Health check failed: {}", e)))
    }

    fn client_type(&self) -> &'static str {
        "pgvector"
    }
}
