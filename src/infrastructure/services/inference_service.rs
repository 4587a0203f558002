//! Inference service - entry point for running RAG workflows

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::DomainError;
use crate::domain::retrieval::{
    DocumentSetFilter, Passage, RetrievalClient, SearchParams, WebSearchFallback,
};
use crate::domain::workflow::{WorkflowError, WorkflowInput, WorkflowRun, WorkflowState};
use crate::infrastructure::retrieval::NoopWebSearch;
use crate::infrastructure::workflow::{
    AgenticWorkflow, BasicWorkflow, CorrectiveWorkflow, RagCollaborators,
    SelfCorrectingWorkflow, WorkflowEngine,
};

/// The available workflow variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    Basic,
    #[default]
    SelfCorrecting,
    Corrective,
    Agentic,
}

impl WorkflowKind {
    pub const ALL: [WorkflowKind; 4] = [
        Self::Basic,
        Self::SelfCorrecting,
        Self::Corrective,
        Self::Agentic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::SelfCorrecting => "self_correcting",
            Self::Corrective => "corrective",
            Self::Agentic => "agentic",
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "Unknown workflow '{}'. Expected one of: basic, self_correcting, corrective, agentic",
                    s
                ))
            })
    }
}

/// Runs the workflow variants over shared collaborators
#[derive(Debug, Clone)]
pub struct InferenceService {
    basic: BasicWorkflow,
    self_correcting: SelfCorrectingWorkflow,
    corrective: CorrectiveWorkflow,
    agentic: AgenticWorkflow,
    retrieval: Arc<dyn RetrievalClient>,
    top_k: usize,
    engine: WorkflowEngine,
    default_kind: WorkflowKind,
}

impl InferenceService {
    pub fn new(collaborators: RagCollaborators) -> Self {
        Self::with_web_search(collaborators, Arc::new(NoopWebSearch))
    }

    pub fn with_web_search(
        collaborators: RagCollaborators,
        web_search: Arc<dyn WebSearchFallback>,
    ) -> Self {
        Self {
            basic: BasicWorkflow::new(collaborators.clone()),
            self_correcting: SelfCorrectingWorkflow::new(collaborators.clone()),
            corrective: CorrectiveWorkflow::new(collaborators.clone(), web_search),
            agentic: AgenticWorkflow::new(collaborators.clone()),
            retrieval: collaborators.retrieval,
            top_k: collaborators.top_k,
            engine: WorkflowEngine::new(),
            default_kind: WorkflowKind::default(),
        }
    }

    pub fn with_engine(mut self, engine: WorkflowEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_default_kind(mut self, kind: WorkflowKind) -> Self {
        self.default_kind = kind;
        self
    }

    pub fn default_kind(&self) -> WorkflowKind {
        self.default_kind
    }

    /// Run a workflow and return the extracted answer
    pub async fn run_inference(
        &self,
        kind: WorkflowKind,
        input: WorkflowInput,
    ) -> Result<String, WorkflowError> {
        Ok(self.run_with_trace(kind, input).await?.answer())
    }

    /// Run a workflow and return the final state with its step trace
    #[instrument(skip(self, input), fields(workflow = %kind, scope = %input.knowledge_scope))]
    pub async fn run_with_trace(
        &self,
        kind: WorkflowKind,
        input: WorkflowInput,
    ) -> Result<WorkflowRun, WorkflowError> {
        let state = WorkflowState::from_input(input)?;
        info!(
            question = %state.question,
            document_sets = state.document_set_ids.len(),
            prior_messages = state.messages.len().saturating_sub(1),
            "Running inference"
        );

        match kind {
            WorkflowKind::Basic => self.engine.run(&self.basic, state).await,
            WorkflowKind::SelfCorrecting => self.engine.run(&self.self_correcting, state).await,
            WorkflowKind::Corrective => self.engine.run(&self.corrective, state).await,
            WorkflowKind::Agentic => self.engine.run(&self.agentic, state).await,
        }
    }

    /// Raw retrieval against one scope, optionally pinned to a document set
    pub async fn search_passages(
        &self,
        knowledge_scope: &str,
        document_set_id: Option<String>,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<Passage>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::validation("query must not be empty"));
        }
        if knowledge_scope.trim().is_empty() {
            return Err(DomainError::validation("knowledge scope must not be empty"));
        }

        let params = SearchParams::new(knowledge_scope, query)
            .with_top_k(top_k.unwrap_or(self.top_k))
            .with_filter(document_set_id.map(DocumentSetFilter::Equals));

        self.retrieval.search(params).await
    }

    pub async fn retrieval_healthy(&self) -> Result<bool, DomainError> {
        self.retrieval.health_check().await
    }

    pub fn retrieval_backend(&self) -> &'static str {
        self.retrieval.client_type()
    }
}
