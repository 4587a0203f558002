//! Corrective RAG: one grading pass, with a rewrite and web search fallback
//! when nothing retrieved is relevant

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::collaborators::RagCollaborators;
use crate::domain::retrieval::{WebSearchFallback, join_contents};
use crate::domain::workflow::{
    StateUpdate, Transition, WorkflowDefinition, WorkflowError, WorkflowState, WorkflowStep,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectiveStep {
    Retrieve,
    GradeDocuments,
    TransformQuery,
    WebSearchFallback,
    Generate,
}

impl WorkflowStep for CorrectiveStep {
    fn name(&self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::GradeDocuments => "grade_documents",
            Self::TransformQuery => "transform_query",
            Self::WebSearchFallback => "web_search_fallback",
            Self::Generate => "generate",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorrectiveWorkflow {
    collaborators: RagCollaborators,
    web_search: Arc<dyn WebSearchFallback>,
}

impl CorrectiveWorkflow {
    pub fn new(collaborators: RagCollaborators, web_search: Arc<dyn WebSearchFallback>) -> Self {
        Self {
            collaborators,
            web_search,
        }
    }
}

#[async_trait]
impl WorkflowDefinition for CorrectiveWorkflow {
    type Step = CorrectiveStep;

    fn name(&self) -> &'static str {
        "corrective"
    }

    fn entry(&self) -> CorrectiveStep {
        CorrectiveStep::Retrieve
    }

    async fn execute(
        &self,
        step: CorrectiveStep,
        state: &WorkflowState,
    ) -> Result<StateUpdate, WorkflowError> {
        let c = &self.collaborators;

        match step {
            CorrectiveStep::Retrieve => {
                let documents = c.search(state, &state.question).await?;
                Ok(StateUpdate::new().with_documents(documents))
            }
            CorrectiveStep::GradeDocuments => {
                let relevant = c
                    .grade_documents(step.name(), &state.question, &state.documents)
                    .await?;
                info!(
                    workflow = self.name(),
                    retrieved = state.documents.len(),
                    relevant = relevant.len(),
                    "Graded documents"
                );
                Ok(StateUpdate::new().with_documents(relevant))
            }
            CorrectiveStep::TransformQuery => {
                let question = c.rewrite_question(step.name(), &state.question).await?;
                Ok(StateUpdate::new().with_question(question))
            }
            CorrectiveStep::WebSearchFallback => {
                let found = self.web_search.search(&state.question).await?;
                debug!(
                    fallback = self.web_search.name(),
                    results = found.len(),
                    "Web search fallback"
                );

                let mut documents = state.documents.clone();
                documents.extend(found);
                Ok(StateUpdate::new().with_documents(documents))
            }
            CorrectiveStep::Generate => {
                let generation = c
                    .generate_answer(&state.question, &join_contents(&state.documents))
                    .await?;
                Ok(StateUpdate::new().with_generation(generation))
            }
        }
    }

    fn next(
        &self,
        step: CorrectiveStep,
        state: &WorkflowState,
    ) -> Result<Transition<CorrectiveStep>, WorkflowError> {
        Ok(match step {
            CorrectiveStep::Retrieve => Transition::Goto(CorrectiveStep::GradeDocuments),
            CorrectiveStep::GradeDocuments if state.documents.is_empty() => {
                Transition::Goto(CorrectiveStep::TransformQuery)
            }
            CorrectiveStep::GradeDocuments => Transition::Goto(CorrectiveStep::Generate),
            CorrectiveStep::TransformQuery => Transition::Goto(CorrectiveStep::WebSearchFallback),
            CorrectiveStep::WebSearchFallback => Transition::Goto(CorrectiveStep::Generate),
            CorrectiveStep::Generate => Transition::End,
        })
    }
}
