//! Agentic RAG: the model drives retrieval, a relevance grade decides between
//! answering and rewriting the question

use async_trait::async_trait;
use tracing::debug;

use super::collaborators::RagCollaborators;
use super::prompts::{RETRIEVE_DOCUMENTS_TOOL, retrieve_documents_tool};
use crate::domain::grading::BinaryScore;
use crate::domain::llm::Message;
use crate::domain::retrieval::render_passages;
use crate::domain::workflow::{
    StateUpdate, Transition, WorkflowDefinition, WorkflowError, WorkflowState, WorkflowStep,
    require_grade,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgenticStep {
    Agent,
    Retrieve,
    GradeRelevance,
    TransformQuery,
    Generate,
}

impl WorkflowStep for AgenticStep {
    fn name(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Retrieve => "retrieve",
            Self::GradeRelevance => "grade_relevance",
            Self::TransformQuery => "transform_query",
            Self::Generate => "generate",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgenticWorkflow {
    collaborators: RagCollaborators,
}

impl AgenticWorkflow {
    pub fn new(collaborators: RagCollaborators) -> Self {
        Self { collaborators }
    }
}

#[async_trait]
impl WorkflowDefinition for AgenticWorkflow {
    type Step = AgenticStep;

    fn name(&self) -> &'static str {
        "agentic"
    }

    fn entry(&self) -> AgenticStep {
        AgenticStep::Agent
    }

    async fn execute(
        &self,
        step: AgenticStep,
        state: &WorkflowState,
    ) -> Result<StateUpdate, WorkflowError> {
        let c = &self.collaborators;

        match step {
            AgenticStep::Agent => c.decide(state, retrieve_documents_tool()).await,
            AgenticStep::Retrieve => {
                c.answer_tool_calls(step.name(), state, RETRIEVE_DOCUMENTS_TOOL)
                    .await
            }
            AgenticStep::GradeRelevance => {
                let context = render_passages(&state.last_tool_results);
                let grade = c
                    .grader
                    .grade_relevance(&state.original_question, &context)
                    .await
                    .map_err(|e| WorkflowError::from_grading(step.name(), e))?;
                debug!(grade = %grade, passages = state.last_tool_results.len(), "Relevance graded");
                Ok(StateUpdate::new().with_relevance(grade))
            }
            AgenticStep::TransformQuery => {
                let question = c.rewrite_question(step.name(), &state.question).await?;
                Ok(StateUpdate::new()
                    .with_messages(state.messages_with(Message::user(question.clone())))
                    .with_question(question))
            }
            AgenticStep::Generate => {
                let context = render_passages(&state.last_tool_results);
                let generation = c
                    .generate_answer(&state.original_question, &context)
                    .await?;
                Ok(StateUpdate::new()
                    .with_messages(state.messages_with(Message::assistant(generation.to_text())))
                    .with_generation(generation))
            }
        }
    }

    fn next(
        &self,
        step: AgenticStep,
        state: &WorkflowState,
    ) -> Result<Transition<AgenticStep>, WorkflowError> {
        Ok(match step {
            AgenticStep::Agent if state.last_message().is_some_and(Message::has_tool_calls) => {
                Transition::Goto(AgenticStep::Retrieve)
            }
            AgenticStep::Agent => Transition::End,
            AgenticStep::Retrieve => Transition::Goto(AgenticStep::GradeRelevance),
            AgenticStep::GradeRelevance => {
                match require_grade(state.relevance_grade, "relevance_grade", step)? {
                    BinaryScore::Yes => Transition::Goto(AgenticStep::Generate),
                    BinaryScore::No => Transition::Goto(AgenticStep::TransformQuery),
                }
            }
            AgenticStep::TransformQuery => Transition::Goto(AgenticStep::Agent),
            AgenticStep::Generate => Transition::End,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grading::mock::MockGrader;
    use crate::domain::llm::MessageRole;
    use crate::domain::retrieval::mock::MockRetrievalClient;
    use crate::infrastructure::workflow::collaborators::testing::*;
    use crate::infrastructure::workflow::{EngineConfig, WorkflowEngine};

    fn retrieval() -> MockRetrievalClient {
        MockRetrievalClient::new().with_batches(vec![
            vec![passage("football scores")],
            vec![passage("forest cover fell"), passage("kenya report")],
        ])
    }

    #[tokio::test]
    async fn test_irrelevant_then_relevant_retrieval() {
        let fixture = Fixture::new(
            routing_llm(None),
            retrieval(),
            MockGrader::new().with_relevance(vec![BinaryScore::No], BinaryScore::Yes),
        );
        let workflow = AgenticWorkflow::new(fixture.collaborators());

        let run = WorkflowEngine::new()
            .run(&workflow, state("kenya forest?"))
            .await
            .unwrap();

        assert_eq!(
            run.step_names(),
            vec![
                "agent",
                "retrieve",
                "grade_relevance",
                "transform_query",
                "agent",
                "retrieve",
                "grade_relevance",
                "generate"
            ]
        );
        assert!(!run.answer().is_empty());
        assert_eq!(run.final_state.last_tool_results.len(), 2);
        assert!(run.final_state.documents.is_empty());

        // the rewritten question is visible to the second agent turn
        let rewrite = run
            .final_state
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .last()
            .and_then(|m| m.content_text());
        assert_eq!(rewrite, Some(REWRITTEN));

        // generation answers the caller's question, not the rewrite
        let prompt = fixture.llm.requests().pop().unwrap().messages[0].full_text();
        assert!(prompt.contains("Question: kenya forest?"));
        assert!(prompt.contains("Content: forest cover fell"));
    }

    #[tokio::test]
    async fn test_direct_answer_ends_without_grading() {
        let fixture = Fixture::new(
            routing_llm(Some("Nothing to look up.")),
            retrieval(),
            MockGrader::new(),
        );
        let workflow = AgenticWorkflow::new(fixture.collaborators());

        let run = WorkflowEngine::new()
            .run(&workflow, state("thanks"))
            .await
            .unwrap();

        assert_eq!(run.step_names(), vec!["agent"]);
        assert_eq!(run.answer(), "Nothing to look up.");
        assert_eq!(fixture.grader.relevance_calls(), 0);
        assert_eq!(fixture.retrieval.search_count(), 0);
    }

    #[tokio::test]
    async fn test_always_irrelevant_exhausts_budget() {
        let fixture = Fixture::new(
            routing_llm(None),
            MockRetrievalClient::new().with_passages(vec![passage("noise")]),
            MockGrader::always_no(),
        );
        let workflow = AgenticWorkflow::new(fixture.collaborators());

        let err = WorkflowEngine::with_config(EngineConfig { step_budget: 12 })
            .run(&workflow, state("kenya forest?"))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::RecursionExceeded { budget: 12, .. }));
    }
}
