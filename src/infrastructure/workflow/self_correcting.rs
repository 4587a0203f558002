//! Self-correcting RAG: grades documents, groundedness and usefulness, and
//! rewrites the question until an answer passes both generation checks

use async_trait::async_trait;
use tracing::{debug, info};

use super::collaborators::RagCollaborators;
use crate::domain::grading::BinaryScore;
use crate::domain::retrieval::join_contents;
use crate::domain::workflow::{
    StateUpdate, Transition, WorkflowDefinition, WorkflowError, WorkflowState, WorkflowStep,
    require_grade,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfCorrectingStep {
    Retrieve,
    GradeDocuments,
    TransformQuery,
    Generate,
    GradeGroundedness,
    GradeUsefulness,
}

impl WorkflowStep for SelfCorrectingStep {
    fn name(&self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::GradeDocuments => "grade_documents",
            Self::TransformQuery => "transform_query",
            Self::Generate => "generate",
            Self::GradeGroundedness => "grade_groundedness",
            Self::GradeUsefulness => "grade_usefulness",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelfCorrectingWorkflow {
    collaborators: RagCollaborators,
}

impl SelfCorrectingWorkflow {
    pub fn new(collaborators: RagCollaborators) -> Self {
        Self { collaborators }
    }

    fn generation_text(state: &WorkflowState) -> String {
        state
            .generation
            .as_ref()
            .map(|g| g.to_text())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WorkflowDefinition for SelfCorrectingWorkflow {
    type Step = SelfCorrectingStep;

    fn name(&self) -> &'static str {
        "self_correcting"
    }

    fn entry(&self) -> SelfCorrectingStep {
        SelfCorrectingStep::Retrieve
    }

    async fn execute(
        &self,
        step: SelfCorrectingStep,
        state: &WorkflowState,
    ) -> Result<StateUpdate, WorkflowError> {
        let c = &self.collaborators;

        match step {
            SelfCorrectingStep::Retrieve => {
                let documents = c.search(state, &state.question).await?;
                Ok(StateUpdate::new().with_documents(documents))
            }
            SelfCorrectingStep::GradeDocuments => {
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
            SelfCorrectingStep::TransformQuery => {
                let question = c.rewrite_question(step.name(), &state.question).await?;
                Ok(StateUpdate::new().with_question(question))
            }
            SelfCorrectingStep::Generate => {
                let generation = c
                    .generate_answer(&state.question, &join_contents(&state.documents))
                    .await?;
                Ok(StateUpdate::new().with_generation(generation))
            }
            SelfCorrectingStep::GradeGroundedness => {
                let grade = c
                    .grader
                    .grade_groundedness(
                        &join_contents(&state.documents),
                        &Self::generation_text(state),
                    )
                    .await
                    .map_err(|e| WorkflowError::from_grading(step.name(), e))?;
                debug!(grade = %grade, "Groundedness graded");
                Ok(StateUpdate::new().with_groundedness(grade))
            }
            SelfCorrectingStep::GradeUsefulness => {
                let grade = c
                    .grader
                    .grade_usefulness(&state.question, &Self::generation_text(state))
                    .await
                    .map_err(|e| WorkflowError::from_grading(step.name(), e))?;
                debug!(grade = %grade, "Usefulness graded");
                Ok(StateUpdate::new().with_usefulness(grade))
            }
        }
    }

    fn next(
        &self,
        step: SelfCorrectingStep,
        state: &WorkflowState,
    ) -> Result<Transition<SelfCorrectingStep>, WorkflowError> {
        use SelfCorrectingStep::*;

        Ok(match step {
            Retrieve => Transition::Goto(GradeDocuments),
            GradeDocuments if state.documents.is_empty() => Transition::Goto(TransformQuery),
            GradeDocuments => Transition::Goto(Generate),
            TransformQuery => Transition::Goto(Retrieve),
            Generate => Transition::Goto(GradeGroundedness),
            GradeGroundedness => {
                match require_grade(state.groundedness_grade, "groundedness_grade", step)? {
                    BinaryScore::Yes => Transition::Goto(GradeUsefulness),
                    BinaryScore::No => Transition::Goto(Generate),
                }
            }
            GradeUsefulness => {
                match require_grade(state.usefulness_grade, "usefulness_grade", step)? {
                    BinaryScore::Yes => Transition::End,
                    BinaryScore::No => Transition::Goto(TransformQuery),
                }
            }
        })
    }
}
