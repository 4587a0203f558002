//! Tool-calling retrieval loop: the model decides whether to retrieve

use async_trait::async_trait;
use tracing::debug;

use super::collaborators::{RagCollaborators, render};
use super::prompts::{RETRIEVE_TOOL, TOOL_ANSWER_PROMPT, retrieve_tool};
use crate::domain::llm::{LlmRequest, Message, MessageRole};
use crate::domain::retrieval::render_passages;
use crate::domain::workflow::{
    StateUpdate, Transition, WorkflowDefinition, WorkflowError, WorkflowState, WorkflowStep,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicStep {
    Decide,
    Retrieve,
    Generate,
}

impl WorkflowStep for BasicStep {
    fn name(&self) -> &'static str {
        match self {
            Self::Decide => "decide",
            Self::Retrieve => "retrieve",
            Self::Generate => "generate",
        }
    }
}

/// `decide -> (retrieve -> generate)? -> end`
#[derive(Debug, Clone)]
pub struct BasicWorkflow {
    collaborators: RagCollaborators,
}

impl BasicWorkflow {
    pub fn new(collaborators: RagCollaborators) -> Self {
        Self { collaborators }
    }

    async fn generate(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let context = render_passages(&state.last_tool_results);
        let instruction = render(&TOOL_ANSWER_PROMPT, &[("context", &context)])?;

        let conversation = state.messages.iter().filter(|m| match m.role {
            MessageRole::User | MessageRole::System => true,
            MessageRole::Assistant => !m.has_tool_calls(),
            MessageRole::Tool => false,
        });

        let request = LlmRequest::builder()
            .system(instruction)
            .messages(conversation.cloned())
            .temperature(self.collaborators.temperature)
            .build();

        let response = self.collaborators.chat(request).await?;
        let generation = response.generated_content();
        debug!(passages = state.last_tool_results.len(), "Generated answer from tool results");

        Ok(StateUpdate::new()
            .with_messages(state.messages_with(response.message))
            .with_generation(generation))
    }
}

#[async_trait]
impl WorkflowDefinition for BasicWorkflow {
    type Step = BasicStep;

    fn name(&self) -> &'static str {
        "basic"
    }

    fn entry(&self) -> BasicStep {
        BasicStep::Decide
    }

    async fn execute(
        &self,
        step: BasicStep,
        state: &WorkflowState,
    ) -> Result<StateUpdate, WorkflowError> {
        match step {
            BasicStep::Decide => self.collaborators.decide(state, retrieve_tool()).await,
            BasicStep::Retrieve => {
                self.collaborators
                    .answer_tool_calls(step.name(), state, RETRIEVE_TOOL)
                    .await
            }
            BasicStep::Generate => self.generate(state).await,
        }
    }

    fn next(
        &self,
        step: BasicStep,
        state: &WorkflowState,
    ) -> Result<Transition<BasicStep>, WorkflowError> {
        Ok(match step {
            BasicStep::Decide if state.last_message().is_some_and(Message::has_tool_calls) => {
                Transition::Goto(BasicStep::Retrieve)
            }
            BasicStep::Decide => Transition::End,
            BasicStep::Retrieve => Transition::Goto(BasicStep::Generate),
            BasicStep::Generate => Transition::End,
        })
    }
}
