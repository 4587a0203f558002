//! Collaborator calls shared by the RAG workflow steps

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use super::prompts::{RAG_PROMPT, REWRITE_SYSTEM_PROMPT, REWRITE_USER_PROMPT};
use crate::domain::grading::Grader;
use crate::domain::llm::{
    GeneratedContent, LlmProvider, LlmRequest, LlmResponse, Message, ToolChoice, ToolDefinition,
};
use crate::domain::prompt::PromptTemplate;
use crate::domain::retrieval::{
    DEFAULT_TOP_K, Passage, RetrievalClient, SearchParams, render_passages,
};
use crate::domain::workflow::{StateUpdate, WorkflowError, WorkflowState};
use crate::infrastructure::observability::record_llm_request;

/// Generation, retrieval and grading clients for one workflow
#[derive(Debug, Clone)]
pub struct RagCollaborators {
    pub llm: Arc<dyn LlmProvider>,
    pub model: String,
    pub temperature: f32,
    pub retrieval: Arc<dyn RetrievalClient>,
    pub grader: Arc<dyn Grader>,
    pub top_k: usize,
}

impl RagCollaborators {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        retrieval: Arc<dyn RetrievalClient>,
        grader: Arc<dyn Grader>,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature: 0.0,
            retrieval,
            grader,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, WorkflowError> {
        let started = Instant::now();
        let result = self.llm.chat(&self.model, request).await;
        record_llm_request(
            self.llm.provider_name(),
            &self.model,
            started.elapsed(),
            result.is_ok(),
        );
        Ok(result?)
    }

    /// Search the state's knowledge scope, restricted to its document sets
    pub async fn search(
        &self,
        state: &WorkflowState,
        query: &str,
    ) -> Result<Vec<Passage>, WorkflowError> {
        let params = SearchParams::new(&state.knowledge_scope, query)
            .with_top_k(self.top_k)
            .with_filter(state.document_filter());

        let passages = self.retrieval.search(params).await?;
        debug!(
            scope = %state.knowledge_scope,
            query = %query,
            results = passages.len(),
            "Retrieved passages"
        );
        Ok(passages)
    }

    /// Let the model either call `tool` or answer from the transcript
    pub async fn decide(
        &self,
        state: &WorkflowState,
        tool: ToolDefinition,
    ) -> Result<StateUpdate, WorkflowError> {
        let request = LlmRequest::builder()
            .messages(state.messages.iter().cloned())
            .tool(tool)
            .tool_choice(ToolChoice::Auto)
            .temperature(self.temperature)
            .build();

        let response = self.chat(request).await?;

        if response.tool_calls().is_empty() {
            let generation = response.generated_content();
            return Ok(StateUpdate::new()
                .with_messages(state.messages_with(response.message))
                .with_generation(generation));
        }

        debug!(calls = response.tool_calls().len(), "Model requested retrieval");
        Ok(StateUpdate::new().with_messages(state.messages_with(response.message)))
    }

    /// Answer the tool calls of the last assistant message with retrieval
    /// results. Every call must name `tool_name` and carry a `query`.
    pub async fn answer_tool_calls(
        &self,
        step: &str,
        state: &WorkflowState,
        tool_name: &str,
    ) -> Result<StateUpdate, WorkflowError> {
        let calls = state
            .last_message()
            .map(|m| m.tool_calls.clone())
            .unwrap_or_default();

        if calls.is_empty() {
            return Err(WorkflowError::malformed(step, "no tool call to answer"));
        }

        let mut messages = state.messages.clone();
        let mut results = Vec::new();

        for call in calls {
            if call.name != tool_name {
                return Err(WorkflowError::malformed(
                    step,
                    format!("unknown tool '{}'", call.name),
                ));
            }
            let query = call.string_argument("query").ok_or_else(|| {
                WorkflowError::malformed(step, format!("tool call {} has no query argument", call.id))
            })?;

            let passages = self.search(state, &query).await?;
            messages.push(Message::tool_result(&call.id, render_passages(&passages)));
            results.extend(passages);
        }

        Ok(StateUpdate::new()
            .with_messages(messages)
            .with_last_tool_results(results))
    }

    /// Keep only the passages graded relevant to `question`
    pub async fn grade_documents(
        &self,
        step: &str,
        question: &str,
        documents: &[Passage],
    ) -> Result<Vec<Passage>, WorkflowError> {
        let mut relevant = Vec::with_capacity(documents.len());

        for passage in documents {
            let grade = self
                .grader
                .grade_document(question, &passage.content)
                .await
                .map_err(|e| WorkflowError::from_grading(step, e))?;

            debug!(source = ?passage.source(), grade = %grade, "Graded passage");
            if grade.is_yes() {
                relevant.push(passage.clone());
            }
        }

        Ok(relevant)
    }

    /// Rewrite a question for better retrieval
    pub async fn rewrite_question(
        &self,
        step: &str,
        question: &str,
    ) -> Result<String, WorkflowError> {
        let request = LlmRequest::builder()
            .system(REWRITE_SYSTEM_PROMPT)
            .user(render(&REWRITE_USER_PROMPT, &[("question", question)])?)
            .temperature(self.temperature)
            .build();

        let rewritten = self.chat(request).await?.generated_content().to_text();
        let rewritten = rewritten.trim();

        if rewritten.is_empty() {
            return Err(WorkflowError::malformed(step, "rewritten question is empty"));
        }

        debug!(original = %question, rewritten = %rewritten, "Rewrote question");
        Ok(rewritten.to_string())
    }

    /// Answer `question` from `context` with the retrieval QA prompt
    pub async fn generate_answer(
        &self,
        question: &str,
        context: &str,
    ) -> Result<GeneratedContent, WorkflowError> {
        let prompt = render(&RAG_PROMPT, &[("question", question), ("context", context)])?;
        let request = LlmRequest::builder()
            .user(prompt)
            .temperature(self.temperature)
            .build();

        Ok(self.chat(request).await?.generated_content())
    }
}

pub(crate) fn render(
    template: &PromptTemplate,
    values: &[(&str, &str)],
) -> Result<String, WorkflowError> {
    let values: HashMap<&str, &str> = values.iter().copied().collect();
    template
        .render(&values)
        .map_err(|e| WorkflowError::configuration(e.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the workflow tests

    use super::*;
    use crate::domain::grading::mock::MockGrader;
    use crate::domain::llm::mock::{MockLlmProvider, text_response, tool_call_response};
    use crate::domain::retrieval::mock::MockRetrievalClient;
    use crate::domain::workflow::WorkflowInput;
    use serde_json::json;

    pub const ANSWER: &str = "Kenya lost about 5% of its forest cover.";
    pub const REWRITTEN: &str = "What was Kenya's forest loss between 2000 and 2020?";

    pub fn passage(text: &str) -> Passage {
        Passage::new(text, 0.8)
            .with_document_set("set-1")
            .with_source(format!("{}.pdf", text.split_whitespace().next().unwrap_or("doc")))
    }

    pub fn state(question: &str) -> WorkflowState {
        WorkflowState::from_input(
            WorkflowInput::new("tenant-a", question).with_document_sets(vec!["set-1".into()]),
        )
        .unwrap()
    }

    /// Routes requests by shape: tool-bearing requests get a tool call for
    /// the declared tool (or `direct` when given), rewrite requests get
    /// [`REWRITTEN`], everything else gets [`ANSWER`].
    pub fn routing_llm(direct: Option<&'static str>) -> MockLlmProvider {
        MockLlmProvider::new("mock").with_handler(move |request| {
            if let Some(tool) = request.tools.first() {
                return Ok(match direct {
                    Some(text) => text_response(text),
                    None => tool_call_response(&tool.name, json!({"query": "kenya forest"})),
                });
            }
            if request.system_text() == Some(REWRITE_SYSTEM_PROMPT) {
                return Ok(text_response(REWRITTEN));
            }
            Ok(text_response(ANSWER))
        })
    }

    pub struct Fixture {
        pub llm: Arc<MockLlmProvider>,
        pub retrieval: Arc<MockRetrievalClient>,
        pub grader: Arc<MockGrader>,
    }

    impl Fixture {
        pub fn new(llm: MockLlmProvider, retrieval: MockRetrievalClient, grader: MockGrader) -> Self {
            Self {
                llm: Arc::new(llm),
                retrieval: Arc::new(retrieval),
                grader: Arc::new(grader),
            }
        }

        pub fn collaborators(&self) -> RagCollaborators {
            RagCollaborators::new(
                self.llm.clone(),
                "mock-model",
                self.retrieval.clone(),
                self.grader.clone(),
            )
        }

        /// Requests whose system prompt is the rewrite prompt
        pub fn rewrite_calls(&self) -> usize {
            self.llm
                .requests()
                .iter()
                .filter(|r| r.system_text() == Some(REWRITE_SYSTEM_PROMPT))
                .count()
        }
    }
}
