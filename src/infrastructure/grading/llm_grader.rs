//! LLM-backed binary grader
//!
//! Document, groundedness and usefulness grades are requested with a JSON
//! schema response format. Relevance is forced through a single tool call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::domain::DomainError;
use crate::domain::grading::{BinaryScore, GradeResponse, Grader, GradingError};
use crate::domain::llm::{
    LlmProvider, LlmRequest, LlmResponse, LlmResponseFormat, ToolChoice, ToolDefinition,
};
use crate::domain::prompt::PromptTemplate;
use crate::infrastructure::observability::record_llm_request;

pub const GRADE_DOCUMENTS_SCHEMA: &str = "grade_documents";
pub const GRADE_GROUNDEDNESS_SCHEMA: &str = "grade_groundedness";
pub const GRADE_USEFULNESS_SCHEMA: &str = "grade_usefulness";
pub const GRADE_RELEVANCE_TOOL: &str = "grade";

const DOCUMENT_GRADER_PROMPT: &str = "You are a grader assessing relevance of a retrieved \
document to a user question. If the document contains keywords or semantic meaning related to \
the question, grade it as relevant. This is not a stringent test; the goal is to filter out \
erroneous retrievals. Give a binary score 'yes' or 'no' to indicate whether the document is \
relevant to the question.";

const GROUNDEDNESS_GRADER_PROMPT: &str = "You are a grader assessing whether an LLM generation \
is grounded in and supported by a set of retrieved facts. Give a binary score 'yes' or 'no'. \
'yes' means the answer is grounded in and supported by the set of facts.";

const USEFULNESS_GRADER_PROMPT: &str = "You are a grader assessing whether an answer addresses \
and resolves a question. Give a binary score 'yes' or 'no'. 'yes' means the answer resolves the \
question.";

static RELEVANCE_GRADER_PROMPT: Lazy<PromptTemplate> = Lazy::new(|| {
    PromptTemplate::new(
        "You are a grader assessing relevance of a retrieved document to a user question.\n\
         Here is the retrieved document:\n\n${var:context}\n\nHere is the user question: \
         ${var:question}\nIf the document contains keywords or semantic meaning related to the \
         user question, grade it as relevant. Give a binary score 'yes' or 'no' to indicate \
         whether the document is relevant to the question.",
    )
});

#[derive(Debug)]
pub struct LlmGrader {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl LlmGrader {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, GradingError> {
        let started = Instant::now();
        let result = self.provider.chat(&self.model, request).await;
        record_llm_request(
            self.provider.provider_name(),
            &self.model,
            started.elapsed(),
            result.is_ok(),
        );
        Ok(result?)
    }

    async fn structured_grade(
        &self,
        schema_name: &str,
        description: &str,
        system: &str,
        user: String,
    ) -> Result<BinaryScore, GradingError> {
        let request = LlmRequest::builder()
            .system(system)
            .user(user)
            .temperature(0.0)
            .response_format(LlmResponseFormat::json_schema(
                schema_name,
                GradeResponse::schema(description),
            ))
            .build();

        let response = self.chat(request).await?;
        let content = response.generated_content().to_text();
        let score = parse_grade(&content)?;

        debug!(schema = schema_name, score = %score, "Received grade");
        Ok(score)
    }
}

/// Parse a `{"binaryScore": ...}` payload, tolerating text around the object
fn parse_grade(text: &str) -> Result<BinaryScore, GradingError> {
    let json = extract_json(text).unwrap_or(text);

    serde_json::from_str::<GradeResponse>(json)
        .map(|grade| grade.binary_score)
        .map_err(|e| {
            warn!("Failed to parse grade: {} - Response: {}", e, text);
            GradingError::malformed(format!("expected binaryScore yes/no: {}", e))
        })
}

fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[async_trait]
impl Grader for LlmGrader {
    async fn grade_document(
        &self,
        question: &str,
        passage: &str,
    ) -> Result<BinaryScore, GradingError> {
        self.structured_grade(
            GRADE_DOCUMENTS_SCHEMA,
            "Documents are relevant to the question, 'yes' or 'no'",
            DOCUMENT_GRADER_PROMPT,
            format!("Retrieved document:\n\n{}\n\nUser question: {}", passage, question),
        )
        .await
    }

    async fn grade_groundedness(
        &self,
        documents: &str,
        generation: &str,
    ) -> Result<BinaryScore, GradingError> {
        self.structured_grade(
            GRADE_GROUNDEDNESS_SCHEMA,
            "Answer is grounded in the facts, 'yes' or 'no'",
            GROUNDEDNESS_GRADER_PROMPT,
            format!("Set of facts:\n\n{}\n\nLLM generation: {}", documents, generation),
        )
        .await
    }

    async fn grade_usefulness(
        &self,
        question: &str,
        generation: &str,
    ) -> Result<BinaryScore, GradingError> {
        self.structured_grade(
            GRADE_USEFULNESS_SCHEMA,
            "Answer addresses the question, 'yes' or 'no'",
            USEFULNESS_GRADER_PROMPT,
            format!("User question:\n\n{}\n\nLLM generation: {}", question, generation),
        )
        .await
    }

    async fn grade_relevance(
        &self,
        question: &str,
        context: &str,
    ) -> Result<BinaryScore, GradingError> {
        let values = HashMap::from([("context", context), ("question", question)]);
        let prompt = RELEVANCE_GRADER_PROMPT
            .render(&values)
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        let request = LlmRequest::builder()
            .user(prompt)
            .temperature(0.0)
            .tool(ToolDefinition::new(
                GRADE_RELEVANCE_TOOL,
                "Binary score for relevance check.",
                GradeResponse::schema("Relevance score 'yes' or 'no'"),
            ))
            .tool_choice(ToolChoice::Function(GRADE_RELEVANCE_TOOL.to_string()))
            .build();

        let response = self.chat(request).await?;
        let call = response
            .tool_calls()
            .iter()
            .find(|c| c.name == GRADE_RELEVANCE_TOOL)
            .ok_or_else(|| GradingError::malformed("relevance grade tool was not called"))?;

        let score = parse_grade(&call.arguments)?;
        debug!(score = %score, "Received relevance grade");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::mock::{MockLlmProvider, text_response, tool_call_response};
    use serde_json::json;

    fn grader(provider: MockLlmProvider) -> (LlmGrader, Arc<MockLlmProvider>) {
        let provider = Arc::new(provider);
        (LlmGrader::new(provider.clone(), "gpt-4o"), provider)
    }

    #[test]
    fn test_parse_grade() {
        assert_eq!(parse_grade(r#"{"binaryScore": "yes"}"#).unwrap(), BinaryScore::Yes);
        assert_eq!(
            parse_grade("Here you go: {\"binaryScore\": \"no\"} done").unwrap(),
            BinaryScore::No
        );
        assert!(matches!(parse_grade("yes"), Err(GradingError::Malformed(_))));
        assert!(matches!(
            parse_grade(r#"{"binaryScore": "perhaps"}"#),
            Err(GradingError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_grade_document_uses_schema() {
        let (grader, provider) =
            grader(MockLlmProvider::new("mock").with_text(r#"{"binaryScore": "yes"}"#));

        let score = grader
            .grade_document("What is the deforestation rate?", "Kenya lost 5% of forest")
            .await
            .unwrap();

        assert_eq!(score, BinaryScore::Yes);
        let request = &provider.requests()[0];
        assert_eq!(
            request.response_format.as_ref().and_then(|f| f.schema_name()),
            Some(GRADE_DOCUMENTS_SCHEMA)
        );
        assert_eq!(request.system_text(), Some(DOCUMENT_GRADER_PROMPT));
    }

    #[tokio::test]
    async fn test_grade_groundedness_and_usefulness() {
        let (grader, provider) = grader(MockLlmProvider::new("mock").with_queue(vec![
            text_response(r#"{"binaryScore": "no"}"#),
            text_response(r#"{"binaryScore": "yes"}"#),
        ]));

        assert_eq!(
            grader.grade_groundedness("facts", "answer").await.unwrap(),
            BinaryScore::No
        );
        assert_eq!(
            grader.grade_usefulness("question", "answer").await.unwrap(),
            BinaryScore::Yes
        );

        let schemas: Vec<_> = provider
            .requests()
            .iter()
            .filter_map(|r| r.response_format.as_ref().and_then(|f| f.schema_name()).map(str::to_string))
            .collect();
        assert_eq!(schemas, vec![GRADE_GROUNDEDNESS_SCHEMA, GRADE_USEFULNESS_SCHEMA]);
    }

    #[tokio::test]
    async fn test_grade_relevance_forces_tool() {
        let (grader, provider) = grader(
            MockLlmProvider::new("mock")
                .with_response(tool_call_response(GRADE_RELEVANCE_TOOL, json!({"binaryScore": "no"}))),
        );

        let score = grader.grade_relevance("question", "context").await.unwrap();
        assert_eq!(score, BinaryScore::No);

        let request = &provider.requests()[0];
        assert_eq!(
            request.tool_choice,
            Some(ToolChoice::Function(GRADE_RELEVANCE_TOOL.to_string()))
        );
        assert!(request.messages[0].content_text().unwrap().contains("context"));
    }

    #[tokio::test]
    async fn test_grade_relevance_keeps_placeholders_in_context() {
        let (grader, provider) = grader(
            MockLlmProvider::new("mock")
                .with_response(tool_call_response(GRADE_RELEVANCE_TOOL, json!({"binaryScore": "yes"}))),
        );

        grader
            .grade_relevance("deforestation rate?", "literal ${var:question} and ${question}")
            .await
            .unwrap();

        let prompt = provider.requests()[0].messages[0].full_text();
        assert!(prompt.contains("literal ${var:question} and ${question}"));
        assert!(prompt.contains("Here is the user question: deforestation rate?"));
        assert_eq!(prompt.matches("deforestation rate?").count(), 1);
    }

    #[tokio::test]
    async fn test_grade_relevance_without_tool_call_is_malformed() {
        let (grader, _) = grader(MockLlmProvider::new("mock").with_text("yes"));
        let result = grader.grade_relevance("question", "context").await;
        assert!(matches!(result, Err(GradingError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_provider_error_passes_through() {
        let (grader, _) = grader(MockLlmProvider::new("mock").with_error("rate limited"));
        let result = grader.grade_document("q", "p").await;
        assert!(matches!(
            result,
            Err(GradingError::Collaborator(DomainError::Provider { .. }))
        ));
    }
}
