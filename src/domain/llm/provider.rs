use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Trait for chat-completion providers
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::llm::Message;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    type Handler = Arc<dyn Fn(&LlmRequest) -> Result<LlmResponse, DomainError> + Send + Sync>;

    /// Scriptable provider. A handler takes precedence over queued responses,
    /// queued responses over the fixed response.
    pub struct MockLlmProvider {
        name: &'static str,
        response: Option<LlmResponse>,
        queue: Mutex<VecDeque<LlmResponse>>,
        handler: Option<Handler>,
        error: Option<String>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl Debug for MockLlmProvider {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MockLlmProvider")
                .field("name", &self.name)
                .finish_non_exhaustive()
        }
    }

    impl MockLlmProvider {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                response: None,
                queue: Mutex::new(VecDeque::new()),
                handler: None,
                error: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_response(mut self, response: LlmResponse) -> Self {
            self.response = Some(response);
            self
        }

        pub fn with_text(self, text: impl Into<String>) -> Self {
            self.with_response(text_response(text))
        }

        pub fn with_queue(self, responses: Vec<LlmResponse>) -> Self {
            *self.queue.lock().unwrap() = responses.into();
            self
        }

        pub fn with_handler<F>(mut self, handler: F) -> Self
        where
            F: Fn(&LlmRequest) -> Result<LlmResponse, DomainError> + Send + Sync + 'static,
        {
            self.handler = Some(Arc::new(handler));
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<LlmRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    /// Plain assistant text response
    pub fn text_response(text: impl Into<String>) -> LlmResponse {
        LlmResponse::new(
            "mock-id".to_string(),
            "mock-model".to_string(),
            Message::assistant(text),
        )
    }

    /// Assistant response carrying a single tool call
    pub fn tool_call_response(name: &str, arguments: serde_json::Value) -> LlmResponse {
        LlmResponse::new(
            "mock-id".to_string(),
            "mock-model".to_string(),
            Message::assistant_with_tool_calls(
                "",
                vec![super::super::ToolCall::new(
                    format!("call-{}", name),
                    name,
                    arguments.to_string(),
                )],
            ),
        )
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn chat(
            &self,
            _model: &str,
            request: LlmRequest,
        ) -> Result<LlmResponse, DomainError> {
            self.requests.lock().unwrap().push(request.clone());

            if let Some(ref error) = self.error {
                return Err(DomainError::provider(self.name, error));
            }

            if let Some(ref handler) = self.handler {
                return handler(&request);
            }

            if let Some(response) = self.queue.lock().unwrap().pop_front() {
                return Ok(response);
            }

            self.response
                .clone()
                .ok_or_else(|| DomainError::provider(self.name, "No mock response configured"))
        }

        fn provider_name(&self) -> &'static str {
            self.name
        }
    }
}
