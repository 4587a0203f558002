use serde::{Deserialize, Serialize};

use super::{ContentPart, Message, ToolCall};

/// Reason why the generation finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// One text fragment of generated content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFragment {
    pub text: String,
}

/// Generated content as delivered by a provider: a plain string or a list of
/// text fragments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedContent {
    Text(String),
    Fragments(Vec<ContentFragment>),
}

impl GeneratedContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Flatten into one string, fragments joined with newlines
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Fragments(fragments) => fragments
                .iter()
                .map(|f| f.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Response from an LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub id: String,
    pub model: String,
    pub message: Message,
    pub finish_reason: Option<FinishReason>,
    pub usage: Option<Usage>,
}

impl LlmResponse {
    pub fn new(id: String, model: String, message: Message) -> Self {
        Self {
            id,
            model,
            message,
            finish_reason: None,
            usage: None,
        }
    }

    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn content(&self) -> Option<&str> {
        self.message.content_text()
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.message.tool_calls
    }

    /// Normalize the message content into a [`GeneratedContent`]
    pub fn generated_content(&self) -> GeneratedContent {
        match self.message.content_parts() {
            Some(parts) => GeneratedContent::Fragments(
                parts
                    .iter()
                    .map(|p| match p {
                        ContentPart::Text { text } => ContentFragment { text: text.clone() },
                    })
                    .collect(),
            ),
            None => GeneratedContent::Text(self.content().unwrap_or_default().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_calculation() {
        let usage = Usage::new(10, 20);
        assert_eq!(usage.total_tokens, 30);
    }

    #[test]
    fn test_response_content() {
        let response = LlmResponse::new(
            "id-123".to_string(),
            "gpt-4o".to_string(),
            Message::assistant("Hello!"),
        );

        assert_eq!(response.content(), Some("Hello!"));
        assert_eq!(response.generated_content(), GeneratedContent::text("Hello!"));
        assert!(response.tool_calls().is_empty());
    }

    #[test]
    fn test_generated_content_from_parts() {
        let response = LlmResponse::new(
            "id-1".to_string(),
            "gpt-4o".to_string(),
            Message::assistant_with_parts(vec![
                ContentPart::Text { text: "Yes.".into() },
                ContentPart::Text { text: "It does.".into() },
            ]),
        );

        let content = response.generated_content();
        assert!(matches!(content, GeneratedContent::Fragments(ref f) if f.len() == 2));
        assert_eq!(content.to_text(), "Yes.\nIt does.");
    }
}
