//! Chat-completion domain types

mod message;
mod provider;
mod request;
mod response;

pub use message::{ContentPart, Message, MessageRole, ToolCall};
pub use provider::LlmProvider;
pub use request::{
    LlmJsonSchema, LlmRequest, LlmRequestBuilder, LlmResponseFormat, ToolChoice, ToolDefinition,
};
pub use response::{ContentFragment, FinishReason, GeneratedContent, LlmResponse, Usage};

#[cfg(test)]
pub use provider::mock;
