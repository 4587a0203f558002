//! Prompts and tool declarations shared by the RAG workflows

use once_cell::sync::Lazy;
use serde_json::json;

use crate::domain::llm::ToolDefinition;
use crate::domain::prompt::PromptTemplate;

pub const RETRIEVE_TOOL: &str = "retrieve";
pub const RETRIEVE_DOCUMENTS_TOOL: &str = "retrieve_documents";

/// Answer policy for the tool-calling workflow; `${var:context}` is the
/// serialized tool output
pub static TOOL_ANSWER_PROMPT: Lazy<PromptTemplate> = Lazy::new(|| {
    PromptTemplate::new(
        "You are an assistant for question-answering tasks. Use the following pieces of \
         retrieved context to answer the question. If you don't know the answer, say that you \
         don't know. Use three sentences maximum and keep the answer concise.\n\n${var:context}",
    )
});

/// Retrieval QA prompt used by the graded workflows
pub static RAG_PROMPT: Lazy<PromptTemplate> = Lazy::new(|| {
    PromptTemplate::new(
        "You are an assistant for question-answering tasks. Use the following pieces of \
         retrieved context to answer the question. If you don't know the answer, just say that \
         you don't know. Use three sentences maximum and keep the answer concise.\n\
         Question: ${var:question}\nContext: ${var:context}\nAnswer:",
    )
});

pub const REWRITE_SYSTEM_PROMPT: &str = "You are a question re-writer that converts an input \
question to a better version that is optimized for vector store retrieval. Look at the input and \
reason about the underlying semantic intent. Reply with the improved question only.";

pub static REWRITE_USER_PROMPT: Lazy<PromptTemplate> = Lazy::new(|| {
    PromptTemplate::new(
        "Here is the initial question:\n\n${var:question}\n\nFormulate an improved question.",
    )
});

fn query_parameters() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Search query for the knowledge base"
            }
        },
        "required": ["query"]
    })
}

pub fn retrieve_tool() -> ToolDefinition {
    ToolDefinition::new(
        RETRIEVE_TOOL,
        "Retrieve information related to a query.",
        query_parameters(),
    )
}

pub fn retrieve_documents_tool() -> ToolDefinition {
    ToolDefinition::new(
        RETRIEVE_DOCUMENTS_TOOL,
        "Search and return information from the knowledge base.",
        query_parameters(),
    )
}
