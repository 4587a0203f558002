//! Grader implementations

mod llm_grader;

pub use llm_grader::{
    GRADE_DOCUMENTS_SCHEMA, GRADE_GROUNDEDNESS_SCHEMA, GRADE_RELEVANCE_TOOL,
    GRADE_USEFULNESS_SCHEMA, LlmGrader,
};
