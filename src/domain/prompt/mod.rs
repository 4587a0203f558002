//! Prompt templating

mod template;

pub use template::{PromptTemplate, TemplateError};
