//! Prompt templates
//!
//! Variables use the syntax `${var:name}` or `${var:name:default}`.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

static VARIABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{var:([a-zA-Z0-9][-_a-zA-Z0-9]*)(?::([^}]*))?\}")
        .unwrap_or_else(|e| panic!("invalid variable pattern: {e}"))
});

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing required variable: {name}")]
    MissingVariable { name: String },
}

/// A parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    content: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut seen = HashSet::new();
        let variables = VARIABLE_PATTERN
            .captures_iter(&content)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .filter(|name| seen.insert(name.clone()))
            .collect();

        Self { content, variables }
    }

    /// Distinct variable names in order of first appearance
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Substitute every variable, falling back to inline defaults
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<String, TemplateError> {
        let mut missing = None;

        let rendered = VARIABLE_PATTERN.replace_all(&self.content, |cap: &Captures<'_>| {
            let name = &cap[1];
            match values.get(name).copied().or(cap.get(2).map(|m| m.as_str())) {
                Some(value) => value.to_string(),
                None => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(TemplateError::MissingVariable { name }),
            None => Ok(rendered.into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variables() {
        let template = PromptTemplate::new(
            "Question: ${var:question}\nContext: ${var:context}\nAgain: ${var:question}",
        );
        assert_eq!(template.variables(), &["question", "context"]);
    }

    #[test]
    fn test_render() {
        let template = PromptTemplate::new("Q: ${var:question} (${var:tone:brief})");
        let values = HashMap::from([("question", "why?")]);
        assert_eq!(template.render(&values).unwrap(), "Q: why? (brief)");
    }

    #[test]
    fn test_render_missing_variable() {
        let template = PromptTemplate::new("Context: ${var:context}");
        let err = template.render(&HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingVariable {
                name: "context".to_string()
            }
        );
    }

    #[test]
    fn test_values_are_not_reinterpreted() {
        let template = PromptTemplate::new("${var:a}");
        let values = HashMap::from([("a", "${var:b}")]);
        assert_eq!(template.render(&values).unwrap(), "${var:b}");
    }
}
