//! Workflow state and partial-update merging

use serde::{Deserialize, Serialize};

use super::WorkflowError;
use crate::domain::grading::BinaryScore;
use crate::domain::llm::{GeneratedContent, Message};
use crate::domain::retrieval::{DocumentSetFilter, Passage};

/// Role of a prior conversation turn supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
    System,
}

/// Prior conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    fn into_message(self) -> Message {
        match self.role {
            TurnRole::User => Message::user(self.content),
            TurnRole::Assistant => Message::assistant(self.content),
            TurnRole::System => Message::system(self.content),
        }
    }
}

/// Caller input for one orchestration run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInput {
    pub knowledge_scope: String,
    /// Empty means no restriction
    #[serde(default)]
    pub allowed_document_set_ids: Vec<String>,
    #[serde(default)]
    pub prior_turns: Vec<Turn>,
    pub question: String,
}

impl WorkflowInput {
    pub fn new(knowledge_scope: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            knowledge_scope: knowledge_scope.into(),
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_document_sets(mut self, ids: Vec<String>) -> Self {
        self.allowed_document_set_ids = ids;
        self
    }

    pub fn with_prior_turns(mut self, turns: Vec<Turn>) -> Self {
        self.prior_turns = turns;
        self
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.question.trim().is_empty() {
            return Err(WorkflowError::invalid_input("question must not be empty"));
        }
        if self.knowledge_scope.trim().is_empty() {
            return Err(WorkflowError::invalid_input("knowledge scope must not be empty"));
        }
        Ok(())
    }
}

/// Running state of one workflow execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowState {
    pub knowledge_scope: String,
    pub document_set_ids: Vec<String>,
    /// Transcript; steps only ever extend it
    pub messages: Vec<Message>,
    /// Working question, possibly rewritten
    pub question: String,
    /// Question as the caller asked it
    pub original_question: String,
    pub documents: Vec<Passage>,
    /// Passages returned by the most recent retrieval tool call
    pub last_tool_results: Vec<Passage>,
    pub generation: Option<GeneratedContent>,
    pub groundedness_grade: Option<BinaryScore>,
    pub usefulness_grade: Option<BinaryScore>,
    pub relevance_grade: Option<BinaryScore>,
}

impl WorkflowState {
    /// Build the initial state. The transcript is the prior turns followed by
    /// the question as a user message.
    pub fn from_input(input: WorkflowInput) -> Result<Self, WorkflowError> {
        input.validate()?;

        let question = input.question.trim().to_string();
        let mut messages: Vec<Message> =
            input.prior_turns.into_iter().map(Turn::into_message).collect();
        messages.push(Message::user(question.clone()));

        Ok(Self {
            knowledge_scope: input.knowledge_scope,
            document_set_ids: input.allowed_document_set_ids,
            messages,
            original_question: question.clone(),
            question,
            documents: Vec::new(),
            last_tool_results: Vec::new(),
            generation: None,
            groundedness_grade: None,
            usefulness_grade: None,
            relevance_grade: None,
        })
    }

    pub fn document_filter(&self) -> Option<DocumentSetFilter> {
        DocumentSetFilter::from_ids(&self.document_set_ids)
    }

    /// Transcript with `message` appended, for use in an update
    pub fn messages_with(&self, message: Message) -> Vec<Message> {
        let mut messages = self.messages.clone();
        messages.push(message);
        messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Overlay a partial update. Fields the update leaves unset are untouched.
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            messages,
            question,
            documents,
            last_tool_results,
            generation,
            groundedness_grade,
            usefulness_grade,
            relevance_grade,
        } = update;

        overlay(&mut self.messages, messages);
        overlay(&mut self.question, question);
        overlay(&mut self.documents, documents);
        overlay(&mut self.last_tool_results, last_tool_results);
        if generation.is_some() {
            self.generation = generation;
        }
        if groundedness_grade.is_some() {
            self.groundedness_grade = groundedness_grade;
        }
        if usefulness_grade.is_some() {
            self.usefulness_grade = usefulness_grade;
        }
        if relevance_grade.is_some() {
            self.relevance_grade = relevance_grade;
        }
    }
}

fn overlay<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Partial state produced by a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub messages: Option<Vec<Message>>,
    pub question: Option<String>,
    pub documents: Option<Vec<Passage>>,
    pub last_tool_results: Option<Vec<Passage>>,
    pub generation: Option<GeneratedContent>,
    pub groundedness_grade: Option<BinaryScore>,
    pub usefulness_grade: Option<BinaryScore>,
    pub relevance_grade: Option<BinaryScore>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_documents(mut self, documents: Vec<Passage>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn with_last_tool_results(mut self, passages: Vec<Passage>) -> Self {
        self.last_tool_results = Some(passages);
        self
    }

    pub fn with_generation(mut self, generation: GeneratedContent) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn with_groundedness(mut self, grade: BinaryScore) -> Self {
        self.groundedness_grade = Some(grade);
        self
    }

    pub fn with_usefulness(mut self, grade: BinaryScore) -> Self {
        self.usefulness_grade = Some(grade);
        self
    }

    pub fn with_relevance(mut self, grade: BinaryScore) -> Self {
        self.relevance_grade = Some(grade);
        self
    }

    /// Names of the fields this update sets
    pub fn updated_fields(&self) -> Vec<&'static str> {
        [
            ("messages", self.messages.is_some()),
            ("question", self.question.is_some()),
            ("documents", self.documents.is_some()),
            ("last_tool_results", self.last_tool_results.is_some()),
            ("generation", self.generation.is_some()),
            ("groundedness_grade", self.groundedness_grade.is_some()),
            ("usefulness_grade", self.usefulness_grade.is_some()),
            ("relevance_grade", self.relevance_grade.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}
