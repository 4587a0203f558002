use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Binary decision label produced by a grading call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryScore {
    Yes,
    No,
}

impl BinaryScore {
    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl From<bool> for BinaryScore {
    fn from(value: bool) -> Self {
        if value { Self::Yes } else { Self::No }
    }
}

impl std::fmt::Display for BinaryScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured grading payload `{ "binaryScore": "yes" | "no" }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResponse {
    #[serde(rename = "binaryScore", alias = "binary_score")]
    pub binary_score: BinaryScore,
}

impl GradeResponse {
    /// JSON schema constraining model output to a grade
    pub fn schema(description: &str) -> Value {
        json!({
            "type": "object",
            "properties": {
                "binaryScore": {
                    "type": "string",
                    "enum": ["yes", "no"],
                    "description": description
                }
            },
            "required": ["binaryScore"],
            "additionalProperties": false
        })
    }
}
