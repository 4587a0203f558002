//! Binary grading of retrieval and generation quality

mod grader;
mod score;

pub use grader::{Grader, GradingError};
pub use score::{BinaryScore, GradeResponse};

#[cfg(test)]
pub use grader::mock;
