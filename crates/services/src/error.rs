//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{OptionId, QuestionId};

/// Errors emitted by session services.
///
/// These describe calls the host should not have made; state is left
/// untouched whenever one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no active session")]
    NotActive,
    #[error("question {got} is not the current question ({expected})")]
    NotCurrentQuestion { expected: QuestionId, got: QuestionId },
    #[error("option {option} does not belong to question {question}")]
    UnknownOption { question: QuestionId, option: OptionId },
}
