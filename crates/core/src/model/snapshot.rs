use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Question, QuestionId, UserAnswer};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("snapshot is not marked as started")]
    NotStarted,

    #[error("snapshot index {index} is out of range for {count} questions")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("snapshot answers unknown question {0}")]
    UnknownQuestion(QuestionId),

    #[error("snapshot holds more than one answer for question {0}")]
    DuplicateAnswer(QuestionId),
}

/// Minimal state needed to resume an in-progress session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub answers: Vec<UserAnswer>,
    pub current_index: usize,
    pub started: bool,
    /// When the timer of the question at `current_index` started.
    pub question_started_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Check that the snapshot can be resumed against `questions`.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the session was not marked active, the
    /// index does not point into `questions`, or the answers do not line up
    /// with the question set.
    pub fn validate(&self, questions: &[Question]) -> Result<(), SnapshotError> {
        if !self.started {
            return Err(SnapshotError::NotStarted);
        }
        if self.current_index >= questions.len() {
            return Err(SnapshotError::IndexOutOfRange {
                index: self.current_index,
                count: questions.len(),
            });
        }

        let known: HashSet<QuestionId> = questions.iter().map(Question::id).collect();
        let mut seen = HashSet::with_capacity(self.answers.len());
        for answer in &self.answers {
            if !known.contains(&answer.question_id) {
                return Err(SnapshotError::UnknownQuestion(answer.question_id));
            }
            if !seen.insert(answer.question_id) {
                return Err(SnapshotError::DuplicateAnswer(answer.question_id));
            }
        }
        Ok(())
    }
}
