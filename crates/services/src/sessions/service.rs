use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{
    OptionId, Question, QuestionId, SessionSettings, SessionSnapshot, SnapshotError, TestResult,
    UserAnswer, upsert_answer,
};
use quiz_core::scoring;
use quiz_core::time::elapsed_secs;

use super::progress::{SessionProgress, progress_percentage};
use super::view::SessionView;
use crate::error::SessionError;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What `advance` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at `index`.
    Moved { index: usize },
    /// The last question was passed and the result was computed.
    Finished,
}

/// What a timer tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No running session.
    Idle,
    Running { remaining_secs: u32 },
    /// The current question ran out of time and the session moved on.
    TimedOut(Advance),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session.
///
/// Steps through a fixed question list, timing each question from the moment
/// it became current. Time is always passed in by the caller so the session
/// never reads a clock on its own.
pub struct TestSession {
    questions: Vec<Question>,
    default_time_limit_secs: u32,
    current: usize,
    answers: Vec<UserAnswer>,
    question_started_at: DateTime<Utc>,
    remaining_secs: u32,
    result: Option<TestResult>,
}

impl TestSession {
    /// Start a fresh session at the first question.
    #[must_use]
    pub fn new(questions: Vec<Question>, settings: &SessionSettings, now: DateTime<Utc>) -> Self {
        let mut session = Self {
            questions,
            default_time_limit_secs: settings.default_time_limit_secs(),
            current: 0,
            answers: Vec::new(),
            question_started_at: now,
            remaining_secs: 0,
            result: None,
        };
        session.remaining_secs = session.current_allotment_secs();
        session
    }

    /// Rebuild a session from a persisted snapshot.
    ///
    /// The persisted timer anchor is kept, so time that passed while the
    /// session was not loaded still counts against the current question.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the snapshot does not fit `questions`.
    pub fn restore(
        questions: Vec<Question>,
        settings: &SessionSettings,
        snapshot: SessionSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Self, SnapshotError> {
        snapshot.validate(&questions)?;
        let mut session = Self {
            questions,
            default_time_limit_secs: settings.default_time_limit_secs(),
            current: snapshot.current_index,
            answers: snapshot.answers,
            question_started_at: snapshot.question_started_at,
            remaining_secs: 0,
            result: None,
        };
        session.refresh_remaining(now);
        Ok(session)
    }

    /// Persistable state of an unfinished session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            answers: self.answers.clone(),
            current_index: self.current,
            started: true,
            question_started_at: self.question_started_at,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn answers(&self) -> &[UserAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&UserAnswer> {
        self.answers
            .iter()
            .find(|answer| answer.question_id == question_id)
    }

    #[must_use]
    pub fn current_user_answer(&self) -> Option<&UserAnswer> {
        self.current_question()
            .and_then(|question| self.answer_for(question.id()))
    }

    /// Seconds left on the current question as of the last refresh.
    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn question_started_at(&self) -> DateTime<Utc> {
        self.question_started_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    /// Time budget of the current question.
    #[must_use]
    pub fn current_allotment_secs(&self) -> u32 {
        self.current_question()
            .map_or(self.default_time_limit_secs, |question| {
                question.allotment_secs(self.default_time_limit_secs)
            })
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.question_count(),
            answered: self.answers.len(),
            current_index: self.current,
            percentage: progress_percentage(self.current, self.question_count()),
            is_complete: self.is_finished(),
        }
    }

    /// Read model for the question on screen; `None` once finished.
    #[must_use]
    pub fn view(&self) -> Option<SessionView<'_>> {
        if self.is_finished() {
            return None;
        }
        let current_question = self.current_question()?;
        Some(SessionView {
            current_question,
            current_index: self.current,
            question_count: self.question_count(),
            remaining_time_secs: self.remaining_secs,
            progress_percentage: progress_percentage(self.current, self.question_count()),
            current_user_answer: self.answer_for(current_question.id()),
        })
    }

    /// Recompute the remaining time of the current question at `now`.
    pub fn refresh_remaining(&mut self, now: DateTime<Utc>) -> u32 {
        let elapsed = elapsed_secs(self.question_started_at, now);
        self.remaining_secs = self.current_allotment_secs().saturating_sub(elapsed);
        self.remaining_secs
    }

    /// Record `option` as the answer to the current question.
    ///
    /// `None` answers a question without picking an option (case studies).
    /// Time spent is the allotment minus the remaining time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` once finished,
    /// `SessionError::NotCurrentQuestion` for any other question, and
    /// `SessionError::UnknownOption` if the option is not offered.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        option: Option<OptionId>,
    ) -> Result<&UserAnswer, SessionError> {
        if self.is_finished() {
            return Err(SessionError::NotActive);
        }
        let Some(question) = self.questions.get(self.current) else {
            return Err(SessionError::NotActive);
        };
        if question.id() != question_id {
            return Err(SessionError::NotCurrentQuestion {
                expected: question.id(),
                got: question_id,
            });
        }
        if let Some(option) = option.as_ref() {
            if question.option(option).is_none() {
                return Err(SessionError::UnknownOption {
                    question: question_id,
                    option: option.clone(),
                });
            }
        }

        let time_spent = question
            .allotment_secs(self.default_time_limit_secs)
            .saturating_sub(self.remaining_secs);
        let is_correct = scoring::is_answer_correct(question, option.as_ref());

        Ok(upsert_answer(
            &mut self.answers,
            UserAnswer::new(question_id, option, is_correct, time_spent),
        ))
    }

    /// Move to the next question, or finish on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` if the session already finished.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        if self.is_finished() {
            return Err(SessionError::NotActive);
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.restart_timer(now);
            return Ok(Advance::Moved {
                index: self.current,
            });
        }

        self.result = Some(scoring::score(&self.questions, &self.answers));
        self.remaining_secs = 0;
        Ok(Advance::Finished)
    }

    /// Step back one question. Returns `false` at the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` if the session already finished.
    pub fn retreat(&mut self, now: DateTime<Utc>) -> Result<bool, SessionError> {
        if self.is_finished() {
            return Err(SessionError::NotActive);
        }
        if self.current == 0 {
            return Ok(false);
        }
        self.current -= 1;
        self.restart_timer(now);
        Ok(true)
    }

    /// Count the clock down; a question at zero advances as if skipped.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.is_finished() {
            return TickOutcome::Idle;
        }
        let remaining_secs = self.refresh_remaining(now);
        if remaining_secs > 0 {
            return TickOutcome::Running { remaining_secs };
        }
        match self.advance(now) {
            Ok(advance) => TickOutcome::TimedOut(advance),
            Err(_) => TickOutcome::Idle,
        }
    }

    fn restart_timer(&mut self, now: DateTime<Utc>) {
        self.question_started_at = now;
        self.remaining_secs = self.current_allotment_secs();
    }
}

impl fmt::Debug for TestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("question_started_at", &self.question_started_at)
            .field("remaining_secs", &self.remaining_secs)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
