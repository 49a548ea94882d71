use std::sync::Arc;

use quiz_core::model::{
    OptionId, Question, QuestionId, SessionSettings, SessionSnapshot, TestResult, UserAnswer,
};
use quiz_core::{Clock, QuestionSource};
use storage::repository::SnapshotStore;
use storage::snapshot::SessionSnapshotRecord;

use super::progress::SessionProgress;
use super::service::{Advance, TestSession, TickOutcome};
use super::view::SessionView;
use crate::error::SessionError;

/// Session-level lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    Active,
    Finished,
}

/// Drives a `TestSession` and mirrors every change to a `SnapshotStore`.
///
/// Time comes from the injected `Clock`; the host calls `tick` once per
/// second while the session is active. Persistence is best-effort: store
/// failures are logged and never change the in-memory outcome.
pub struct TestSessionEngine {
    clock: Clock,
    settings: SessionSettings,
    source: Arc<dyn QuestionSource>,
    snapshots: Arc<dyn SnapshotStore>,
    session: Option<TestSession>,
    resume_available: bool,
}

impl TestSessionEngine {
    /// Create an engine and check whether a resumable snapshot exists.
    pub async fn open(
        clock: Clock,
        settings: SessionSettings,
        source: Arc<dyn QuestionSource>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        let mut engine = Self {
            clock,
            settings,
            source,
            snapshots,
            session: None,
            resume_available: false,
        };
        let questions = engine.source.generate_questions();
        engine.resume_available = engine.load_valid_snapshot(&questions).await.is_some();
        engine
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Mutable access to the clock, e.g. to advance a fixed clock in tests.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Whether a valid snapshot was found when the engine was opened.
    #[must_use]
    pub fn resume_available(&self) -> bool {
        self.resume_available
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match &self.session {
            None => SessionPhase::NotStarted,
            Some(session) if session.is_finished() => SessionPhase::Finished,
            Some(_) => SessionPhase::Active,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&TestSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn view(&self) -> Option<SessionView<'_>> {
        self.session.as_ref().and_then(TestSession::view)
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.session.as_ref().map(TestSession::progress)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.session.as_ref().and_then(TestSession::current_question)
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.session.as_ref().map_or(0, TestSession::remaining_secs)
    }

    #[must_use]
    pub fn result(&self) -> Option<&TestResult> {
        self.session.as_ref().and_then(TestSession::result)
    }

    /// Throw away any saved progress and start at the first question.
    pub async fn start_new_session(&mut self) -> &TestSession {
        let questions = self.source.generate_questions();
        self.clear_snapshot().await;

        let session = TestSession::new(questions, &self.settings, self.clock.now());
        log::info!(
            "started new session with {} questions",
            session.question_count()
        );
        self.persist_snapshot(&session.snapshot()).await;
        self.resume_available = false;
        self.session.insert(session)
    }

    /// Continue the saved session, or start fresh if there is none.
    ///
    /// Returns `true` if saved progress was restored.
    pub async fn resume_session(&mut self) -> bool {
        let questions = self.source.generate_questions();
        let Some(snapshot) = self.load_valid_snapshot(&questions).await else {
            log::info!("no resumable session, starting fresh");
            self.start_new_session().await;
            return false;
        };

        match TestSession::restore(questions, &self.settings, snapshot, self.clock.now()) {
            Ok(session) => {
                log::info!(
                    "resumed session at question {} of {}",
                    session.current_index() + 1,
                    session.question_count()
                );
                self.session = Some(session);
                self.resume_available = false;
                true
            }
            Err(err) => {
                log::warn!("discarding saved session: {err}");
                self.start_new_session().await;
                false
            }
        }
    }

    /// Answer the current question. Does not navigate.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if no session is active, the question is not
    /// the current one, or the option is not offered.
    pub async fn select_answer(
        &mut self,
        question_id: QuestionId,
        option: Option<OptionId>,
    ) -> Result<UserAnswer, SessionError> {
        let now = self.clock.now();
        let session = self.session.as_mut().ok_or(SessionError::NotActive)?;
        if !session.is_finished() {
            session.refresh_remaining(now);
        }
        let answer = session.select_answer(question_id, option)?.clone();
        let snapshot = session.snapshot();
        self.persist_snapshot(&snapshot).await;
        Ok(answer)
    }

    /// Move to the next question; on the last question, finish and score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` if no session is running.
    pub async fn advance(&mut self) -> Result<Advance, SessionError> {
        let now = self.clock.now();
        let session = self.session.as_mut().ok_or(SessionError::NotActive)?;
        let advance = session.advance(now)?;
        self.after_navigation(advance).await;
        Ok(advance)
    }

    /// Step back one question; `false` when already at the first one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` if no session is running.
    pub async fn retreat(&mut self) -> Result<bool, SessionError> {
        let now = self.clock.now();
        let session = self.session.as_mut().ok_or(SessionError::NotActive)?;
        let moved = session.retreat(now)?;
        if moved {
            let snapshot = session.snapshot();
            self.persist_snapshot(&snapshot).await;
        }
        Ok(moved)
    }

    /// One timer step. At zero remaining time this acts like `advance`.
    pub async fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };
        let outcome = session.tick(now);
        if let TickOutcome::TimedOut(advance) = outcome {
            log::debug!("question timed out: {advance:?}");
            self.after_navigation(advance).await;
        }
        outcome
    }

    /// Remove any saved progress without touching the in-memory session.
    pub async fn discard_snapshot(&mut self) {
        self.clear_snapshot().await;
        self.resume_available = false;
    }

    async fn after_navigation(&mut self, advance: Advance) {
        match advance {
            Advance::Moved { .. } => {
                if let Some(snapshot) = self.session.as_ref().map(TestSession::snapshot) {
                    self.persist_snapshot(&snapshot).await;
                }
            }
            Advance::Finished => {
                if let Some(result) = self.result() {
                    log::info!(
                        "session finished: {}/{} correct ({:.2}%)",
                        result.correct_answers(),
                        result.total_questions(),
                        result.score_percentage()
                    );
                }
                self.clear_snapshot().await;
            }
        }
    }

    async fn load_valid_snapshot(&self, questions: &[Question]) -> Option<SessionSnapshot> {
        let snapshot = match SessionSnapshotRecord::load(self.snapshots.as_ref()).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("ignoring unreadable session snapshot: {err}");
                return None;
            }
        };
        match snapshot.validate(questions) {
            Ok(()) => Some(snapshot),
            Err(err) => {
                log::warn!("ignoring invalid session snapshot: {err}");
                None
            }
        }
    }

    async fn persist_snapshot(&self, snapshot: &SessionSnapshot) {
        if let Err(err) = SessionSnapshotRecord::save(self.snapshots.as_ref(), snapshot).await {
            log::warn!("failed to persist session snapshot: {err}");
        }
    }

    async fn clear_snapshot(&self) {
        if let Err(err) = SessionSnapshotRecord::clear(self.snapshots.as_ref()).await {
            log::warn!("failed to clear session snapshot: {err}");
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use quiz_core::FixedQuestions;
    use quiz_core::model::{AnswerOption, QuestionDraft, QuestionLevel};
    use quiz_core::time::fixed_clock;
    use storage::repository::{InMemoryRepository, StorageError};

    fn bank(count: u64) -> Arc<dyn QuestionSource> {
        let questions = (1..=count)
            .map(|id| {
                QuestionDraft::multiple_choice(
                    QuestionId::new(id),
                    "css",
                    QuestionLevel::Middle,
                    format!("Q{id}"),
                    vec![AnswerOption::new("a", "A"), AnswerOption::new("b", "B")],
                    "a",
                )
                .validate()
                .unwrap()
            })
            .collect();
        Arc::new(FixedQuestions::new(questions))
    }

    struct BrokenStore;

    #[async_trait]
    impl SnapshotStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    #[tokio::test]
    async fn operations_before_start_are_rejected() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut engine =
            TestSessionEngine::open(fixed_clock(), SessionSettings::default(), bank(2), repo).await;

        assert_eq!(engine.phase(), SessionPhase::NotStarted);
        assert!(!engine.resume_available());
        assert_eq!(engine.advance().await, Err(SessionError::NotActive));
        assert_eq!(engine.retreat().await, Err(SessionError::NotActive));
        assert_eq!(engine.tick().await, TickOutcome::Idle);
        assert!(engine.view().is_none());
    }

    #[tokio::test]
    async fn storage_failures_do_not_break_the_session() {
        let mut engine = TestSessionEngine::open(
            fixed_clock(),
            SessionSettings::default(),
            bank(2),
            Arc::new(BrokenStore),
        )
        .await;
        assert!(!engine.resume_available());

        assert!(!engine.resume_session().await);
        engine
            .select_answer(QuestionId::new(1), Some(OptionId::new("a")))
            .await
            .unwrap();
        engine.advance().await.unwrap();
        assert_eq!(engine.advance().await, Ok(Advance::Finished));
        assert_eq!(engine.result().unwrap().correct_answers(), 1);
    }

    #[tokio::test]
    async fn progress_tracks_answers_and_completion() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut engine =
            TestSessionEngine::open(fixed_clock(), SessionSettings::default(), bank(2), repo).await;
        assert!(engine.progress().is_none());

        engine.start_new_session().await;
        engine
            .select_answer(QuestionId::new(1), Some(OptionId::new("b")))
            .await
            .unwrap();
        engine.advance().await.unwrap();

        let progress = engine.progress().unwrap();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.current_index, 1);
        assert_eq!(progress.percentage, 50.0);
        assert!(!progress.is_complete);

        engine.advance().await.unwrap();
        assert!(engine.progress().unwrap().is_complete);
    }

    #[tokio::test]
    async fn retreat_persists_new_index() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut engine = TestSessionEngine::open(
            fixed_clock(),
            SessionSettings::default(),
            bank(3),
            repo.clone(),
        )
        .await;
        engine.start_new_session().await;
        engine.advance().await.unwrap();
        engine.clock_mut().advance(Duration::seconds(4));
        assert!(engine.retreat().await.unwrap());

        let saved = SessionSnapshotRecord::load(repo.as_ref()).await.unwrap().unwrap();
        assert_eq!(saved.current_index, 0);
        assert_eq!(saved.question_started_at, engine.clock().now());
    }

    #[tokio::test]
    async fn discard_snapshot_clears_resume_flag() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut first = TestSessionEngine::open(
            fixed_clock(),
            SessionSettings::default(),
            bank(2),
            repo.clone(),
        )
        .await;
        first.start_new_session().await;

        let mut second =
            TestSessionEngine::open(fixed_clock(), SessionSettings::default(), bank(2), repo.clone())
                .await;
        assert!(second.resume_available());
        second.discard_snapshot().await;
        assert!(!second.resume_available());
        assert!(repo.is_empty().unwrap());
    }
}
