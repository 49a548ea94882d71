mod answer;
mod ids;
mod question;
mod result;
mod settings;
mod snapshot;

pub use ids::{OptionId, QuestionId};

pub use answer::{UserAnswer, upsert_answer};
pub use question::{
    AnswerOption, DEFAULT_QUESTION_TIME_SECS, Question, QuestionDraft, QuestionError,
    QuestionKind, QuestionLevel,
};
pub use result::{QuestionOutcome, ScoreBreakdown, TestResult};
pub use settings::{SessionSettings, SettingsError};
pub use snapshot::{SessionSnapshot, SnapshotError};
