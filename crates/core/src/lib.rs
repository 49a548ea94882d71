#![forbid(unsafe_code)]

pub mod bank;
pub mod model;
pub mod scoring;
pub mod time;

pub use bank::{FixedQuestions, QuestionSource, StaticQuestionBank};
pub use time::Clock;
