use quiz_core::model::{Question, UserAnswer};

/// Presentation-agnostic read model of the question on screen.
///
/// No pre-formatted strings; the UI decides how to render time and progress.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView<'a> {
    pub current_question: &'a Question,
    pub current_index: usize,
    pub question_count: usize,
    pub remaining_time_secs: u32,
    pub progress_percentage: f64,
    pub current_user_answer: Option<&'a UserAnswer>,
}
