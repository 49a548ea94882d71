use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Question, QuestionLevel, UserAnswer};

/// Per-question line of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question: Question,
    pub answer: Option<UserAnswer>,
    pub is_correct: bool,
}

impl QuestionOutcome {
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// Correct / incorrect / unanswered tally for a slice of the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
}

impl ScoreBreakdown {
    fn record(&mut self, outcome: &QuestionOutcome) {
        self.total = self.total.saturating_add(1);
        if outcome.answer.is_none() {
            self.unanswered = self.unanswered.saturating_add(1);
        } else if outcome.is_correct {
            self.correct = self.correct.saturating_add(1);
        } else {
            self.incorrect = self.incorrect.saturating_add(1);
        }
    }

    /// `correct / total * 100`, or `0.0` when empty.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        percentage(self.correct, self.total)
    }
}

/// Final score of a completed session. Built once; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    total_questions: u32,
    correct_answers: u32,
    incorrect_answers: u32,
    unanswered: u32,
    score_percentage: f64,
    details: Vec<QuestionOutcome>,
}

impl TestResult {
    /// Assemble a result from per-question outcomes, in question order.
    #[must_use]
    pub fn from_outcomes(details: Vec<QuestionOutcome>) -> Self {
        let mut tally = ScoreBreakdown::default();
        for outcome in &details {
            tally.record(outcome);
        }

        Self {
            total_questions: tally.total,
            correct_answers: tally.correct,
            incorrect_answers: tally.incorrect,
            unanswered: tally.unanswered,
            score_percentage: tally.percentage(),
            details,
        }
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> u32 {
        self.incorrect_answers
    }

    #[must_use]
    pub fn unanswered(&self) -> u32 {
        self.unanswered
    }

    #[must_use]
    pub fn score_percentage(&self) -> f64 {
        self.score_percentage
    }

    /// Score rounded to two decimals, e.g. `33.33`.
    #[must_use]
    pub fn score_percentage_rounded(&self) -> f64 {
        (self.score_percentage * 100.0).round() / 100.0
    }

    #[must_use]
    pub fn details(&self) -> &[QuestionOutcome] {
        &self.details
    }

    /// Sum of time spent over all answered questions.
    #[must_use]
    pub fn total_time_spent_secs(&self) -> u64 {
        self.details
            .iter()
            .filter_map(|outcome| outcome.answer.as_ref())
            .map(|answer| u64::from(answer.time_spent_secs))
            .sum()
    }

    #[must_use]
    pub fn by_category(&self) -> BTreeMap<String, ScoreBreakdown> {
        let mut map: BTreeMap<String, ScoreBreakdown> = BTreeMap::new();
        for outcome in &self.details {
            map.entry(outcome.question.category().to_owned())
                .or_default()
                .record(outcome);
        }
        map
    }

    #[must_use]
    pub fn by_level(&self) -> BTreeMap<QuestionLevel, ScoreBreakdown> {
        let mut map: BTreeMap<QuestionLevel, ScoreBreakdown> = BTreeMap::new();
        for outcome in &self.details {
            map.entry(outcome.question.level()).or_default().record(outcome);
        }
        map
    }
}

fn percentage(part: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(part) / f64::from(total) * 100.0
}
