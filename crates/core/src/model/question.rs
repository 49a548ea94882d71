use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId};

/// Time budget applied to questions that do not carry their own.
pub const DEFAULT_QUESTION_TIME_SECS: u32 = 60;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question category cannot be empty")]
    EmptyCategory,

    #[error("multiple-choice question needs at least two options")]
    TooFewOptions,

    #[error("duplicate option id: {0}")]
    DuplicateOption(OptionId),

    #[error("multiple-choice question is missing its correct option")]
    MissingCorrectOption,

    #[error("correct option {0} is not one of the question's options")]
    UnknownCorrectOption(OptionId),

    #[error("case-study question cannot have options or a correct option")]
    CaseStudyWithOptions,

    #[error("time limit must be > 0 seconds")]
    InvalidTimeLimit,
}

//
// ─── ENUMS ─────────────────────────────────────────────────────────────────────
//

/// Seniority level a question targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionLevel {
    Junior,
    Middle,
    Senior,
}

impl QuestionLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionLevel::Junior => "junior",
            QuestionLevel::Middle => "middle",
            QuestionLevel::Senior => "senior",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Pick one option; graded against the correct option id.
    MultipleChoice,
    /// Free-form scenario with no options; answering it is enough.
    CaseStudy,
}

//
// ─── OPTION ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub text: String,
}

impl AnswerOption {
    #[must_use]
    pub fn new(id: impl Into<OptionId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub category: String,
    pub level: QuestionLevel,
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub correct_option: Option<OptionId>,
    pub explanation: String,
    pub sources: Vec<String>,
    pub time_limit_secs: Option<u32>,
}

impl QuestionDraft {
    #[must_use]
    pub fn multiple_choice(
        id: QuestionId,
        category: impl Into<String>,
        level: QuestionLevel,
        prompt: impl Into<String>,
        options: Vec<AnswerOption>,
        correct_option: impl Into<OptionId>,
    ) -> Self {
        Self {
            id,
            category: category.into(),
            level,
            kind: QuestionKind::MultipleChoice,
            prompt: prompt.into(),
            options,
            correct_option: Some(correct_option.into()),
            explanation: String::new(),
            sources: Vec::new(),
            time_limit_secs: None,
        }
    }

    #[must_use]
    pub fn case_study(
        id: QuestionId,
        category: impl Into<String>,
        level: QuestionLevel,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id,
            category: category.into(),
            level,
            kind: QuestionKind::CaseStudy,
            prompt: prompt.into(),
            options: Vec::new(),
            correct_option: None,
            explanation: String::new(),
            sources: Vec::new(),
            time_limit_secs: None,
        }
    }

    #[must_use]
    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    #[must_use]
    pub fn sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn time_limit_secs(mut self, secs: u32) -> Self {
        self.time_limit_secs = Some(secs);
        self
    }

    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when text fields are blank, options are
    /// inconsistent with the question kind, or the time limit is zero.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let category = self.category.trim().to_owned();
        if category.is_empty() {
            return Err(QuestionError::EmptyCategory);
        }
        if self.time_limit_secs == Some(0) {
            return Err(QuestionError::InvalidTimeLimit);
        }

        match self.kind {
            QuestionKind::MultipleChoice => {
                if self.options.len() < 2 {
                    return Err(QuestionError::TooFewOptions);
                }
                let mut seen = HashSet::with_capacity(self.options.len());
                for option in &self.options {
                    if !seen.insert(&option.id) {
                        return Err(QuestionError::DuplicateOption(option.id.clone()));
                    }
                }
                let Some(correct) = self.correct_option.as_ref() else {
                    return Err(QuestionError::MissingCorrectOption);
                };
                if !seen.contains(correct) {
                    return Err(QuestionError::UnknownCorrectOption(correct.clone()));
                }
            }
            QuestionKind::CaseStudy => {
                if !self.options.is_empty() || self.correct_option.is_some() {
                    return Err(QuestionError::CaseStudyWithOptions);
                }
            }
        }

        Ok(Question {
            id: self.id,
            category,
            level: self.level,
            kind: self.kind,
            prompt,
            options: self.options,
            correct_option: self.correct_option,
            explanation: self.explanation,
            sources: self.sources,
            time_limit_secs: self.time_limit_secs,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated quiz question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    category: String,
    level: QuestionLevel,
    kind: QuestionKind,
    prompt: String,
    options: Vec<AnswerOption>,
    correct_option: Option<OptionId>,
    explanation: String,
    sources: Vec<String>,
    time_limit_secs: Option<u32>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn level(&self) -> QuestionLevel {
        self.level
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn is_multiple_choice(&self) -> bool {
        self.kind == QuestionKind::MultipleChoice
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|option| &option.id == id)
    }

    #[must_use]
    pub fn correct_option(&self) -> Option<&OptionId> {
        self.correct_option.as_ref()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u32> {
        self.time_limit_secs
    }

    /// Seconds allotted to this question, falling back to `default_secs`.
    #[must_use]
    pub fn allotment_secs(&self, default_secs: u32) -> u32 {
        self.time_limit_secs.unwrap_or(default_secs)
    }

    pub(crate) fn options_mut(&mut self) -> &mut Vec<AnswerOption> {
        &mut self.options
    }
}
