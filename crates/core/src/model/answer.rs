use serde::{Deserialize, Serialize};

use crate::model::ids::{OptionId, QuestionId};

/// The answer recorded for one question.
///
/// A question without a `UserAnswer` is unanswered. At most one entry exists
/// per question; re-answering replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub question_id: QuestionId,
    pub selected_option: Option<OptionId>,
    pub is_correct: bool,
    #[serde(rename = "timeSpent")]
    pub time_spent_secs: u32,
}

impl UserAnswer {
    #[must_use]
    pub fn new(
        question_id: QuestionId,
        selected_option: Option<OptionId>,
        is_correct: bool,
        time_spent_secs: u32,
    ) -> Self {
        Self {
            question_id,
            selected_option,
            is_correct,
            time_spent_secs,
        }
    }
}

/// Insert `answer`, replacing any existing entry for the same question.
///
/// Returns the stored answer.
pub fn upsert_answer(answers: &mut Vec<UserAnswer>, answer: UserAnswer) -> &UserAnswer {
    match answers
        .iter()
        .position(|existing| existing.question_id == answer.question_id)
    {
        Some(idx) => {
            answers[idx] = answer;
            &answers[idx]
        }
        None => {
            answers.push(answer);
            let last = answers.len() - 1;
            &answers[last]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_existing_entry() {
        let mut answers = Vec::new();
        upsert_answer(
            &mut answers,
            UserAnswer::new(QuestionId::new(1), Some(OptionId::new("a")), false, 4),
        );
        upsert_answer(
            &mut answers,
            UserAnswer::new(QuestionId::new(2), None, true, 9),
        );
        let stored = upsert_answer(
            &mut answers,
            UserAnswer::new(QuestionId::new(1), Some(OptionId::new("b")), true, 7),
        )
        .clone();

        assert_eq!(answers.len(), 2);
        assert_eq!(stored.selected_option, Some(OptionId::new("b")));
        assert_eq!(answers[0], stored);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let answer = UserAnswer::new(QuestionId::new(3), Some(OptionId::new("c")), true, 12);
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "questionId": 3,
                "selectedOption": "c",
                "isCorrect": true,
                "timeSpent": 12
            })
        );
    }
}
