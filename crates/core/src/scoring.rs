//! Grading rules for a finished session.
//!
//! Multiple-choice answers are graded against the question's correct option.
//! Any other kind of question counts as correct once it has been answered;
//! case studies have no automatic grader yet, so this is where rubric
//! grading would plug in.

use crate::model::{OptionId, Question, QuestionKind, QuestionOutcome, TestResult, UserAnswer};

/// Whether selecting `selected` answers `question` correctly.
#[must_use]
pub fn is_answer_correct(question: &Question, selected: Option<&OptionId>) -> bool {
    match question.kind() {
        QuestionKind::MultipleChoice => {
            selected.is_some() && selected == question.correct_option()
        }
        QuestionKind::CaseStudy => true,
    }
}

/// Score `answers` against the full question set.
///
/// Every question contributes to the total, whether or not it was visited.
#[must_use]
pub fn score(questions: &[Question], answers: &[UserAnswer]) -> TestResult {
    let details = questions
        .iter()
        .map(|question| {
            let answer = answers
                .iter()
                .find(|answer| answer.question_id == question.id())
                .cloned();
            let is_correct = answer.as_ref().is_some_and(|answer| {
                is_answer_correct(question, answer.selected_option.as_ref())
            });
            QuestionOutcome {
                question: question.clone(),
                answer,
                is_correct,
            }
        })
        .collect();

    TestResult::from_outcomes(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, QuestionDraft, QuestionId, QuestionLevel};

    fn multiple_choice(id: u64) -> Question {
        QuestionDraft::multiple_choice(
            QuestionId::new(id),
            "javascript",
            QuestionLevel::Junior,
            format!("Q{id}"),
            vec![
                AnswerOption::new("a", "A"),
                AnswerOption::new("b", "B"),
                AnswerOption::new("c", "C"),
            ],
            "b",
        )
        .validate()
        .unwrap()
    }

    fn case_study(id: u64) -> Question {
        QuestionDraft::case_study(QuestionId::new(id), "architecture", QuestionLevel::Senior, "Design it")
            .validate()
            .unwrap()
    }

    fn answer(id: u64, option: Option<&str>) -> UserAnswer {
        UserAnswer::new(QuestionId::new(id), option.map(OptionId::new), false, 5)
    }

    #[test]
    fn multiple_choice_matches_correct_option_only() {
        let question = multiple_choice(1);
        assert!(is_answer_correct(&question, Some(&OptionId::new("b"))));
        assert!(!is_answer_correct(&question, Some(&OptionId::new("a"))));
        assert!(!is_answer_correct(&question, None));
    }

    #[test]
    fn answered_case_study_counts_as_correct() {
        let questions = vec![case_study(1), case_study(2)];
        let result = score(&questions, &[answer(1, None)]);

        assert_eq!(result.correct_answers(), 1);
        assert_eq!(result.incorrect_answers(), 0);
        assert_eq!(result.unanswered(), 1);
    }

    #[test]
    fn score_covers_unvisited_questions() {
        let questions: Vec<_> = (1..=4).map(multiple_choice).collect();
        let result = score(&questions, &[answer(1, Some("b")), answer(2, Some("c"))]);

        assert_eq!(result.total_questions(), 4);
        assert_eq!(
            result.correct_answers() + result.incorrect_answers() + result.unanswered(),
            result.total_questions()
        );
        assert!((result.score_percentage() - 25.0).abs() < f64::EPSILON);
        assert!(result.details()[0].is_correct);
        assert!(!result.details()[1].is_correct);
        assert!(!result.details()[3].is_answered());
    }

    #[test]
    fn stored_correctness_flag_is_not_trusted() {
        let questions = vec![multiple_choice(1)];
        let mut stale = answer(1, Some("a"));
        stale.is_correct = true;
        let result = score(&questions, &[stale]);
        assert_eq!(result.incorrect_answers(), 1);
    }
}
