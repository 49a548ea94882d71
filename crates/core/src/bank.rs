use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::model::{AnswerOption, Question, QuestionDraft, QuestionId, QuestionLevel};

/// Supplies the ordered question set for a session.
///
/// Implementations must be deterministic for the lifetime of the process so
/// that a persisted question index keeps pointing at the same question.
pub trait QuestionSource: Send + Sync {
    fn generate_questions(&self) -> Vec<Question>;
}

/// A caller-provided question set, returned as-is.
#[derive(Debug, Clone, Default)]
pub struct FixedQuestions {
    questions: Vec<Question>,
}

impl FixedQuestions {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

impl QuestionSource for FixedQuestions {
    fn generate_questions(&self) -> Vec<Question> {
        self.questions.clone()
    }
}

/// Built-in front-end interview bank.
///
/// With a shuffle seed the options of each multiple-choice question are
/// reordered; option ids travel with their text so grading is unaffected.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticQuestionBank {
    shuffle_seed: Option<u64>,
}

impl StaticQuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_shuffled_options(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }
}

impl QuestionSource for StaticQuestionBank {
    fn generate_questions(&self) -> Vec<Question> {
        let mut questions: Vec<Question> = builtin_drafts()
            .into_iter()
            .filter_map(|draft| {
                let id = draft.id;
                draft
                    .validate()
                    .map_err(|err| log::warn!("skipping built-in question {id}: {err}"))
                    .ok()
            })
            .collect();

        if let Some(seed) = self.shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            for question in &mut questions {
                question.options_mut().shuffle(&mut rng);
            }
        }
        questions
    }
}

fn opts(items: [(&str, &str); 4]) -> Vec<AnswerOption> {
    items
        .into_iter()
        .map(|(id, text)| AnswerOption::new(id, text))
        .collect()
}

#[allow(clippy::too_many_lines)]
fn builtin_drafts() -> Vec<QuestionDraft> {
    vec![
        QuestionDraft::multiple_choice(
            QuestionId::new(1),
            "javascript",
            QuestionLevel::Junior,
            "What does `typeof null` evaluate to?",
            opts([
                ("a", "\"null\""),
                ("b", "\"object\""),
                ("c", "\"undefined\""),
                ("d", "\"number\""),
            ]),
            "b",
        )
        .explanation("A historical quirk: null was tagged as an object in the first engine.")
        .sources(["https://developer.mozilla.org/docs/Web/JavaScript/Reference/Operators/typeof"]),
        QuestionDraft::multiple_choice(
            QuestionId::new(2),
            "javascript",
            QuestionLevel::Middle,
            "In which order are these logged: sync code, a resolved promise callback, a setTimeout(0) callback?",
            opts([
                ("a", "timeout, promise, sync"),
                ("b", "sync, timeout, promise"),
                ("c", "sync, promise, timeout"),
                ("d", "promise, sync, timeout"),
            ]),
            "c",
        )
        .explanation("Microtasks (promise reactions) drain before the next macrotask (timers).")
        .sources(["https://html.spec.whatwg.org/multipage/webappapis.html#event-loops"]),
        QuestionDraft::multiple_choice(
            QuestionId::new(3),
            "css",
            QuestionLevel::Junior,
            "Which selector has the highest specificity?",
            opts([
                ("a", "#nav .item"),
                ("b", ".nav .item a"),
                ("c", "nav ul li a"),
                ("d", "[data-nav] a"),
            ]),
            "a",
        )
        .explanation("An id selector outweighs any number of class or type selectors."),
        QuestionDraft::multiple_choice(
            QuestionId::new(4),
            "react",
            QuestionLevel::Middle,
            "Why should list items rendered from an array get a stable `key`?",
            opts([
                ("a", "Keys are required for CSS styling"),
                ("b", "They let reconciliation match elements between renders"),
                ("c", "They make the list render in parallel"),
                ("d", "They are passed to the child as a prop"),
            ]),
            "b",
        )
        .explanation("Keys identify siblings so state and DOM nodes follow the right item."),
        QuestionDraft::multiple_choice(
            QuestionId::new(5),
            "react",
            QuestionLevel::Senior,
            "A `useEffect` subscribes to a store but the callback reads stale props. The most direct fix is:",
            opts([
                ("a", "Wrap the component in React.memo"),
                ("b", "Move the subscription into useLayoutEffect"),
                ("c", "Add the props to the dependency array and resubscribe"),
                ("d", "Store the props in a module-level variable"),
            ]),
            "c",
        )
        .explanation("The effect closes over the props of the render it was created in."),
        QuestionDraft::multiple_choice(
            QuestionId::new(6),
            "typescript",
            QuestionLevel::Middle,
            "What is the type of `x` after `const x = [1, 'a'] as const`?",
            opts([
                ("a", "(string | number)[]"),
                ("b", "[number, string]"),
                ("c", "readonly [1, \"a\"]"),
                ("d", "readonly (1 | \"a\")[]"),
            ]),
            "c",
        )
        .explanation("`as const` infers a readonly tuple of literal types."),
        QuestionDraft::multiple_choice(
            QuestionId::new(7),
            "web",
            QuestionLevel::Middle,
            "Which header lets a browser reuse a cached response without revalidation for one hour?",
            opts([
                ("a", "Cache-Control: no-cache"),
                ("b", "Cache-Control: max-age=3600"),
                ("c", "Expires: 0"),
                ("d", "ETag: \"3600\""),
            ]),
            "b",
        )
        .explanation("max-age sets the freshness lifetime in seconds."),
        QuestionDraft::multiple_choice(
            QuestionId::new(8),
            "performance",
            QuestionLevel::Senior,
            "Which metric measures responsiveness to user input across the whole page visit?",
            opts([
                ("a", "Largest Contentful Paint"),
                ("b", "Cumulative Layout Shift"),
                ("c", "Time to First Byte"),
                ("d", "Interaction to Next Paint"),
            ]),
            "d",
        )
        .explanation("INP reports the worst-case interaction latency observed on the page.")
        .sources(["https://web.dev/articles/inp"]),
        QuestionDraft::case_study(
            QuestionId::new(9),
            "architecture",
            QuestionLevel::Senior,
            "A dashboard renders 10,000 table rows and scrolling stutters. Describe how you would diagnose and fix it.",
        )
        .explanation("Profile first; then consider virtualization, memoized rows and moving work off the main thread.")
        .time_limit_secs(300),
        QuestionDraft::case_study(
            QuestionId::new(10),
            "architecture",
            QuestionLevel::Middle,
            "Design client-side state for a multi-step form that must survive a page reload.",
        )
        .explanation("Persist a minimal snapshot per step, validate it on load and discard it when invalid.")
        .time_limit_secs(180),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionKind;

    #[test]
    fn builtin_bank_is_valid_and_ordered() {
        let drafts = builtin_drafts();
        let count = drafts.len();
        for draft in drafts {
            draft.validate().unwrap();
        }

        let questions = StaticQuestionBank::new().generate_questions();
        assert_eq!(questions.len(), count);
        let ids: Vec<u64> = questions.iter().map(|q| q.id().value()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert!(questions.iter().any(|q| q.kind() == QuestionKind::CaseStudy));
    }

    #[test]
    fn generation_is_deterministic() {
        let bank = StaticQuestionBank::new().with_shuffled_options(7);
        assert_eq!(bank.generate_questions(), bank.generate_questions());
        assert_eq!(
            StaticQuestionBank::new().generate_questions(),
            StaticQuestionBank::new().generate_questions()
        );
    }

    #[test]
    fn shuffling_keeps_correct_option_present() {
        let questions = StaticQuestionBank::new()
            .with_shuffled_options(42)
            .generate_questions();
        for question in questions.iter().filter(|q| q.is_multiple_choice()) {
            let correct = question.correct_option().unwrap();
            assert!(question.option(correct).is_some());
            assert_eq!(question.options().len(), 4);
        }
    }

    #[test]
    fn fixed_questions_are_returned_verbatim() {
        let questions = StaticQuestionBank::new().generate_questions();
        let fixed = FixedQuestions::new(questions[..3].to_vec());
        assert_eq!(fixed.generate_questions(), questions[..3].to_vec());
    }
}
