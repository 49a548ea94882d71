//! Line-oriented terminal front end for a running session.

use std::io;
use std::time::Duration;

use quiz_core::model::{OptionId, QuestionKind, ScoreBreakdown, TestResult};
use services::{Advance, SessionPhase, TestSessionEngine, TickOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{MissedTickBehavior, interval};

/// Seconds left at which every tick is announced.
const COUNTDOWN_WARNING_SECS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Empty,
    Next,
    Previous,
    Done,
    Help,
    Quit,
    Pick(OptionId),
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" => Input::Empty,
        "n" | "next" => Input::Next,
        "p" | "prev" => Input::Previous,
        "done" => Input::Done,
        "h" | "?" | "help" => Input::Help,
        "q" | "quit" => Input::Quit,
        other => Input::Pick(OptionId::new(other)),
    }
}

fn format_timer(seconds: u32) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    format!("Time: {minutes}:{remainder:02}")
}

fn should_announce(remaining_secs: u32) -> bool {
    remaining_secs <= COUNTDOWN_WARNING_SECS || remaining_secs % 15 == 0
}

fn format_breakdown(label: &str, breakdown: &ScoreBreakdown) -> String {
    format!(
        "  {label:<14} {}/{} ({:.0}%)",
        breakdown.correct,
        breakdown.total,
        breakdown.percentage()
    )
}

fn print_help() {
    println!("  <option id>  select an answer (re-entering replaces it)");
    println!("  done         mark a case study as answered");
    println!("  n / next     next question");
    println!("  p / prev     previous question");
    println!("  q / quit     leave; progress stays saved");
}

fn print_question(engine: &TestSessionEngine) {
    let Some(view) = engine.view() else {
        return;
    };
    let question = view.current_question;

    println!();
    println!(
        "Question {}/{} [{} / {}] ({:.0}% through)",
        view.current_index + 1,
        view.question_count,
        question.category(),
        question.level().as_str(),
        view.progress_percentage,
    );
    println!("{}", question.prompt());
    match question.kind() {
        QuestionKind::MultipleChoice => {
            for option in question.options() {
                let marker = match view.current_user_answer {
                    Some(answer) if answer.selected_option.as_ref() == Some(&option.id) => '*',
                    _ => ' ',
                };
                println!(" {marker}{}) {}", option.id, option.text);
            }
        }
        QuestionKind::CaseStudy => {
            println!("  (case study: work it through, then type `done`)");
        }
    }
    if let Some(progress) = engine.progress() {
        println!("Answered {}/{}", progress.answered, progress.total);
    }
    println!("{}", format_timer(view.remaining_time_secs));
}

enum Flow {
    Continue,
    Quit,
}

async fn handle_input(engine: &mut TestSessionEngine, input: Input) -> Flow {
    let Some(question_id) = engine.current_question().map(|question| question.id()) else {
        return Flow::Quit;
    };

    match input {
        Input::Empty => {}
        Input::Help => print_help(),
        Input::Quit => return Flow::Quit,
        Input::Next => match engine.advance().await {
            Ok(Advance::Moved { .. }) => print_question(engine),
            Ok(Advance::Finished) => {}
            Err(err) => println!("{err}"),
        },
        Input::Previous => match engine.retreat().await {
            Ok(true) => print_question(engine),
            Ok(false) => println!("Already at the first question."),
            Err(err) => println!("{err}"),
        },
        Input::Done => match engine.select_answer(question_id, None).await {
            Ok(_) => println!("Marked as answered. Type `n` to continue."),
            Err(err) => println!("{err}"),
        },
        Input::Pick(option) => match engine.select_answer(question_id, Some(option)).await {
            Ok(answer) => {
                let picked = answer
                    .selected_option
                    .as_ref()
                    .map_or("-", OptionId::as_str)
                    .to_string();
                println!("Selected {picked}. Type `n` to continue.");
            }
            Err(err) => println!("{err}"),
        },
    }
    Flow::Continue
}

/// Drive `engine` from stdin until the session finishes or the user leaves.
///
/// The countdown interval lives only for the duration of this call.
pub async fn run_session(engine: &mut TestSessionEngine) -> io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    if engine.current_question().is_none() {
        // Nothing to ask; finish straight away so the result is produced.
        if let Err(err) = engine.advance().await {
            log::warn!("could not finish empty session: {err}");
        }
        return Ok(());
    }

    println!("Type `help` for commands.");
    print_question(engine);

    while engine.phase() == SessionPhase::Active {
        tokio::select! {
            _ = ticker.tick() => match engine.tick().await {
                TickOutcome::TimedOut(advance) => {
                    println!("Time is up.");
                    if let Advance::Moved { .. } = advance {
                        print_question(engine);
                    }
                }
                TickOutcome::Running { remaining_secs } if should_announce(remaining_secs) => {
                    println!("{}", format_timer(remaining_secs));
                }
                TickOutcome::Running { .. } | TickOutcome::Idle => {}
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!("Input closed. Progress saved.");
                    break;
                };
                if let Flow::Quit = handle_input(engine, parse_input(&line)).await {
                    println!("Progress saved. Run `quiz` again to resume.");
                    break;
                }
            }
        }
    }
    Ok(())
}

pub fn print_result(result: &TestResult) {
    println!();
    println!(
        "Score: {}/{} ({:.2}%)",
        result.correct_answers(),
        result.total_questions(),
        result.score_percentage_rounded()
    );
    println!(
        "Correct {}, incorrect {}, unanswered {}, time spent {}s",
        result.correct_answers(),
        result.incorrect_answers(),
        result.unanswered(),
        result.total_time_spent_secs()
    );

    println!();
    println!("By category:");
    for (category, breakdown) in result.by_category() {
        println!("{}", format_breakdown(&category, &breakdown));
    }
    println!("By level:");
    for (level, breakdown) in result.by_level() {
        println!("{}", format_breakdown(level.as_str(), &breakdown));
    }

    println!();
    for outcome in result.details() {
        let mark = match (&outcome.answer, outcome.is_correct) {
            (None, _) => "skipped",
            (Some(_), true) => "correct",
            (Some(_), false) => "wrong",
        };
        let question = &outcome.question;
        println!("[{mark}] {}", question.prompt());
        if let Some(correct) = question.correct_option() {
            println!("  answer: {correct}");
        }
        if !question.explanation().is_empty() {
            println!("  {}", question.explanation());
        }
        for source in question.sources() {
            println!("  see: {source}");
        }
    }
}
