mod error;
mod input;
mod terminal;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use quiz_core::model::QuizSettings;
use services::{
    AdvanceTicket, Clock, Presenter, QuestionBank, QuizLoopService, QuizSession, QuizState,
    ScheduledAdvance, SessionError,
};
use storage::{JsonFileSource, QuestionSource};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::input::{Command, Screen};
use crate::terminal::TerminalPresenter;

#[derive(Debug, Parser)]
#[command(name = "quiz", about = "Multiple-choice quiz in the terminal", version)]
struct Args {
    /// JSON file holding the question bank
    #[arg(
        long = "questions",
        env = "QUIZ_QUESTIONS_PATH",
        default_value = "data/questions.json"
    )]
    questions_path: PathBuf,

    /// Pause between answer feedback and the next question, in milliseconds
    #[arg(long, env = "QUIZ_FEEDBACK_DELAY_MS", default_value_t = 1200)]
    feedback_delay_ms: u64,

    /// Questions per quiz when the setup line gives no count
    #[arg(long = "count", env = "QUIZ_DEFAULT_COUNT", default_value_t = 10)]
    default_count: u32,
}

#[derive(Debug)]
enum QuizEvent {
    Line(String),
    AdvanceDue(AdvanceTicket),
    InputClosed,
}

enum Flow {
    Continue,
    Quit,
}

type Quiz<W> = QuizLoopService<TerminalPresenter<W>>;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Forward stdin lines to the event loop from a detached thread.
fn spawn_stdin_reader(events: mpsc::Sender<QuizEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let event = match line {
                Ok(line) => QuizEvent::Line(line),
                Err(err) => {
                    warn!(error = %err, "stdin read failed");
                    break;
                }
            };
            if events.blocking_send(event).is_err() {
                return;
            }
        }
        let _ = events.blocking_send(QuizEvent::InputClosed);
    });
}

fn schedule_advance(events: mpsc::Sender<QuizEvent>, scheduled: ScheduledAdvance) {
    tokio::spawn(async move {
        tokio::time::sleep(scheduled.delay).await;
        if events
            .send(QuizEvent::AdvanceDue(scheduled.ticket))
            .await
            .is_err()
        {
            debug!("event loop closed before advance fired");
        }
    });
}

async fn handle_line<W: Write>(
    quiz: &mut Quiz<W>,
    source: &dyn QuestionSource,
    events: &mpsc::Sender<QuizEvent>,
    line: &str,
) -> Result<Flow, AppError> {
    let screen = Screen::of(quiz.session(), quiz.bank().categories());
    let command = match Command::parse(line, &screen) {
        Ok(command) => command,
        Err(err) => {
            quiz.presenter_mut().render_message(&err.to_string());
            return Ok(Flow::Continue);
        }
    };

    match command {
        Command::Quit => return Ok(Flow::Quit),
        Command::Help => quiz.presenter_mut().render_help(),
        Command::Restart => quiz.on_restart_requested(),
        Command::Reload => match quiz.reload_bank(source).await {
            Ok(true) => info!(questions = quiz.bank().len(), "question bank reloaded"),
            Ok(false) => quiz
                .presenter_mut()
                .render_message("restart the quiz before reloading questions"),
            Err(err) => {
                error!(error = %err, "question bank reload failed");
                quiz.presenter_mut().render_message(err.user_message());
            }
        },
        Command::Start { categories, count } => {
            let count = count.unwrap_or(quiz.settings().default_question_count());
            quiz.on_start_requested(&categories, count)?;
        }
        Command::Answer(index) => match quiz.on_answer_selected(index) {
            Ok(scheduled) => schedule_advance(events.clone(), scheduled),
            Err(SessionError::AlreadyAnswered) => debug!("answer ignored during feedback"),
            Err(err) => return Err(err.into()),
        },
    }
    Ok(Flow::Continue)
}

async fn run(args: Args) -> Result<(), AppError> {
    let settings = QuizSettings::new(args.feedback_delay_ms, args.default_count)?;
    let source = JsonFileSource::new(args.questions_path);
    let bank = QuestionBank::load(&source).await?;

    let mut quiz = QuizLoopService::new(
        bank,
        settings,
        Clock::system(),
        TerminalPresenter::new(io::stdout()),
    );

    let (events, mut inbox) = mpsc::channel(16);
    spawn_stdin_reader(events.clone());
    quiz.show_setup();
    drive(&mut quiz, &source, events, &mut inbox).await
}

fn awaiting_advance(session: &QuizSession) -> bool {
    matches!(session.state(), QuizState::InProgress { answered: true, .. })
}

/// Run the event loop until the user quits, or input is closed and no
/// advance is still pending.
async fn drive<W: Write>(
    quiz: &mut Quiz<W>,
    source: &dyn QuestionSource,
    events: mpsc::Sender<QuizEvent>,
    inbox: &mut mpsc::Receiver<QuizEvent>,
) -> Result<(), AppError> {
    let mut input_open = true;
    while let Some(event) = inbox.recv().await {
        match event {
            QuizEvent::Line(line) => {
                if let Flow::Quit = handle_line(quiz, source, &events, &line).await? {
                    break;
                }
            }
            QuizEvent::AdvanceDue(ticket) => {
                quiz.on_advance_due(ticket)?;
            }
            QuizEvent::InputClosed => input_open = false,
        }
        if !input_open && !awaiting_advance(quiz.session()) {
            debug!("input closed, leaving event loop");
            break;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "quiz exited with an error");
            eprintln!("{}", err.user_message());
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerOption, CategoryLabel, QuestionId, QuestionRecord};
    use quiz_core::time::fixed_clock;
    use storage::InMemoryQuestionSource;

    async fn one_question_quiz() -> (InMemoryQuestionSource, Quiz<Vec<u8>>) {
        let question = QuestionRecord::new(
            QuestionId::new(1),
            "2 + 2",
            vec![CategoryLabel::new("Math").unwrap()],
            vec![AnswerOption::wrong("3"), AnswerOption::correct("4")],
            2,
        )
        .unwrap();
        let source = InMemoryQuestionSource::new(vec![question]);
        let bank = QuestionBank::load(&source).await.unwrap();
        let quiz = QuizLoopService::new(
            bank,
            QuizSettings::new(20, 10).unwrap(),
            fixed_clock(),
            TerminalPresenter::new(Vec::new()),
        );
        (source, quiz)
    }

    fn output(quiz: &Quiz<Vec<u8>>) -> String {
        String::from_utf8(quiz.presenter().written().clone()).unwrap()
    }

    #[tokio::test]
    async fn results_render_when_input_closes_during_feedback() {
        let (source, mut quiz) = one_question_quiz().await;
        let (events, mut inbox) = mpsc::channel(16);
        for event in [
            QuizEvent::Line("1 1".into()),
            QuizEvent::Line("2".into()),
            QuizEvent::InputClosed,
        ] {
            events.send(event).await.unwrap();
        }

        drive(&mut quiz, &source, events, &mut inbox).await.unwrap();

        assert!(quiz.session().is_complete());
        let text = output(&quiz);
        assert!(text.contains("Correct! +2 points"));
        assert!(text.contains("=== Results ===\nScore: 2 / 2 over 1 questions"));
    }

    #[tokio::test]
    async fn closed_input_at_setup_ends_the_loop() {
        let (source, mut quiz) = one_question_quiz().await;
        let (events, mut inbox) = mpsc::channel(16);
        events.send(QuizEvent::InputClosed).await.unwrap();

        drive(&mut quiz, &source, events, &mut inbox).await.unwrap();

        assert_eq!(quiz.session().state(), QuizState::NotStarted);
        assert!(output(&quiz).is_empty());
    }

    #[tokio::test]
    async fn quit_leaves_the_loop_mid_quiz() {
        let (source, mut quiz) = one_question_quiz().await;
        let (events, mut inbox) = mpsc::channel(16);
        for event in [QuizEvent::Line("all".into()), QuizEvent::Line("quit".into())] {
            events.send(event).await.unwrap();
        }

        drive(&mut quiz, &source, events, &mut inbox).await.unwrap();

        assert!(matches!(
            quiz.session().state(),
            QuizState::InProgress { answered: false, .. }
        ));
    }
}
