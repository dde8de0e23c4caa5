use thiserror::Error;

use quiz_core::model::CategoryLabel;
use services::{QuizSession, QuizState};

/// What the terminal is currently waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen<'a> {
    Setup { categories: &'a [CategoryLabel] },
    Question { options: usize },
    Results,
}

impl<'a> Screen<'a> {
    pub fn of(session: &QuizSession, categories: &'a [CategoryLabel]) -> Self {
        match session.state() {
            QuizState::NotStarted => Self::Setup { categories },
            QuizState::InProgress { .. } => Self::Question {
                options: session
                    .current_question()
                    .map_or(0, |question| question.options().len()),
            },
            QuizState::Completed => Self::Results,
        }
    }
}

/// A line of user input, resolved against the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start {
        categories: Vec<CategoryLabel>,
        count: Option<u32>,
    },
    /// Zero-based option index.
    Answer(usize),
    Restart,
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("there is no category number {0}")]
    UnknownCategory(usize),
    #[error("choose an option between 1 and {max}")]
    OptionOutOfRange { max: usize },
    #[error("expected category numbers and an optional count, got `{raw}`")]
    Malformed { raw: String },
    #[error("`{raw}` is not a number")]
    NotANumber { raw: String },
    #[error("type `restart` to play again or `quit` to exit")]
    Unexpected,
}

impl Command {
    /// Parse one input line.
    ///
    /// Setup lines look like `1,3 5`: category numbers (or `all`), then an
    /// optional question count. During a question, a line is an option number.
    ///
    /// # Errors
    ///
    /// Returns `InputError` when the line cannot be used on `screen`.
    pub fn parse(line: &str, screen: &Screen<'_>) -> Result<Self, InputError> {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => return Ok(Self::Quit),
            "r" | "restart" => return Ok(Self::Restart),
            "reload" => return Ok(Self::Reload),
            "?" | "help" => return Ok(Self::Help),
            _ => {}
        }

        match *screen {
            Screen::Setup { categories } => parse_setup(line, categories),
            Screen::Question { options } => {
                let choice = parse_number(line)?;
                if choice == 0 || choice > options {
                    return Err(InputError::OptionOutOfRange { max: options });
                }
                Ok(Self::Answer(choice - 1))
            }
            Screen::Results => Err(InputError::Unexpected),
        }
    }
}

fn parse_setup(line: &str, categories: &[CategoryLabel]) -> Result<Command, InputError> {
    // "1, 3 5" and "1,3 5" select the same categories.
    let compact = line.split(',').map(str::trim).collect::<Vec<_>>().join(",");
    let tokens: Vec<&str> = compact.split_whitespace().collect();
    if tokens.len() > 2 {
        return Err(InputError::Malformed {
            raw: line.to_owned(),
        });
    }
    let mut tokens = tokens.into_iter();
    let selected = match tokens.next() {
        None => Vec::new(),
        Some(all) if all.eq_ignore_ascii_case("all") => categories.to_vec(),
        Some(list) => list
            .split(',')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let number = parse_number(part)?;
                number
                    .checked_sub(1)
                    .and_then(|index| categories.get(index))
                    .cloned()
                    .ok_or(InputError::UnknownCategory(number))
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    let count = tokens
        .next()
        .map(|raw| {
            raw.parse::<u32>().map_err(|_| InputError::NotANumber {
                raw: raw.to_owned(),
            })
        })
        .transpose()?;

    Ok(Command::Start {
        categories: selected,
        count,
    })
}

fn parse_number(raw: &str) -> Result<usize, InputError> {
    raw.trim().parse().map_err(|_| InputError::NotANumber {
        raw: raw.trim().to_owned(),
    })
}
