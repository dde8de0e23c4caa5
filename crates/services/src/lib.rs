#![forbid(unsafe_code)]

pub mod bank;
pub mod error;
pub mod presenter;
pub mod quiz;

pub use quiz_core::Clock;

pub use bank::QuestionBank;
pub use error::{LoadError, SelectionError, SessionError};
pub use presenter::Presenter;

pub use quiz::{
    AdvanceResult, AdvanceTicket, AnswerOutcome, AnswerSubmission, QuizBuilder, QuizLoopService,
    QuizPlan, QuizProgress, QuizSequence, QuizSession, QuizState, ResultsAggregator,
    ResultsSummary, ScheduledAdvance, SessionState, StartOutcome,
};
