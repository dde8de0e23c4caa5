mod plan;
mod progress;
mod results;
mod service;
mod workflow;

// Public API of the quiz subsystem.
pub use plan::{QuizBuilder, QuizPlan, QuizSequence};
pub use progress::QuizProgress;
pub use results::{ResultsAggregator, ResultsSummary};
pub use service::{
    AdvanceResult, AdvanceTicket, AnswerOutcome, AnswerSubmission, QuizSession, QuizState,
    SessionState,
};
pub use workflow::{QuizLoopService, ScheduledAdvance, StartOutcome};
