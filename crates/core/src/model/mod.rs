mod category;
mod ids;
mod question;
mod score;
mod settings;

pub use category::{CategoryError, CategoryLabel};
pub use ids::{QuestionId, SessionId};
pub use question::{AnswerOption, QuestionError, QuestionRecord};
pub use score::CategoryScore;
pub use settings::{QuizSettings, SettingsError};
