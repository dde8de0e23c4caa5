#![forbid(unsafe_code)]

pub mod json;
mod mapping;
pub mod repository;

pub use json::{JsonFileSource, parse_questions};
pub use repository::{InMemoryQuestionSource, QuestionSource, StorageError};
