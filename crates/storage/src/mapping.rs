use quiz_core::model::{AnswerOption, CategoryLabel, QuestionId, QuestionRecord};
use serde::Deserialize;

use crate::repository::StorageError;

/// Wire shape of one question. Field names follow the reference data file;
/// English names are accepted as aliases.
#[derive(Debug, Deserialize)]
pub(crate) struct RawQuestion {
    #[serde(rename = "pregunta", alias = "prompt")]
    prompt: String,
    #[serde(rename = "categorias", alias = "categories")]
    categories: Vec<String>,
    #[serde(rename = "puntos", alias = "points")]
    points: u32,
    #[serde(rename = "opciones", alias = "options")]
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawOption {
    #[serde(rename = "texto", alias = "text")]
    text: String,
    #[serde(rename = "esCorrecta", alias = "isCorrect", alias = "is_correct")]
    is_correct: bool,
}

fn invalid(index: usize, source: impl Into<quiz_core::Error>) -> StorageError {
    StorageError::InvalidRecord {
        index,
        source: source.into(),
    }
}

/// Convert the raw record at position `index` (0-based) into a validated question.
pub(crate) fn map_question(index: usize, raw: RawQuestion) -> Result<QuestionRecord, StorageError> {
    let categories = raw
        .categories
        .into_iter()
        .map(CategoryLabel::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| invalid(index, e))?;

    let options = raw
        .options
        .into_iter()
        .map(|o| AnswerOption::new(o.text, o.is_correct))
        .collect();

    let id = QuestionId::new(u64::try_from(index).unwrap_or(u64::MAX).saturating_add(1));

    QuestionRecord::new(id, raw.prompt, categories, options, raw.points)
        .map_err(|e| invalid(index, e))
}
