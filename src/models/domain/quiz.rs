use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{AppError, AppResult},
    models::domain::quiz_question::Question,
};

pub const QUIZ_FILE_PREFIX: &str = "mcqs_";
pub const QUIZ_FILE_SUFFIX: &str = ".json";

/// Descriptive header written by the generator. Every field is optional so
/// hand-written quiz files load too.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_chunks: Option<usize>,
}

/// Ordered, non-empty set of questions loaded from one quiz file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quiz {
    pub id: String,
    pub metadata: QuizMetadata,
    pub questions: Vec<Question>,
}

/// Catalog entry: the identifier plus what the home page shows about it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub total_questions: usize,
    pub generated_at: Option<NaiveDateTime>,
}

/// True for bare file names following the `mcqs_<topic>_<timestamp>.json` convention.
pub fn is_quiz_file_name(name: &str) -> bool {
    name.starts_with(QUIZ_FILE_PREFIX)
        && name.ends_with(QUIZ_FILE_SUFFIX)
        && name.len() > QUIZ_FILE_PREFIX.len() + QUIZ_FILE_SUFFIX.len()
        && !name.contains(|c: char| c == '/' || c == '\\')
        && !name.contains("..")
}

fn title_from_id(id: &str) -> String {
    id.trim_start_matches(QUIZ_FILE_PREFIX)
        .trim_end_matches(QUIZ_FILE_SUFFIX)
        .replace('_', " ")
}

impl Quiz {
    pub fn new(id: &str, metadata: QuizMetadata, questions: Vec<Question>) -> AppResult<Self> {
        if questions.is_empty() {
            return Err(AppError::MalformedQuiz(format!(
                "quiz '{}' contains no questions",
                id
            )));
        }

        Ok(Quiz {
            id: id.to_string(),
            metadata,
            questions,
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    pub fn question(&self, position: usize) -> Option<&Question> {
        self.questions.get(position)
    }

    pub fn title(&self) -> String {
        match &self.metadata.query {
            Some(query) if !query.trim().is_empty() => query.clone(),
            _ => title_from_id(&self.id),
        }
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            id: self.id.clone(),
            title: self.title(),
            total_questions: self.len(),
            generated_at: self.metadata.generated_at,
        }
    }
}

impl QuizSummary {
    pub fn display_date(&self) -> Option<String> {
        self.generated_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
    }
}
