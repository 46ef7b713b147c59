use serde::{Deserialize, Serialize};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        quiz::{Quiz, QuizMetadata},
        quiz_question::{label_index, option_label, Question},
    },
};

/// The correct-answer marker as it appears on disk: an index, a label
/// letter, or the text of the correct option.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Index(usize),
    Text(String),
}

impl CorrectAnswer {
    /// Text markers match an option's exact text before they are read as a label.
    pub fn resolve(&self, options: &[String]) -> Option<usize> {
        match self {
            CorrectAnswer::Index(index) => (*index < options.len()).then_some(*index),
            CorrectAnswer::Text(text) => {
                let text = text.trim();
                options
                    .iter()
                    .position(|o| o.trim() == text)
                    .or_else(|| label_index(text).filter(|index| *index < options.len()))
            }
        }
    }

    /// The label letter, unless some option's text would shadow it on reload.
    pub fn for_question(question: &Question) -> Self {
        let label = CorrectAnswer::Text(option_label(question.correct_index));
        if label.resolve(&question.options) == Some(question.correct_index) {
            label
        } else {
            CorrectAnswer::Index(question.correct_index)
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuizQuestionFileDto {
    #[serde(alias = "prompt")]
    pub question: String,
    pub options: Vec<String>,
    #[serde(alias = "answer")]
    pub correct_answer: CorrectAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_answer_line: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuizFileDto {
    #[serde(default)]
    pub metadata: QuizMetadata,
    pub questions: Vec<QuizQuestionFileDto>,
}

impl QuizQuestionFileDto {
    fn into_question(self, position: usize) -> AppResult<Question> {
        let correct_index = self.correct_answer.resolve(&self.options).ok_or_else(|| {
            AppError::MalformedQuiz(format!(
                "question {} has a correct answer {:?} that matches no option",
                position + 1,
                self.correct_answer
            ))
        })?;

        Question::new(self.question, self.options, correct_index).map_err(|e| match e {
            AppError::MalformedQuiz(msg) => {
                AppError::MalformedQuiz(format!("question {}: {}", position + 1, msg))
            }
            other => other,
        })
    }
}

impl From<&Question> for QuizQuestionFileDto {
    fn from(question: &Question) -> Self {
        QuizQuestionFileDto {
            question: question.prompt.clone(),
            options: question.options.clone(),
            correct_answer: CorrectAnswer::for_question(question),
            raw_answer_line: None,
        }
    }
}

impl From<&Quiz> for QuizFileDto {
    fn from(quiz: &Quiz) -> Self {
        QuizFileDto {
            metadata: quiz.metadata.clone(),
            questions: quiz.questions.iter().map(QuizQuestionFileDto::from).collect(),
        }
    }
}

impl QuizFileDto {
    pub fn into_quiz(self, id: &str) -> AppResult<Quiz> {
        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(position, q)| q.into_question(position))
            .collect::<AppResult<Vec<_>>>()?;

        Quiz::new(id, self.metadata, questions)
    }
}

/// Parses a quiz document. Accepts the full `{metadata, questions}` object or
/// a bare array of question objects.
pub fn parse_quiz(id: &str, contents: &str) -> AppResult<Quiz> {
    let malformed = |e: serde_json::Error| AppError::MalformedQuiz(format!("{}: {}", id, e));

    let value: serde_json::Value = serde_json::from_str(contents).map_err(malformed)?;

    let file = if value.is_array() {
        QuizFileDto {
            metadata: QuizMetadata::default(),
            questions: serde_json::from_value(value).map_err(malformed)?,
        }
    } else {
        serde_json::from_value::<QuizFileDto>(value).map_err(malformed)?
    };

    file.into_quiz(id)
}
