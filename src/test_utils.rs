use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{QuizSummary, Quiz},
    repositories::{quiz_repository::sort_summaries, QuizRepository},
};

pub mod fixtures {
    use crate::models::domain::{Question, Quiz, QuizMetadata};

    pub const THREE_QUESTION_QUIZ_ID: &str = "mcqs_basics_20240101_000000.json";

    fn question(prompt: &str, correct_index: usize) -> Question {
        Question::new(
            prompt.to_string(),
            vec![
                "A) first".to_string(),
                "B) second".to_string(),
                "C) third".to_string(),
                "D) fourth".to_string(),
            ],
            correct_index,
        )
        .expect("fixture question is valid")
    }

    /// Three questions whose correct answers are A, B and C.
    pub fn three_question_quiz() -> Quiz {
        Quiz::new(
            THREE_QUESTION_QUIZ_ID,
            QuizMetadata {
                query: Some("basics".to_string()),
                total_questions: Some(3),
                ..QuizMetadata::default()
            },
            vec![
                question("Question 1: pick A", 0),
                question("Question 2: pick B", 1),
                question("Question 3: pick C", 2),
            ],
        )
        .expect("fixture quiz is valid")
    }

    /// A small on-disk quiz document.
    pub fn quiz_json(query: &str, generated_at: &str) -> String {
        serde_json::json!({
            "metadata": {
                "query": query,
                "total_questions": 2,
                "generated_at": generated_at,
            },
            "questions": [
                {
                    "question": "Question 1: first?",
                    "options": ["A) yes", "B) no", "C) maybe", "D) never"],
                    "correct_answer": "A",
                },
                {
                    "question": "Question 2: second?",
                    "options": ["A) yes", "B) no", "C) maybe", "D) never"],
                    "correct_answer": "D",
                }
            ]
        })
        .to_string()
    }
}

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: RwLock<HashMap<String, Quiz>>,
}

impl InMemoryQuizRepository {
    pub fn with_quizzes(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes: RwLock::new(quizzes.into_iter().map(|q| (q.id.clone(), q)).collect()),
        }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn list_available_quizzes(&self) -> AppResult<Vec<QuizSummary>> {
        let mut summaries: Vec<_> = self.quizzes.read().await.values().map(Quiz::summary).collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    async fn load_quiz(&self, id: &str) -> AppResult<Quiz> {
        self.quizzes
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Quiz '{}' not found", id)))
    }

    async fn save_quiz(&self, quiz: &Quiz) -> AppResult<()> {
        self.quizzes
            .write()
            .await
            .insert(quiz.id.clone(), quiz.clone());
        Ok(())
    }
}

/// Unique scratch directory under the OS temp dir, removed on drop.
pub struct TempQuizDir {
    path: PathBuf,
}

impl TempQuizDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("quiz-smith-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).expect("temp dir should be creatable");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.path.join(name), contents).expect("fixture file should be writable");
    }
}

impl Drop for TempQuizDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixture_quiz_answers() {
        let quiz = three_question_quiz();
        let labels: Vec<String> = quiz.questions.iter().map(|q| q.correct_label()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_fixture_json_parses() {
        let quiz = crate::models::dto::quiz_file::parse_quiz(
            "mcqs_fixture.json",
            &quiz_json("fixture", "2024-01-01T00:00:00"),
        )
        .expect("fixture json is valid");
        assert_eq!(quiz.len(), 2);
    }
}
