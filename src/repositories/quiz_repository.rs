use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            quiz::{is_quiz_file_name, QuizSummary},
            Quiz,
        },
        dto::quiz_file::{parse_quiz, QuizFileDto},
    },
};

/// Catalog and loader over the quiz file collection.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn list_available_quizzes(&self) -> AppResult<Vec<QuizSummary>>;
    async fn load_quiz(&self, id: &str) -> AppResult<Quiz>;
    async fn save_quiz(&self, quiz: &Quiz) -> AppResult<()>;
}

pub struct FsQuizRepository {
    dir: PathBuf,
}

impl FsQuizRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> AppResult<PathBuf> {
        if !is_quiz_file_name(id) {
            return Err(AppError::NotFound(format!(
                "'{}' is not a quiz file name",
                id
            )));
        }
        Ok(self.dir.join(id))
    }
}

/// Newest first; files without a timestamp sort after dated ones, by name descending.
pub fn sort_summaries(summaries: &mut [QuizSummary]) {
    summaries.sort_by(|a, b| {
        b.generated_at
            .cmp(&a.generated_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl QuizRepository for FsQuizRepository {
    async fn list_available_quizzes(&self) -> AppResult<Vec<QuizSummary>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("Quiz directory {} does not exist", self.dir.display());
                return Ok(vec![]);
            }
            Err(e) => {
                return Err(AppError::InternalError(format!(
                    "Failed to read quiz directory {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to scan quiz directory: {}", e)))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_quiz_file_name(&name) {
                continue;
            }

            match self.load_quiz(&name).await {
                Ok(quiz) => summaries.push(quiz.summary()),
                Err(e) => log::warn!("Skipping quiz file {}: {}", name, e),
            }
        }

        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    async fn load_quiz(&self, id: &str) -> AppResult<Quiz> {
        let path = self.path_for(id)?;

        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!("Quiz '{}' not found", id)),
            ErrorKind::InvalidData => {
                AppError::MalformedQuiz(format!("{}: file is not valid UTF-8", id))
            }
            _ => AppError::InternalError(format!("Failed to read quiz '{}': {}", id, e)),
        })?;

        parse_quiz(id, &contents)
    }

    async fn save_quiz(&self, quiz: &Quiz) -> AppResult<()> {
        let path = self.path_for(&quiz.id)?;
        let json = serde_json::to_string_pretty(&QuizFileDto::from(quiz))
            .map_err(|e| AppError::InternalError(format!("Failed to serialize quiz: {}", e)))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::InternalError(format!(
                "Failed to create quiz directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        // Write then rename so the catalog never sees a half-written file.
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to write quiz: {}", e)))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to store quiz: {}", e)))?;

        log::info!("Saved quiz {} to {}", quiz.id, path.display());
        Ok(())
    }
}
