use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::{
    config::Config,
    constants::quiz_prompt::build_mcq_prompt,
    errors::{AppError, AppResult},
    models::{
        domain::{
            quiz::{QUIZ_FILE_PREFIX, QUIZ_FILE_SUFFIX},
            Quiz, QuizMetadata,
        },
        dto::quiz_file::QuizFileDto,
    },
    repositories::QuizRepository,
    services::{
        generation_steps::{generate_questions_step, retrieve_context_step, GenerationStep},
        mcq_parser::parse_mcqs,
        model_service::CompletionModel,
        retrieval_service::{combine_chunks, truncate_content, ContentRetriever},
    },
};

const MAX_SLUG_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub topic: String,
    pub num_questions: usize,
    pub num_chunks: usize,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, config: &Config) -> Self {
        Self {
            topic: topic.into(),
            num_questions: config.default_num_questions,
            num_chunks: config.default_num_chunks,
        }
    }
}

/// Builds `mcqs_<topic>_<timestamp>.json`, keeping the topic filesystem-safe.
pub fn quiz_id_for(topic: &str, generated_at: NaiveDateTime) -> String {
    let mut slug = String::new();
    for c in topic.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let mut slug: String = slug.chars().take(MAX_SLUG_LEN).collect();
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("quiz");
    }

    format!("mcqs_{}_{}.json", slug, generated_at.format("%Y%m%d_%H%M%S"))
}

/// Retrieval, prompting and parsing for new quiz files.
pub struct GenerationService {
    retriever: Arc<dyn ContentRetriever>,
    model: Arc<dyn CompletionModel>,
    quiz_repository: Arc<dyn QuizRepository>,
    max_content_length: usize,
    max_num_questions: usize,
    retrieve_step: GenerationStep,
    generate_step: GenerationStep,
}

impl GenerationService {
    pub fn new(
        retriever: Arc<dyn ContentRetriever>,
        model: Arc<dyn CompletionModel>,
        quiz_repository: Arc<dyn QuizRepository>,
        config: &Config,
    ) -> Self {
        Self {
            retriever,
            model,
            quiz_repository,
            max_content_length: config.max_content_length,
            max_num_questions: config.max_num_questions.max(1),
            retrieve_step: retrieve_context_step(),
            generate_step: generate_questions_step(),
        }
    }

    pub fn with_steps(mut self, retrieve_step: GenerationStep, generate_step: GenerationStep) -> Self {
        self.retrieve_step = retrieve_step;
        self.generate_step = generate_step;
        self
    }

    pub fn model_id(&self) -> String {
        self.model.model_id()
    }

    /// Generates a quiz without saving it.
    pub async fn generate(&self, request: &GenerationRequest, generated_at: NaiveDateTime) -> AppResult<Quiz> {
        let topic = request.topic.trim();
        if topic.is_empty() {
            return Err(AppError::ValidationError("Topic must not be empty".to_string()));
        }

        let num_questions = request.num_questions.clamp(1, self.max_num_questions);
        if num_questions != request.num_questions {
            log::warn!(
                "Requested {} questions, generating {} instead",
                request.num_questions,
                num_questions
            );
        }
        let num_chunks = request.num_chunks.max(1);

        let chunks = self
            .retrieve_step
            .run(|| self.retriever.retrieve(topic, num_chunks))
            .await?;
        if chunks.is_empty() {
            return Err(AppError::NotFound(format!(
                "No relevant content found for '{}'",
                topic
            )));
        }

        let (context, truncated) = truncate_content(&combine_chunks(&chunks), self.max_content_length);
        if truncated {
            log::info!("Context truncated to {} characters", self.max_content_length);
        }

        let prompt = build_mcq_prompt(&context, num_questions);
        log::info!("Generating {} MCQs for '{}'", num_questions, topic);

        let response = self.generate_step.run(|| self.model.complete(&prompt)).await?;
        if response.trim().is_empty() {
            return Err(AppError::UpstreamFailure(format!(
                "Model {} returned an empty response",
                self.model.model_id()
            )));
        }

        let parsed = parse_mcqs(&response);
        if parsed.is_empty() {
            return Err(AppError::MalformedQuiz(
                "No questions could be parsed from the model response".to_string(),
            ));
        }
        if parsed.len() < num_questions {
            log::warn!("Model produced {} of {} requested questions", parsed.len(), num_questions);
        }

        let file = QuizFileDto {
            metadata: QuizMetadata {
                query: Some(topic.to_string()),
                total_questions: Some(parsed.len()),
                generated_at: Some(generated_at),
                model: Some(self.model.model_id()),
                source_chunks: Some(chunks.len()),
            },
            questions: parsed,
        };

        file.into_quiz(&quiz_id_for(topic, generated_at))
    }

    pub async fn generate_and_save(&self, request: &GenerationRequest) -> AppResult<Quiz> {
        self.generate_and_save_at(request, chrono::Local::now().naive_local())
            .await
    }

    /// Like [`generate_and_save`](Self::generate_and_save), but never replaces
    /// an existing quiz: a taken id gets a `_2`, `_3`, ... suffix.
    pub async fn generate_and_save_at(
        &self,
        request: &GenerationRequest,
        generated_at: NaiveDateTime,
    ) -> AppResult<Quiz> {
        let mut quiz = self.generate(request, generated_at).await?;
        quiz.id = self.unused_quiz_id(&quiz.id).await?;
        self.quiz_repository.save_quiz(&quiz).await?;
        log::info!("Saved {} questions to {}", quiz.len(), quiz.id);
        Ok(quiz)
    }

    async fn unused_quiz_id(&self, id: &str) -> AppResult<String> {
        let stem = id.strip_suffix(QUIZ_FILE_SUFFIX).unwrap_or(id);
        let stem = stem.strip_prefix(QUIZ_FILE_PREFIX).unwrap_or(stem);

        let mut candidate = id.to_string();
        let mut attempt = 1;
        loop {
            match self.quiz_repository.load_quiz(&candidate).await {
                Err(AppError::NotFound(_)) => return Ok(candidate),
                Ok(_) | Err(AppError::MalformedQuiz(_)) => {
                    attempt += 1;
                    candidate = format!("{}{}_{}{}", QUIZ_FILE_PREFIX, stem, attempt, QUIZ_FILE_SUFFIX);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
