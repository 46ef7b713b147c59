use std::{future::Future, time::Duration};

use crate::errors::{AppError, AppResult};

const RETRIEVAL_TIMEOUT: u64 = 30;
const QUIZ_GENERATION_TIMEOUT: u64 = 120;

const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Retry and timeout policy for one remote call in the generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationStep {
    pub name: String,
    pub description: Option<String>,
    pub max_retries: u32,
    pub timeout_seconds: Option<u64>,
    pub retry_delay_ms: u64,
}

impl GenerationStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            max_retries: DEFAULT_RETRIES,
            timeout_seconds: None,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = delay_ms;
        self
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or `max_retries` further attempts have failed. Only upstream failures
    /// and timeouts are retried.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let result = match self.timeout_seconds {
                Some(seconds) => tokio::time::timeout(Duration::from_secs(seconds), operation())
                    .await
                    .unwrap_or_else(|_| {
                        Err(AppError::UpstreamFailure(format!(
                            "step {} timed out after {}s",
                            self.name, seconds
                        )))
                    }),
                None => operation().await,
            };

            match result {
                Ok(value) => return Ok(value),
                Err(AppError::UpstreamFailure(message)) if attempt <= self.max_retries => {
                    log::warn!(
                        "Step {} attempt {}/{} failed: {}",
                        self.name,
                        attempt,
                        self.max_retries + 1,
                        message
                    );
                    tokio::time::sleep(Duration::from_millis(
                        self.retry_delay_ms * u64::from(attempt),
                    ))
                    .await;
                }
                Err(AppError::UpstreamFailure(message)) => {
                    log::error!("Step {} gave up after {} attempts", self.name, attempt);
                    return Err(AppError::UpstreamFailure(format!(
                        "{} failed after {} attempts: {}",
                        self.name, attempt, message
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

pub fn retrieve_context_step() -> GenerationStep {
    GenerationStep::new("retrieve_context")
        .with_description("Query the vector store for chunks relevant to the topic")
        .with_max_retries(DEFAULT_RETRIES)
        .with_timeout(RETRIEVAL_TIMEOUT)
}

pub fn generate_questions_step() -> GenerationStep {
    GenerationStep::new("generate_questions")
        .with_description("Prompt the inference API for multiple-choice questions")
        .with_max_retries(DEFAULT_RETRIES)
        .with_timeout(QUIZ_GENERATION_TIMEOUT)
}
