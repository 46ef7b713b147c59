use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use crate::{
    config::Config,
    constants::quiz_prompt::CONNECTION_CHECK_PROMPT,
    errors::{AppError, AppResult},
};

/// Remote text generation: one prompt in, free-form text out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
    fn model_id(&self) -> String;
}

/// Chat-completions client for any OpenAI-compatible inference endpoint.
pub struct OpenAiCompletionModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompletionModel {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(config.llm_api_base.as_str())
            .with_api_key(config.llm_api_key.expose_secret());

        Self {
            client: Client::with_config(openai_config),
            model: config.llm_model.clone(),
        }
    }
}

/// Pulls `choices[0].message.content` out of a chat-completions response.
pub fn extract_message_content(response: &Value) -> Option<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl CompletionModel for OpenAiCompletionModel {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let request = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        let response: Value = self.client.chat().create_byot(request).await?;

        extract_message_content(&response)
            .ok_or_else(|| {
                AppError::UpstreamFailure(format!(
                    "Model {} returned no message content",
                    self.model
                ))
            })
    }

    fn model_id(&self) -> String {
        self.model.clone()
    }
}

/// Sends a trivial prompt and fails unless the model answers with some text.
pub async fn check_connection(model: &dyn CompletionModel) -> AppResult<String> {
    log::info!("Testing inference API with model {}", model.model_id());

    let reply = model.complete(CONNECTION_CHECK_PROMPT).await.map_err(|e| {
        log::error!("Inference API check failed: {}", e);
        e
    })?;

    if reply.trim().is_empty() {
        return Err(AppError::UpstreamFailure(format!(
            "Model {} returned an empty response",
            model.model_id()
        )));
    }

    log::info!(
        "Inference API is working ({} characters in test response)",
        reply.len()
    );
    Ok(reply)
}
