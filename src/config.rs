use std::{env, path::PathBuf};

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub quiz_dir: PathBuf,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub session_cookie_name: String,
    pub session_cookie_secure: bool,
    pub session_ttl_minutes: i64,
    pub llm_api_base: String,
    pub llm_api_key: SecretString,
    pub llm_model: String,
    pub retriever_url: String,
    pub max_content_length: usize,
    pub default_num_questions: usize,
    pub max_num_questions: usize,
    pub default_num_chunks: usize,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            quiz_dir: PathBuf::from(env_or("QUIZ_DIR", ".")),
            web_server_host: env_or("WEB_SERVER_HOST", "127.0.0.1"),
            web_server_port: env_parse_or("WEB_SERVER_PORT", 5000),
            session_cookie_name: env_or("SESSION_COOKIE_NAME", "quiz_session"),
            session_cookie_secure: env_parse_or("SESSION_COOKIE_SECURE", false),
            session_ttl_minutes: env_parse_or("SESSION_TTL_MINUTES", 120),
            llm_api_base: env_or("LLM_API_BASE", "https://router.huggingface.co/v1"),
            llm_api_key: SecretString::from(env_or("HF_LLM_API_KEY", "")),
            llm_model: env_or("LLM_MODEL", "Qwen/Qwen3-14B"),
            retriever_url: env_or("RETRIEVER_URL", "http://localhost:8000"),
            max_content_length: env_parse_or("MAX_CONTENT_LENGTH", 3000),
            default_num_questions: env_parse_or("DEFAULT_NUM_QUESTIONS", 5),
            max_num_questions: env_parse_or("MAX_NUM_QUESTIONS", 10),
            default_num_chunks: env_parse_or("DEFAULT_NUM_CHUNKS", 8),
        }
    }

    /// The generator cannot run without an inference key.
    pub fn validate_for_generation(&self) -> AppResult<()> {
        if self.llm_api_key.expose_secret().trim().is_empty() {
            return Err(AppError::ValidationError(
                "HF_LLM_API_KEY is not set. Add it to the environment or the .env file".to_string(),
            ));
        }

        if self.max_num_questions == 0 {
            return Err(AppError::ValidationError(
                "MAX_NUM_QUESTIONS must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn test_config() -> Self {
        Self {
            quiz_dir: env::temp_dir(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 5000,
            session_cookie_name: "quiz_session".to_string(),
            session_cookie_secure: false,
            session_ttl_minutes: 30,
            llm_api_base: "http://localhost:9999/v1".to_string(),
            llm_api_key: SecretString::from("test_llm_key".to_string()),
            llm_model: "test-model".to_string(),
            retriever_url: "http://localhost:9998".to_string(),
            max_content_length: 3000,
            default_num_questions: 5,
            max_num_questions: 10,
            default_num_chunks: 8,
        }
    }
}
