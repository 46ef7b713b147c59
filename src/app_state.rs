use std::sync::Arc;

use crate::{
    config::Config,
    repositories::{FsQuizRepository, InMemorySessionStore, QuizRepository},
    services::quiz_session_service::QuizSessionService,
};

#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<QuizSessionService>,
    pub session_store: Arc<InMemorySessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let quiz_repository = Arc::new(FsQuizRepository::new(config.quiz_dir.clone()));
        Self::with_quiz_repository(config, quiz_repository)
    }

    pub fn with_quiz_repository(config: Config, quiz_repository: Arc<dyn QuizRepository>) -> Self {
        let session_store = Arc::new(InMemorySessionStore::new(config.session_ttl_minutes));
        let session_service = Arc::new(QuizSessionService::new(
            quiz_repository,
            session_store.clone(),
        ));

        Self {
            session_service,
            session_store,
            config: Arc::new(config),
        }
    }
}
