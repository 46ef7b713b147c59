pub mod generation_service;
pub mod generation_steps;
pub mod mcq_parser;
pub mod model_service;
pub mod quiz_session_service;
pub mod retrieval_service;
pub mod terminal_quiz;
