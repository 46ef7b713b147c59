use actix_web::web;

use crate::errors::AppError;

pub mod health_handler;
pub mod quiz_handler;

pub use health_handler::health_check;
pub use quiz_handler::{
    finish_quiz, index, next_question, previous_question, quiz_progress, reset_quiz,
    show_question, show_results, start_quiz, start_quiz_by_id, submit_answer,
};

/// Registers every route on an `App` or scope. Undecodable form bodies
/// render through the same error page as every other `AppError`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(err.to_string()).into()
    }))
    .service(health_check)
        .service(index)
        .service(start_quiz)
        .service(start_quiz_by_id)
        .service(show_question)
        .service(submit_answer)
        .service(next_question)
        .service(previous_question)
        .service(finish_quiz)
        .service(show_results)
        .service(reset_quiz)
        .service(quiz_progress);
}
