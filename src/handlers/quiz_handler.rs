use std::sync::Arc;

use actix_web::{get, http::header, post, route, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::SessionId,
    models::{
        domain::SessionPhase,
        dto::request::{AnswerForm, StartQuizForm},
    },
    views,
};

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn html(markup: maud::Markup) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(header::ContentType::html())
        .body(markup.into_string())
}

fn redirect_for(phase: SessionPhase) -> HttpResponse {
    match phase {
        SessionPhase::Idle => see_other("/"),
        SessionPhase::InProgress => see_other("/question"),
        SessionPhase::Completed => see_other("/results"),
    }
}

#[get("/")]
pub async fn index(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let quizzes = state
        .session_service
        .quiz_repository()
        .list_available_quizzes()
        .await?;
    Ok(html(views::index_page(&quizzes)))
}

#[post("/start")]
pub async fn start_quiz(
    state: web::Data<Arc<AppState>>,
    session: SessionId,
    form: web::Form<StartQuizForm>,
) -> Result<HttpResponse, AppError> {
    form.validate()?;
    state
        .session_service
        .start(session.as_str(), form.quiz.trim())
        .await?;
    Ok(see_other("/question"))
}

#[get("/quiz/{quiz_id}")]
pub async fn start_quiz_by_id(
    state: web::Data<Arc<AppState>>,
    session: SessionId,
    quiz_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state
        .session_service
        .start(session.as_str(), &quiz_id)
        .await?;
    Ok(see_other("/question"))
}

#[get("/question")]
pub async fn show_question(
    state: web::Data<Arc<AppState>>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    let quiz_session = state.session_service.load(session.as_str()).await?;

    match quiz_session.phase() {
        SessionPhase::InProgress => {
            let view = views::QuestionView::from_session(&quiz_session)?;
            Ok(html(views::question_page(&view)))
        }
        phase => Ok(redirect_for(phase)),
    }
}

#[post("/answer")]
pub async fn submit_answer(
    state: web::Data<Arc<AppState>>,
    session: SessionId,
    form: web::Form<AnswerForm>,
) -> Result<HttpResponse, AppError> {
    form.validate()?;
    let AnswerForm { position, choice } = form.into_inner();

    let (_, phase) = state
        .session_service
        .update(session.as_str(), |quiz_session| {
            quiz_session.submit_answer(position, &choice)?;
            quiz_session.advance()
        })
        .await?;

    Ok(redirect_for(phase))
}

#[post("/next")]
pub async fn next_question(
    state: web::Data<Arc<AppState>>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    let (_, phase) = state
        .session_service
        .update(session.as_str(), |quiz_session| quiz_session.advance())
        .await?;
    Ok(redirect_for(phase))
}

#[post("/previous")]
pub async fn previous_question(
    state: web::Data<Arc<AppState>>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    state
        .session_service
        .update(session.as_str(), |quiz_session| quiz_session.retreat())
        .await?;
    Ok(see_other("/question"))
}

#[post("/finish")]
pub async fn finish_quiz(
    state: web::Data<Arc<AppState>>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    state
        .session_service
        .update(session.as_str(), |quiz_session| quiz_session.finish())
        .await?;
    Ok(see_other("/results"))
}

#[get("/results")]
pub async fn show_results(
    state: web::Data<Arc<AppState>>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    let quiz_session = state.session_service.load(session.as_str()).await?;

    match quiz_session.phase() {
        SessionPhase::Completed => Ok(html(views::results_page(&quiz_session.results()?))),
        phase => Ok(redirect_for(phase)),
    }
}

#[route("/reset", method = "GET", method = "POST")]
pub async fn reset_quiz(
    state: web::Data<Arc<AppState>>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    state.session_service.reset(session.as_str()).await?;
    Ok(see_other("/"))
}

#[get("/api/quiz_progress")]
pub async fn quiz_progress(state: web::Data<Arc<AppState>>, session: SessionId) -> HttpResponse {
    let progress = match state.session_service.load(session.as_str()).await {
        Ok(quiz_session) if quiz_session.phase() == SessionPhase::Idle => Err(
            AppError::ValidationError("No active quiz".to_string()),
        ),
        Ok(quiz_session) => quiz_session.progress(),
        Err(e) => Err(e),
    };

    match progress {
        Ok(progress) => HttpResponse::Ok().json(progress),
        Err(e) => e.json_response(),
    }
}
