use std::{sync::Arc, time::Duration};

use actix_web::{middleware::Logger, web, App, HttpServer};
use quiz_smith::{
    app_state::AppState, config::Config, handlers, middleware::SessionMiddleware,
};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    log::info!("Serving quizzes from {}", config.quiz_dir.display());
    let state = Arc::new(AppState::new(config));

    let session_store = state.session_store.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = session_store.purge_expired().await;
            if purged > 0 {
                log::debug!("Purged {} expired sessions", purged);
            }
        }
    });

    log::info!("Starting HTTP server on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(SessionMiddleware::from_config(&state.config))
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
