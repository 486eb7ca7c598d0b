// src/api/routes.rs
use actix_web::web;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health_check))
            .route("/execute-test-case", web::post().to(handlers::execute_test_case))
            .route("/save-video-progress", web::post().to(handlers::save_video_progress))
            .service(
                web::scope("/sessions")
                    .route("", web::post().to(handlers::create_session))
                    .route("/{id}", web::delete().to(handlers::delete_session))
                    .route("/{id}/run", web::post().to(handlers::run_session))
                    .route("/{id}/reset", web::post().to(handlers::reset_session))
                    .route("/{id}/results", web::get().to(handlers::session_results))
            )
    );
}
