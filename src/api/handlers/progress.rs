// src/api/handlers/progress.rs
use actix_web::{http::header, web, HttpRequest, HttpResponse, Result};
use crate::api::AppState;
use crate::models::ApiError;

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn save_video_progress(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse> {
    let Some(token) = bearer_token(&req) else {
        return Ok(HttpResponse::Unauthorized().json(ApiError::new("Missing bearer token")));
    };

    let Some(forwarder) = state.progress.as_ref() else {
        log::error!("save-video-progress called but PROGRESS_API_URL is not configured");
        return Ok(HttpResponse::ServiceUnavailable().json(ApiError::new("Progress service is not configured")));
    };

    match forwarder.forward(token, &body).await {
        Ok(()) => Ok(HttpResponse::Ok().finish()),
        Err(e) => {
            log::error!("Failed to save video progress: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                message: "Failed to save video progress".to_string(),
                error: Some(serde_json::Value::String(e.to_string())),
            }))
        }
    }
}
