// src/api/handlers/sessions.rs
use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use serde_json::json;
use crate::api::AppState;
use crate::api::handlers::error_response;
use crate::models::ApiResponse;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSessionRequest {
    pub user_code: String,
    #[serde(default)]
    pub test_code: String,
}

pub async fn create_session(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = state.sessions.create().await;
    Ok(HttpResponse::Created().json(json!({
        "id": session.id(),
        "createdAt": session.created_at().to_rfc3339(),
    })))
}

pub async fn run_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<RunSessionRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let session = match state.sessions.get(&id).await {
        Ok(session) => session,
        Err(e) => return Ok(error_response(&e)),
    };

    match session.run(&req.user_code, &req.test_code).await {
        Ok(delta) => Ok(HttpResponse::Ok().json(ApiResponse {
            message: format!("{} new results", delta.results.len()),
            data: delta,
        })),
        Err(e) => {
            log::warn!("Run in session {} failed: {}", id, e);
            Ok(error_response(&e))
        }
    }
}

pub async fn reset_session(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    match state.sessions.get(&path.into_inner()).await {
        Ok(session) => {
            session.reset().await;
            Ok(HttpResponse::NoContent().finish())
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn session_results(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    match state.sessions.get(&path.into_inner()).await {
        Ok(session) => {
            let results = session.log().await;
            Ok(HttpResponse::Ok().json(ApiResponse {
                message: format!("{} results", results.len()),
                data: results,
            }))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn delete_session(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    match state.sessions.remove(&path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(error_response(&e)),
    }
}
