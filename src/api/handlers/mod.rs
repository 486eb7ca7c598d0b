// src/api/handlers/mod.rs
mod health;
mod progress;
mod sessions;
mod test_cases;

pub use health::health_check;
pub use progress::save_video_progress;
pub use sessions::{create_session, delete_session, reset_session, run_session, session_results};
pub use test_cases::execute_test_case;

use actix_web::HttpResponse;
use crate::errors::RunnerError;
use crate::models::ApiError;

/// Maps a runner error onto the JSON error body and status the API uses.
pub(crate) fn error_response(e: &RunnerError) -> HttpResponse {
    let mut body = ApiError::new(e.to_string());

    match e {
        RunnerError::Validation(_)
        | RunnerError::UnsupportedLanguage(_)
        | RunnerError::JsonParse(_) => HttpResponse::BadRequest().json(body),
        RunnerError::SessionNotFound(_) => HttpResponse::NotFound().json(body),
        RunnerError::Execution(error) => {
            body.error = serde_json::to_value(error).ok();
            HttpResponse::UnprocessableEntity().json(body)
        }
        RunnerError::StaleRun { .. } | RunnerError::Busy => HttpResponse::Conflict().json(body),
        RunnerError::Request(_)
        | RunnerError::ApiError { .. }
        | RunnerError::ApiResponse(_)
        | RunnerError::UnexpectedResponse(_) => HttpResponse::BadGateway().json(body),
        RunnerError::Io(_) | RunnerError::TomlParse(_) | RunnerError::Config(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}
