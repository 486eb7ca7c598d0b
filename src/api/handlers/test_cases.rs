// src/api/handlers/test_cases.rs
use actix_web::{web, HttpResponse, Result};
use crate::api::AppState;
use crate::api::handlers::error_response;
use crate::models::{ExecuteTestCaseRequest, ExecuteTestCaseResponse};
use crate::runner;

pub async fn execute_test_case(
    state: web::Data<AppState>,
    req: web::Json<ExecuteTestCaseRequest>,
) -> Result<HttpResponse> {
    let request = req.into_inner();

    match runner::run_test_cases(state.judge.as_ref(), &state.config.harness, &request).await {
        Ok(outcome) => {
            let message = if outcome.passed {
                "All test cases passed"
            } else {
                "Some test cases failed"
            };
            Ok(HttpResponse::Ok().json(ExecuteTestCaseResponse {
                message: message.to_string(),
                data: outcome,
            }))
        }
        Err(e) => {
            log::error!("execute-test-case for '{}' failed: {}", request.function_name, e);
            Ok(error_response(&e))
        }
    }
}
