use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, async_trait};
use serde_json::json;
use thiserror::Error;

use casebook_core::error::CoreError;
use casebook_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] casebook_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Maps the error onto a response status and JSON payload.
    fn status_and_body(&self) -> (StatusCode, serde_json::Value) {
        match self {
            Self::ServiceError(service) => service_status_and_body(service),
            Self::CoreError(core) => core_status_and_body(core),
            Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal server error" }),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
        }
    }
}

fn service_status_and_body(error: &ServiceError) -> (StatusCode, serde_json::Value) {
    match error {
        ServiceError::CoreError(core) => core_status_and_body(core),
        ServiceError::NotFound(message) => {
            (StatusCode::NOT_FOUND, json!({ "error": message }))
        }
        ServiceError::Conflict(message) => {
            (StatusCode::CONFLICT, json!({ "error": message }))
        }
        ServiceError::AuthorizationError(message) => {
            (StatusCode::FORBIDDEN, json!({ "error": message }))
        }
        ServiceError::DatabaseError(_)
        | ServiceError::DieselError(_)
        | ServiceError::InvariantViolation(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "internal server error" }),
        ),
    }
}

fn core_status_and_body(error: &CoreError) -> (StatusCode, serde_json::Value) {
    match error {
        CoreError::Validation(validation) => (
            StatusCode::BAD_REQUEST,
            json!({
                "error": validation.to_string(),
                "violations": validation.violations,
            }),
        ),
        CoreError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
        CoreError::IllegalTransition { .. } | CoreError::Conflict(_) => {
            (StatusCode::CONFLICT, json!({ "error": error.to_string() }))
        }
        CoreError::InvalidConfiguration(_) | CoreError::InvariantViolation(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "internal server error" }),
        ),
    }
}

#[async_trait]
impl salvo::Writer for AppError {
    async fn write(mut self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        res.status_code(status);
        res.render(Json(body));
    }
}
