use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const ERR_DATABASE: &str = "Database error";
pub const ERR_INVALID_PAYLOAD: &str = "Invalid request payload";
pub const ERR_USER_NOT_FOUND: &str = "User not found";
pub const ERR_CREATE_USER: &str = "Failed to create user";
pub const ERR_UPDATE_USER: &str = "Failed to update user";
pub const ERR_DELETE_USER: &str = "Failed to delete user";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// Absent or unparsable id. Answered with an empty body.
    #[error("not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    /// Storage refused the new user, e.g. a uniqueness constraint.
    #[error("Failed to create user: {0:#}")]
    CreateRejected(anyhow::Error),

    #[error("{message}: {cause:#}")]
    Storage {
        message: &'static str,
        cause: anyhow::Error,
    },

    #[error("DB Connection Error: {0:#}")]
    Unavailable(anyhow::Error),
}

impl ApiError {
    pub fn storage(message: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| ApiError::Storage { message, cause }
    }
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidPayload(_) => json_error(StatusCode::BAD_REQUEST, ERR_INVALID_PAYLOAD),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::UserNotFound => json_error(StatusCode::NOT_FOUND, ERR_USER_NOT_FOUND),
            ApiError::CreateRejected(_) => json_error(StatusCode::BAD_REQUEST, ERR_CREATE_USER),
            // raw storage errors stay in the log
            ApiError::Storage { message, cause } => {
                error!(error = ?cause, "{}", message);
                json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            ApiError::Unavailable(err) => {
                let body = format!("DB Connection Error: {:#}", err);
                (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
            }
        }
    }
}
