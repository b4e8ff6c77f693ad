use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::Database(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError, None)
            }
            AppError::NotFound(what) => error_resp(
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                Some(format!("{what} not found")),
            ),
            AppError::BusinessRule(msg) => {
                error_resp(StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::BusinessRule, Some(msg))
            }
            AppError::PaymentDeclined(msg) => error_resp(
                StatusCode::PAYMENT_REQUIRED,
                ErrorCode::PaymentDeclined,
                Some(format!("Payment processing failed: {msg}")),
            ),
            AppError::Forbidden(msg) => {
                error_resp(StatusCode::FORBIDDEN, ErrorCode::Forbidden, Some(msg))
            }
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, Some(msg))
            }
            AppError::InvalidCredentials => {
                error_resp(StatusCode::UNAUTHORIZED, ErrorCode::InvalidCredentials, None)
            }
            AppError::Internal(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError, None)
            }
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
