pub mod payment;
pub mod subscription;

use axum::Router;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::jwt,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/payments", payment::router())
        .nest("/subscriptions", subscription::router())
}

/// Resolves the caller from the `Authorization: Bearer <token>` header.
pub fn current_user_id(headers: &HeaderMap, app_state: &AppState) -> AppResult<Uuid> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidCredentials)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidCredentials)?;
    jwt::verify(token, &app_state.config.jwt_secret)
}
