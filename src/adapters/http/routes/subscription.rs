use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, routes::current_user_id},
    app_error::AppResult,
    application::use_cases::subscription::{CreateSubscriptionInput, SubscriptionProfile},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_subscription))
        .route("/my", get(my_subscriptions))
        .route("/{id}", get(get_subscription).delete(delete_subscription))
        .route("/{id}/pause", post(pause_subscription))
        .route("/{id}/resume", post(resume_subscription))
        .route("/{id}/cancel", post(cancel_subscription))
        .route("/{id}/activate", post(activate_subscription))
}

async fn create_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateSubscriptionInput>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    let profile = app_state
        .subscription_use_cases
        .create_subscription(user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn my_subscriptions(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    let subscriptions: Vec<SubscriptionProfile> = app_state
        .subscription_use_cases
        .list_user_subscriptions(user_id)
        .await?;
    Ok(Json(subscriptions))
}

async fn get_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    let profile = app_state
        .subscription_use_cases
        .get_subscription(id, user_id)
        .await?;
    Ok(Json(profile))
}

async fn pause_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    let profile = app_state
        .subscription_use_cases
        .pause_subscription(id, user_id)
        .await?;
    Ok(Json(profile))
}

async fn resume_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    let profile = app_state
        .subscription_use_cases
        .resume_subscription(id, user_id)
        .await?;
    Ok(Json(profile))
}

async fn cancel_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    let profile = app_state
        .subscription_use_cases
        .cancel_subscription(id, user_id)
        .await?;
    Ok(Json(profile))
}

async fn activate_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    let profile = app_state
        .subscription_use_cases
        .activate_subscription(id, user_id)
        .await?;
    Ok(Json(profile))
}

async fn delete_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    app_state
        .subscription_use_cases
        .delete_subscription(id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
