use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, routes::current_user_id},
    app_error::{AppError, AppResult},
    application::use_cases::payment::{PaymentProfile, ProcessPaymentInput},
    application::validators,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/process", post(process_payment))
        .route("/my", get(my_payments))
        .route("/{id}", get(get_payment))
        .route("/subscription/{id}", get(subscription_payments))
        .route("/gateway/callback", post(gateway_callback))
}

fn validate_payment_input(input: &ProcessPaymentInput) -> AppResult<()> {
    if !validators::is_valid_bvn(&input.bvn) {
        return Err(AppError::InvalidInput(
            "BVN must be exactly 11 digits".to_string(),
        ));
    }
    if !validators::is_valid_account_number(&input.account_number) {
        return Err(AppError::InvalidInput(
            "Account number must be exactly 10 digits".to_string(),
        ));
    }
    if input.bank_name.trim().is_empty() {
        return Err(AppError::InvalidInput("Bank name is required".to_string()));
    }
    if !validators::is_valid_phone_number(&input.phone_number) {
        return Err(AppError::InvalidInput(
            "Invalid Nigerian phone number format. Use +234XXXXXXXXXX or 0XXXXXXXXXX".to_string(),
        ));
    }
    if !validators::is_valid_name(&input.first_name) || !validators::is_valid_name(&input.last_name)
    {
        return Err(AppError::InvalidInput(
            "First name and last name are required".to_string(),
        ));
    }
    Ok(())
}

async fn process_payment(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ProcessPaymentInput>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    validate_payment_input(&payload)?;

    let profile = app_state
        .payment_use_cases
        .process_payment(user_id, payload)
        .await?;
    Ok(Json(profile))
}

async fn get_payment(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    let profile = app_state
        .payment_use_cases
        .get_payment_by_id(id, user_id)
        .await?;
    Ok(Json(profile))
}

async fn my_payments(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers, &app_state)?;
    let payments: Vec<PaymentProfile> =
        app_state.payment_use_cases.get_user_payments(user_id).await?;
    Ok(Json(payments))
}

async fn subscription_payments(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    current_user_id(&headers, &app_state)?;
    let payments: Vec<PaymentProfile> = app_state
        .payment_use_cases
        .get_subscription_payments(id)
        .await?;
    Ok(Json(payments))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayCallbackPayload {
    reference: String,
    status: String,
}

/// Unauthenticated webhook from the gateway. The body is taken raw so the
/// exact bytes can be stored on the payment for audit.
async fn gateway_callback(
    State(app_state): State<AppState>,
    body: String,
) -> AppResult<impl IntoResponse> {
    let payload: GatewayCallbackPayload = serde_json::from_str(&body)
        .map_err(|e| AppError::InvalidInput(format!("Malformed callback body: {e}")))?;

    let profile = app_state
        .payment_use_cases
        .handle_gateway_callback(&payload.reference, &payload.status, &body)
        .await?;
    Ok(Json(profile))
}
