use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};

use crate::{
    payments::{PaymentError, fulfillment, signature::SIGNATURE_HEADER},
    web::{AppState, WebError, WebResult, dto::commerce::WebhookAck, error::ErrorResponse},
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/payments", post(webhooks_payments_handler))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/webhooks/payments",
    description = "Payment provider events. The raw body is verified against the signature header",
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 400, description = "Bad signature, payload or metadata", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "webhooks"
)]
async fn webhooks_payments_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebResult<impl IntoResponse> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| WebError::server_payment_error(PaymentError::SignatureHeaderMalformed))?;

    let event = state
        .payments()
        .construct_event(&body, header)
        .map_err(|e| {
            tracing::warn!(error = %e, "rejected webhook delivery");
            WebError::server_payment_error(e)
        })?;

    let outcome = fulfillment::handle_event(state.pool(), &event)
        .await
        .map_err(WebError::server_payment_error)?;

    Ok((StatusCode::OK, Json(WebhookAck::from(outcome))))
}
