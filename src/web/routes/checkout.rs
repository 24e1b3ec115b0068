use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use validator::Validate;

use crate::{
    Config,
    model::{
        CrudRepository, ResourceType, ResourceTyped,
        entity::{Course, CoursePurchase, DigitalProduct, UserEntity, normalize_email},
    },
    payments::{CheckoutRequest, CheckoutSession, PurchaseKind},
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::commerce::CheckoutBody, error::ErrorResponse,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(checkout_handler))
        .with_state(state)
}

/// What is being sold: the priced, published item with its storefront path.
struct Offer {
    title: String,
    amount_cents: i64,
    path: String,
}

async fn find_offer(state: &AppState, body: &CheckoutBody) -> WebResult<Offer> {
    let system = AuthenticatedUser::admin();

    match body.kind {
        PurchaseKind::Course => {
            let course = Course::find_by_id(state.pool(), &system, body.item_id)
                .await
                .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
                .filter(|c| c.published())
                .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

            Ok(Offer {
                title: course.title().to_string(),
                amount_cents: course.price_cents(),
                path: format!("/courses/{}", course.slug()),
            })
        }
        PurchaseKind::Product => {
            let product = DigitalProduct::find_by_id(state.pool(), &system, body.item_id)
                .await
                .map_err(|e| WebError::resource_fetch_error(DigitalProduct::get_resource_type(), e))?
                .filter(|p| p.published())
                .ok_or_else(|| WebError::resource_not_found(DigitalProduct::get_resource_type()))?;

            Ok(Offer {
                title: product.title().to_string(),
                amount_cents: product.price_cents(),
                path: format!("/products/{}", product.slug()),
            })
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    description = "Opens a hosted checkout session for a course or product. Guests must provide an email",
    request_body = CheckoutBody,
    responses(
        (status = 200, description = "Checkout session created, redirect to `url`", body = CheckoutSession),
        (status = 400, description = "Invalid body or missing guest email", body = ErrorResponse),
        (status = 404, description = "Item not found or not published", body = ErrorResponse),
        (status = 409, description = "Course is already owned", body = ErrorResponse),
        (status = 502, description = "Payment provider failed", body = ErrorResponse),
    ),
    tag = "checkout"
)]
async fn checkout_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(body): Json<CheckoutBody>,
) -> WebResult<impl IntoResponse> {
    body.validate()?;
    let offer = find_offer(&state, &body).await?;

    let (user_id, customer_email) = match ctx.maybe_user() {
        Some(user) => {
            let account = UserEntity::find_by_id(state.pool(), user, user.user_id())
                .await
                .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
                .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

            if body.kind == PurchaseKind::Course {
                let owned = CoursePurchase::user_owns(state.pool(), user, account.id(), body.item_id)
                    .await
                    .map_err(|e| WebError::resource_fetch_error(CoursePurchase::get_resource_type(), e))?;
                if owned {
                    return Err(WebError::resource_conflict(
                        Course::get_resource_type(),
                        "course is already owned",
                    ));
                }
            }

            (Some(account.id()), account.email().to_string())
        }
        None => {
            let email = body
                .email
                .as_deref()
                .map(normalize_email)
                .filter(|email| !email.is_empty())
                .ok_or_else(|| {
                    WebError::resource_bad_request(ResourceType::Checkout, "email is required for guest checkout")
                })?;
            (None, email)
        }
    };

    let public_url = Config::get_or_init(false).await.app().public_url();
    let request = CheckoutRequest {
        kind: body.kind,
        item_id: body.item_id,
        title: offer.title,
        amount_cents: offer.amount_cents,
        customer_email,
        user_id,
        success_url: format!("{public_url}/dashboard?session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: format!("{public_url}{}", offer.path),
    };

    let session = state
        .payments()
        .create_checkout_session(request)
        .await
        .map_err(WebError::server_payment_error)?;

    tracing::info!(
        session_id = %session.id,
        kind = %body.kind,
        item_id = %body.item_id,
        guest = user_id.is_none(),
        "checkout session opened"
    );
    Ok((StatusCode::OK, Json(session)))
}
