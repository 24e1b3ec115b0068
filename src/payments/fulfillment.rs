//! Turns provider webhook events into purchase rows.

use serde::Serialize;
use uuid::Uuid;

use crate::model::entity::{
    Course, CoursePurchase, DigitalProduct, ProductPurchase, PurchaseCreate, UserEntity,
    normalize_email,
};
use crate::model::{CrudRepository, ModelManager};
use crate::payments::{
    PaymentError, PaymentResult,
    event::{CheckoutSessionObject, PurchaseKind, WebhookEvent},
};
use crate::web::AuthenticatedUser;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FulfillmentOutcome {
    Recorded { purchase_id: Uuid },
    /// The session was already fulfilled by an earlier delivery.
    Duplicate,
    /// Event type or session state that needs no action.
    Ignored,
}

#[tracing::instrument(skip(mm, event), fields(event_id = %event.id, event_type = %event.event_type))]
pub async fn handle_event(mm: &ModelManager, event: &WebhookEvent) -> PaymentResult<FulfillmentOutcome> {
    if !event.is_checkout_completed() {
        tracing::debug!("ignoring webhook event");
        return Ok(FulfillmentOutcome::Ignored);
    }

    let session = event.checkout_session()?;
    if session.is_unpaid() {
        tracing::info!(session_id = %session.id, "checkout completed without payment, skipping");
        return Ok(FulfillmentOutcome::Ignored);
    }

    fulfill_checkout(mm, &session).await
}

/// Records the purchase for a completed checkout session at most once.
pub async fn fulfill_checkout(
    mm: &ModelManager,
    session: &CheckoutSessionObject,
) -> PaymentResult<FulfillmentOutcome> {
    let system = AuthenticatedUser::admin();
    let target = session.target()?;

    let email = session
        .email()
        .map(normalize_email)
        .ok_or_else(|| PaymentError::InvalidMetadata {
            session_id: session.id.clone(),
            reason: String::from("no customer email"),
        })?;

    let already_recorded = match target.kind {
        PurchaseKind::Course => CoursePurchase::find_by_session(mm, &system, &session.id)
            .await?
            .is_some(),
        PurchaseKind::Product => ProductPurchase::find_by_session(mm, &system, &session.id)
            .await?
            .is_some(),
    };
    if already_recorded {
        tracing::info!(session_id = %session.id, "duplicate checkout session, skipping");
        return Ok(FulfillmentOutcome::Duplicate);
    }

    let price_cents = match target.kind {
        PurchaseKind::Course => Course::find_by_id(mm, &system, target.item_id)
            .await?
            .map(|course| course.price_cents()),
        PurchaseKind::Product => DigitalProduct::find_by_id(mm, &system, target.item_id)
            .await?
            .map(|product| product.price_cents()),
    }
    .ok_or_else(|| PaymentError::UnknownItem {
        session_id: session.id.clone(),
        item_id: target.item_id,
    })?;

    let user_id = match target.user_id {
        Some(id) => UserEntity::find_by_id(mm, &system, id).await?.map(|u| u.id()),
        None => None,
    };
    let user_id = match user_id {
        Some(id) => Some(id),
        None => UserEntity::find_by_email(mm, &system, &email)
            .await?
            .map(|u| u.id()),
    };

    let data = PurchaseCreate {
        item_id: target.item_id,
        user_id,
        email,
        payment_session_id: session.id.clone(),
        amount_cents: session.amount_total.unwrap_or(price_cents),
    };

    // a concurrent delivery may win between the lookup and the insert
    let purchase_id = match target.kind {
        PurchaseKind::Course => CoursePurchase::create_once(mm, &system, data)
            .await?
            .map(|p| p.id()),
        PurchaseKind::Product => ProductPurchase::create_once(mm, &system, data)
            .await?
            .map(|p| p.id()),
    };

    match purchase_id {
        Some(purchase_id) => {
            tracing::info!(
                session_id = %session.id,
                kind = %target.kind,
                item_id = %target.item_id,
                linked = user_id.is_some(),
                "purchase recorded"
            );
            Ok(FulfillmentOutcome::Recorded { purchase_id })
        }
        None => Ok(FulfillmentOutcome::Duplicate),
    }
}
