//! Course and product purchases.
//!
//! Both tables share one shape: the purchased item, the buyer's email, an
//! optional account (guest checkouts have none until the buyer registers) and
//! the payment provider's checkout session id, which is unique per table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, Page, error::DatabaseResult};
use crate::web::AuthenticatedUser;

#[derive(Debug, Clone)]
pub struct PurchaseCreate {
    pub item_id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub payment_session_id: String,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CoursePurchase {
    id: Uuid,
    course_id: Uuid,
    user_id: Option<Uuid>,
    email: String,
    payment_session_id: String,
    amount_cents: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ProductPurchase {
    id: Uuid,
    product_id: Uuid,
    user_id: Option<Uuid>,
    email: String,
    payment_session_id: String,
    amount_cents: i64,
    created_at: DateTime<Utc>,
}

macro_rules! impl_purchase_repository {
    ($ent:ident, $table:literal, $item_col:literal, $item:ident, $resource:ident) => {
        impl ResourceTyped for $ent {
            fn get_resource_type() -> crate::model::ResourceType {
                crate::model::ResourceType::$resource
            }
        }

        impl $ent {
            pub fn id(&self) -> Uuid {
                self.id
            }

            pub fn item_id(&self) -> Uuid {
                self.$item
            }

            pub fn user_id(&self) -> Option<Uuid> {
                self.user_id
            }

            pub fn email(&self) -> &str {
                &self.email
            }

            pub fn payment_session_id(&self) -> &str {
                &self.payment_session_id
            }

            pub fn amount_cents(&self) -> i64 {
                self.amount_cents
            }

            pub async fn find_by_session(
                mm: &ModelManager,
                _actor: &AuthenticatedUser,
                session_id: &str,
            ) -> DatabaseResult<Option<Self>> {
                let row = sqlx::query_as(concat!(
                    "SELECT * FROM ",
                    $table,
                    " WHERE payment_session_id = $1"
                ))
                .bind(session_id)
                .fetch_optional(mm.executor())
                .await?;
                Ok(row)
            }

            /// Inserts the purchase unless one already exists for the session id,
            /// `None` means the session was already recorded.
            pub async fn create_once(
                mm: &ModelManager,
                _actor: &AuthenticatedUser,
                data: PurchaseCreate,
            ) -> DatabaseResult<Option<Self>> {
                let row = sqlx::query_as(concat!(
                    "INSERT INTO ",
                    $table,
                    " (id, ",
                    $item_col,
                    ", user_id, email, payment_session_id, amount_cents) VALUES ($1,$2,$3,$4,$5,$6) ",
                    "ON CONFLICT (payment_session_id) DO NOTHING RETURNING *"
                ))
                .bind(Uuid::new_v4())
                .bind(data.item_id)
                .bind(data.user_id)
                .bind(&data.email)
                .bind(&data.payment_session_id)
                .bind(data.amount_cents)
                .fetch_optional(mm.executor())
                .await?;
                Ok(row)
            }

            pub async fn user_owns(
                mm: &ModelManager,
                _actor: &AuthenticatedUser,
                user_id: Uuid,
                item_id: Uuid,
            ) -> DatabaseResult<bool> {
                let owns: bool = sqlx::query_scalar(concat!(
                    "SELECT EXISTS (SELECT 1 FROM ",
                    $table,
                    " WHERE user_id = $1 AND ",
                    $item_col,
                    " = $2)"
                ))
                .bind(user_id)
                .bind(item_id)
                .fetch_one(mm.executor())
                .await?;
                Ok(owns)
            }

            /// Attaches guest purchases made with `email` to the account.
            pub async fn claim_by_email(
                mm: &ModelManager,
                _actor: &AuthenticatedUser,
                user_id: Uuid,
                email: &str,
            ) -> DatabaseResult<u64> {
                let result = sqlx::query(concat!(
                    "UPDATE ",
                    $table,
                    " SET user_id = $1 WHERE user_id IS NULL AND lower(email) = lower($2)"
                ))
                .bind(user_id)
                .bind(email)
                .execute(mm.executor())
                .await?;
                Ok(result.rows_affected())
            }

            pub async fn page(
                mm: &ModelManager,
                _actor: &AuthenticatedUser,
                limit: i64,
                offset: i64,
            ) -> DatabaseResult<Page<Self>> {
                let items = sqlx::query_as::<_, Self>(concat!(
                    "SELECT * FROM ",
                    $table,
                    " ORDER BY created_at DESC LIMIT $1 OFFSET $2"
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(mm.executor());

                let total = sqlx::query_scalar::<_, i64>(concat!("SELECT COUNT(*) FROM ", $table))
                    .fetch_one(mm.executor());

                let (items, total) = tokio::try_join!(items, total)?;
                Ok(Page::new(items, total, limit, offset))
            }
        }
    };
}

impl_purchase_repository!(CoursePurchase, "course_purchases", "course_id", course_id, CoursePurchase);
impl_purchase_repository!(
    ProductPurchase,
    "product_purchases",
    "product_id",
    product_id,
    ProductPurchase
);

/// Attaches every guest purchase made with `email` to `user_id`.
pub async fn claim_guest_purchases(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    user_id: Uuid,
    email: &str,
) -> DatabaseResult<u64> {
    let (courses, products) = tokio::try_join!(
        CoursePurchase::claim_by_email(mm, actor, user_id, email),
        ProductPurchase::claim_by_email(mm, actor, user_id, email),
    )?;
    Ok(courses + products)
}
