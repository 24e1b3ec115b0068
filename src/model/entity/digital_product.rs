use crate::model::repo::ResourceTyped;
use crate::model::validators::validate_slug;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Downloadable product, e.g. an e-book or a template pack.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct DigitalProduct {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
    price_cents: i64,
    /// Only ever shown to owners, see the download route.
    #[serde(skip)]
    file_url: String,
    image_url: Option<String>,
    published: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct DigitalProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[validate(length(min = 1))]
    pub file_url: String,
    #[validate(url)]
    pub image_url: Option<String>,
    pub published: Option<bool>,
}

impl ResourceTyped for DigitalProduct {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::DigitalProduct
    }
}

impl DigitalProduct {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    pub fn file_url(&self) -> &str {
        &self.file_url
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn published(&self) -> bool {
        self.published
    }
}

#[async_trait]
impl CrudRepository<DigitalProductCreate> for DigitalProduct {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: DigitalProductCreate,
    ) -> DatabaseResult<Self> {
        let product = sqlx::query_as(
            r#"
            INSERT INTO digital_products (id, title, slug, description, price_cents, file_url, image_url, published)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(data.price_cents)
        .bind(&data.file_url)
        .bind(&data.image_url)
        .bind(data.published.unwrap_or(false))
        .fetch_one(mm.executor())
        .await?;

        Ok(product)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: DigitalProductCreate,
    ) -> DatabaseResult<Self> {
        let published = data.published.unwrap_or(self.published);
        sqlx::query(
            r#"
            UPDATE digital_products
            SET title = $1, slug = $2, description = $3, price_cents = $4, file_url = $5, image_url = $6, published = $7
            WHERE id = $8
            "#,
        )
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(data.price_cents)
        .bind(&data.file_url)
        .bind(&data.image_url)
        .bind(published)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.title = data.title;
        self.slug = data.slug;
        self.description = data.description;
        self.price_cents = data.price_cents;
        self.file_url = data.file_url;
        self.image_url = data.image_url;
        self.published = published;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM digital_products WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM digital_products WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM digital_products ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM digital_products")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}


impl DigitalProduct {
    pub async fn list_published(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM digital_products WHERE published ORDER BY created_at DESC",
        )
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn find_published_by_slug(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        slug: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM digital_products WHERE slug = $1 AND published")
            .bind(slug)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}
