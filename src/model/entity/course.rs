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

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
    price_cents: i64,
    image_url: Option<String>,
    published: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct CourseCreate {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[validate(url)]
    pub image_url: Option<String>,
    pub published: Option<bool>,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
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

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn published(&self) -> bool {
        self.published
    }
}

#[async_trait]
impl CrudRepository<CourseCreate> for Course {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            INSERT INTO courses (id, title, slug, description, price_cents, image_url, published)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(data.price_cents)
        .bind(&data.image_url)
        .bind(data.published.unwrap_or(false))
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let published = data.published.unwrap_or(self.published);
        sqlx::query(
            r#"
            UPDATE courses
            SET title = $1, slug = $2, description = $3, price_cents = $4, image_url = $5, published = $6
            WHERE id = $7
            "#,
        )
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(data.price_cents)
        .bind(&data.image_url)
        .bind(published)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.title = data.title;
        self.slug = data.slug;
        self.description = data.description;
        self.price_cents = data.price_cents;
        self.image_url = data.image_url;
        self.published = published;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}


// Catalog

impl Course {
    pub async fn list_published(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE published ORDER BY created_at DESC")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_published_by_slug(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        slug: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE slug = $1 AND published")
            .bind(slug)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Course a lesson belongs to.
    pub async fn find_by_lesson(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT c.*
            FROM courses c
            JOIN sections s ON s.course_id = c.id
            JOIN lessons l ON l.section_id = s.id
            WHERE l.id = $1
            "#,
        )
        .bind(lesson_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }
}
