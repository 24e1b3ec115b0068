use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Attachment {
    id: Uuid,
    lesson_id: Uuid,
    name: String,
    url: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AttachmentCreate {
    pub lesson_id: Uuid,
    pub name: String,
    pub url: String,
}

impl ResourceTyped for Attachment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Attachment
    }
}

impl Attachment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CrudRepository<AttachmentCreate> for Attachment {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: AttachmentCreate,
    ) -> DatabaseResult<Self> {
        let attachment = sqlx::query_as(
            "INSERT INTO attachments (id, lesson_id, name, url) VALUES ($1,$2,$3,$4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.lesson_id)
        .bind(&data.name)
        .bind(&data.url)
        .fetch_one(mm.executor())
        .await?;

        Ok(attachment)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: AttachmentCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE attachments SET lesson_id = $1, name = $2, url = $3 WHERE id = $4")
            .bind(data.lesson_id)
            .bind(&data.name)
            .bind(&data.url)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.lesson_id = data.lesson_id;
        self.name = data.name;
        self.url = data.url;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM attachments WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM attachments WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM attachments ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attachments")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Attachment {
    pub async fn all_by_lesson(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as("SELECT * FROM attachments WHERE lesson_id = $1 ORDER BY created_at")
            .bind(lesson_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(rows)
    }
}
