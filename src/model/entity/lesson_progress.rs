use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonProgress {
    id: Uuid,
    user_id: Uuid,
    lesson_id: Uuid,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonProgress
    }
}

impl LessonProgress {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<&DateTime<Utc>> {
        self.completed_at.as_ref()
    }

    /// Marks the lesson completed for the actor. Completing twice keeps the first
    /// completion time.
    pub async fn mark_completed(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO lesson_progress (id, user_id, lesson_id, completed, completed_at)
            VALUES ($1, $2, $3, TRUE, now())
            ON CONFLICT (user_id, lesson_id) DO UPDATE
                SET completed = TRUE,
                    completed_at = COALESCE(lesson_progress.completed_at, EXCLUDED.completed_at)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(lesson_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    pub async fn is_completed(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<bool> {
        let completed: Option<bool> = sqlx::query_scalar(
            "SELECT completed FROM lesson_progress WHERE user_id = $1 AND lesson_id = $2",
        )
        .bind(actor.user_id())
        .bind(lesson_id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(completed.unwrap_or(false))
    }
}
