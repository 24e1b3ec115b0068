use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    section_id: Uuid,
    title: String,
    content: String,
    video_url: Option<String>,
    order_index: i32,
    is_free_preview: bool,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn section_id(&self) -> Uuid {
        self.section_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    pub fn is_free_preview(&self) -> bool {
        self.is_free_preview
    }
}

#[derive(Debug)]
pub struct LessonCreate {
    pub section_id: Uuid,
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub order_index: Option<i32>,
    pub is_free_preview: Option<bool>,
}

#[async_trait]
impl CrudRepository<LessonCreate> for Lesson {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let lesson = sqlx::query_as(
            r#"
            INSERT INTO lessons (id, section_id, title, content, video_url, order_index, is_free_preview)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.section_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(&data.video_url)
        .bind(data.order_index.unwrap_or(0))
        .bind(data.is_free_preview.unwrap_or(false))
        .fetch_one(mm.executor())
        .await?;

        Ok(lesson)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let order_index = data.order_index.unwrap_or(self.order_index);
        let is_free_preview = data.is_free_preview.unwrap_or(self.is_free_preview);

        sqlx::query(
            r#"
            UPDATE lessons
            SET section_id = $1, title = $2, content = $3, video_url = $4, order_index = $5, is_free_preview = $6
            WHERE id = $7
            "#,
        )
        .bind(data.section_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(&data.video_url)
        .bind(order_index)
        .bind(is_free_preview)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.section_id = data.section_id;
        self.title = data.title;
        self.content = data.content;
        self.video_url = data.video_url;
        self.order_index = order_index;
        self.is_free_preview = is_free_preview;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM lessons WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM lessons ORDER BY section_id, order_index LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Lesson {
    pub async fn all_by_section(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        section_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM lessons WHERE section_id = $1 ORDER BY order_index, title, id")
            .bind(section_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }
}

// Utils

/// Lesson headline as shown in a course outline, with the actor's completion flag.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct LessonOutlineRow {
    pub id: Uuid,
    pub section_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub is_free_preview: bool,
    pub completed: bool,
}

impl LessonOutlineRow {
    pub async fn all_by_course(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                l.id,
                l.section_id,
                l.title,
                l.order_index,
                l.is_free_preview,
                COALESCE(lp.completed, FALSE) AS completed
            FROM lessons l
            JOIN sections s ON s.id = l.section_id
            LEFT JOIN lesson_progress lp
                ON lp.lesson_id = l.id AND lp.user_id = $2
            WHERE s.course_id = $1
            ORDER BY s.order_index, s.title, s.id, l.order_index, l.title, l.id
            "#,
        )
        .bind(course_id)
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    /// First lesson after `lesson_id` in outline order the actor has not
    /// completed. Lessons sharing an order index are ordered like the outline.
    pub async fn find_next_uncompleted(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            r#"
            WITH outline AS (
                SELECT
                    l.id,
                    l.section_id,
                    l.title,
                    l.order_index,
                    l.is_free_preview,
                    COALESCE(lp.completed, FALSE) AS completed,
                    ROW_NUMBER() OVER (
                        ORDER BY s.order_index, s.title, s.id, l.order_index, l.title, l.id
                    ) AS position
                FROM lessons l
                JOIN sections s ON s.id = l.section_id
                LEFT JOIN lesson_progress lp
                    ON lp.lesson_id = l.id AND lp.user_id = $2
                WHERE s.course_id = (
                    SELECT cs.course_id
                    FROM lessons cl
                    JOIN sections cs ON cs.id = cl.section_id
                    WHERE cl.id = $1
                )
            )
            SELECT id, section_id, title, order_index, is_free_preview, completed
            FROM outline
            WHERE position > (SELECT position FROM outline WHERE id = $1)
            AND NOT completed
            ORDER BY position
            LIMIT 1
            "#,
        )
        .bind(lesson_id)
        .bind(actor.user_id())
        .fetch_optional(mm.executor())
        .await?;

        Ok(row)
    }
}
