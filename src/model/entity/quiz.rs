use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quiz {
    id: Uuid,
    lesson_id: Uuid,
    title: String,
    /// Minimal score, in percent, an attempt needs to pass.
    passing_score: i32,
}

#[derive(Debug)]
pub struct QuizCreate {
    pub lesson_id: Uuid,
    pub title: String,
    pub passing_score: i32,
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Quiz
    }
}

impl Quiz {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn passing_score(&self) -> i32 {
        self.passing_score
    }
}

#[async_trait]
impl CrudRepository<QuizCreate> for Quiz {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let quiz = sqlx::query_as(
            "INSERT INTO quizzes (id, lesson_id, title, passing_score) VALUES ($1,$2,$3,$4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.lesson_id)
        .bind(&data.title)
        .bind(data.passing_score)
        .fetch_one(mm.executor())
        .await?;

        Ok(quiz)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE quizzes SET lesson_id = $1, title = $2, passing_score = $3 WHERE id = $4")
            .bind(data.lesson_id)
            .bind(&data.title)
            .bind(data.passing_score)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.lesson_id = data.lesson_id;
        self.title = data.title;
        self.passing_score = data.passing_score;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM quizzes WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM quizzes ORDER BY title LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Quiz {
    pub async fn find_by_lesson(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE lesson_id = $1")
            .bind(lesson_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}
