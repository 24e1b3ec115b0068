use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Question {
    id: Uuid,
    quiz_id: Uuid,
    prompt: String,
    options: Vec<String>,
    correct_index: i32,
    order_index: i32,
}

#[derive(Debug)]
pub struct QuestionCreate {
    pub quiz_id: Uuid,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: i32,
    pub order_index: Option<i32>,
}

impl ResourceTyped for Question {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Question
    }
}

impl Question {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_index(&self) -> i32 {
        self.correct_index
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }
}

impl QuestionCreate {
    /// The correct index must point at one of the options.
    pub fn is_consistent(&self) -> bool {
        usize::try_from(self.correct_index).is_ok_and(|idx| idx < self.options.len())
    }
}

#[async_trait]
impl CrudRepository<QuestionCreate> for Question {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        let question = sqlx::query_as(
            r#"
            INSERT INTO questions (id, quiz_id, prompt, options, correct_index, order_index)
            VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.quiz_id)
        .bind(&data.prompt)
        .bind(&data.options)
        .bind(data.correct_index)
        .bind(data.order_index.unwrap_or(0))
        .fetch_one(mm.executor())
        .await?;

        Ok(question)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        let order_index = data.order_index.unwrap_or(self.order_index);
        sqlx::query(
            r#"
            UPDATE questions
            SET quiz_id = $1, prompt = $2, options = $3, correct_index = $4, order_index = $5
            WHERE id = $6
            "#,
        )
        .bind(data.quiz_id)
        .bind(&data.prompt)
        .bind(&data.options)
        .bind(data.correct_index)
        .bind(order_index)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.quiz_id = data.quiz_id;
        self.prompt = data.prompt;
        self.options = data.options;
        self.correct_index = data.correct_index;
        self.order_index = order_index;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM questions WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM questions WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM questions ORDER BY quiz_id, order_index LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Question {
    /// Questions in presentation order, the order quiz answers are graded in.
    pub async fn all_by_quiz(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        quiz_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as("SELECT * FROM questions WHERE quiz_id = $1 ORDER BY order_index, id")
            .bind(quiz_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(rows)
    }
}
