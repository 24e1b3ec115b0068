use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Attempts are append-only, there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizAttempt {
    id: Uuid,
    user_id: Uuid,
    quiz_id: Uuid,
    score: i32,
    passed: bool,
    /// Selected option per question, `-1` when left unanswered.
    answers: Vec<i32>,
    created_at: DateTime<Utc>,
}

pub struct QuizAttemptCreate {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub passed: bool,
    pub answers: Vec<i32>,
}

impl ResourceTyped for QuizAttempt {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::QuizAttempt
    }
}

impl QuizAttempt {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn answers(&self) -> &[i32] {
        &self.answers
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizAttemptCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO quiz_attempts (id, user_id, quiz_id, score, passed, answers)
            VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.quiz_id)
        .bind(data.score)
        .bind(data.passed)
        .bind(&data.answers)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    pub async fn all_by_quiz(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        quiz_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT * FROM quiz_attempts WHERE user_id = $1 AND quiz_id = $2 ORDER BY created_at DESC",
        )
        .bind(actor.user_id())
        .bind(quiz_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    pub async fn recent(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT * FROM quiz_attempts WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(actor.user_id())
        .bind(limit)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}
