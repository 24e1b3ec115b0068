use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;

/// Owned course with the actor's lesson completion counters.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct OwnedCourseRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub total_lessons: i64,
    pub completed_lessons: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct OwnedProductRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub image_url: Option<String>,
}

impl OwnedCourseRow {
    pub async fn fetch_all(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                c.id,
                c.title,
                c.slug,
                c.image_url,
                (
                    SELECT COUNT(*)
                    FROM lessons l
                    JOIN sections s ON s.id = l.section_id
                    WHERE s.course_id = c.id
                ) AS total_lessons,
                (
                    SELECT COUNT(*)
                    FROM lesson_progress lp
                    JOIN lessons l ON l.id = lp.lesson_id
                    JOIN sections s ON s.id = l.section_id
                    WHERE s.course_id = c.id AND lp.user_id = $1 AND lp.completed
                ) AS completed_lessons
            FROM courses c
            WHERE c.id IN (SELECT course_id FROM course_purchases WHERE user_id = $1)
            ORDER BY c.title
            "#,
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}

impl OwnedProductRow {
    pub async fn fetch_all(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT p.id, p.title, p.slug, p.image_url
            FROM digital_products p
            WHERE p.id IN (SELECT product_id FROM product_purchases WHERE user_id = $1)
            ORDER BY p.title
            "#,
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
