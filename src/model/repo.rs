use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::{ModelManager, error::DatabaseResult},
    web::AuthenticatedUser,
};

/// Kind of record an operation touched, used to label errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    User,
    Course,
    Section,
    Lesson,
    Attachment,
    Quiz,
    Question,
    QuizAttempt,
    LessonProgress,
    DigitalProduct,
    CoursePurchase,
    ProductPurchase,
    Checkout,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Course => "course",
            Self::Section => "section",
            Self::Lesson => "lesson",
            Self::Attachment => "attachment",
            Self::Quiz => "quiz",
            Self::Question => "question",
            Self::QuizAttempt => "quiz attempt",
            Self::LessonProgress => "lesson progress",
            Self::DigitalProduct => "product",
            Self::CoursePurchase => "course purchase",
            Self::ProductPurchase => "product purchase",
            Self::Checkout => "checkout",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

/// One slice of a listing plus the size of the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    /// Converts the items, keeping the paging numbers.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Table access for one entity. `CreateUpdate` is the writable part of a row,
/// used both to insert and to overwrite.
#[async_trait::async_trait]
pub trait CrudRepository<CreateUpdate, Id = Uuid>: ResourceTyped + Sized + Send
where
    CreateUpdate: Send + 'static,
    Id: Copy + Send + Sync + 'static,
{
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CreateUpdate,
    ) -> DatabaseResult<Self>;

    async fn update(
        self,
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CreateUpdate,
    ) -> DatabaseResult<Self>;

    async fn delete(self, mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<()>;

    async fn find_by_id(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: Id,
    ) -> DatabaseResult<Option<Self>>;

    /// Rows in the entity's listing order.
    async fn list(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>>;

    async fn count(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64>;

    async fn page(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Page<Self>> {
        let (items, total) = tokio::try_join!(
            Self::list(mm, actor, limit, offset),
            Self::count(mm, actor),
        )?;
        Ok(Page::new(items, total, limit, offset))
    }
}
