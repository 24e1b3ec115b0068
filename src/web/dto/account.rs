use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{model::entity::UserEntity, web::UserRole};

#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Omitted password keeps the current one.
#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct AccountUpdateRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserEntity,
    /// Admin id when the session is impersonated
    pub impersonated_by: Option<Uuid>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ImpersonateRequest {
    pub email: String,
    pub secret: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RoleUpdateRequest {
    pub role: UserRole,
}
