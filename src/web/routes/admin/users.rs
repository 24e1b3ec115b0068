use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    Config,
    auth::secrets_match,
    model::{
        CrudRepository, Page, ResourceTyped,
        entity::{CoursePurchase, ProductPurchase, UserEntity, normalize_email},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::account::{ImpersonateRequest, MeResponse, RoleUpdateRequest},
        error::ErrorResponse,
        middlewares::start_session,
        routes::PaginationQuery,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin_users_page_handler))
        .route("/users/{id}/role", put(admin_user_role_handler))
        .route("/purchases/courses", get(admin_course_purchases_handler))
        .route("/purchases/products", get(admin_product_purchases_handler))
        .route("/impersonate", post(admin_impersonate_handler))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page", body = Page<UserEntity>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_users_page_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;
    let (limit, offset) = page.bounds();

    let users = UserEntity::page(state.pool(), user, limit, offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(users)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = RoleUpdateRequest,
    responses(
        (status = 200, description = "Role changed", body = UserEntity),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_user_role_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleUpdateRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;

    let found = UserEntity::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let updated = found
        .set_role(state.pool(), user, payload.role)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    tracing::info!(admin_id = %user.user_id(), user_id = %id, role = %payload.role, "role changed");
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/purchases/courses",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Course purchases, newest first", body = Page<CoursePurchase>),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_course_purchases_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;
    let (limit, offset) = page.bounds();

    let purchases = CoursePurchase::page(state.pool(), user, limit, offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(CoursePurchase::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(purchases)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/purchases/products",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Product purchases, newest first", body = Page<ProductPurchase>),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_product_purchases_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;
    let (limit, offset) = page.bounds();

    let purchases = ProductPurchase::page(state.pool(), user, limit, offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(ProductPurchase::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(purchases)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/impersonate",
    description = "Signs in as another user. Requires the admin role and the impersonation secret",
    request_body = ImpersonateRequest,
    responses(
        (status = 200, description = "Session switched to the target user", body = MeResponse),
        (status = 403, description = "Not an admin, wrong secret or already impersonating", body = ErrorResponse),
        (status = 404, description = "Target user not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_impersonate_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<ImpersonateRequest>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.admin()?;
    if admin.impersonator().is_some() {
        return Err(WebError::impersonation_denied());
    }

    let config = Config::get_or_init(false).await;
    if !secrets_match(config.app().impersonation_secret(), &payload.secret) {
        tracing::warn!(admin_id = %admin.user_id(), "impersonation attempt with a wrong secret");
        return Err(WebError::impersonation_denied());
    }

    let target = UserEntity::find_by_email(state.pool(), admin, &normalize_email(&payload.email))
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    start_session(&cookies, target.id(), Some(admin.user_id())).await?;
    tracing::info!(admin_id = %admin.user_id(), user_id = %target.id(), "impersonation started");

    Ok((
        StatusCode::OK,
        Json(MeResponse {
            user: target,
            impersonated_by: Some(admin.user_id()),
        }),
    ))
}
