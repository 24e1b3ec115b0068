use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use tower_cookies::Cookies;
use uuid::Uuid;
use validator::Validate;

use crate::{
    Config,
    auth::{hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{UserEntity, UserEntityCreateUpdate, claim_guest_purchases, normalize_email},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::account::{AccountUpdateRequest, MeResponse, RegisterRequest, SigninRequest},
        error::ErrorResponse,
        middlewares::{remove_session_cookie, start_session},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/register", post(account_register_handler))
        .route("/signin", post(account_signin_handler))
        .route("/signout", post(account_signout_handler))
        .route("/me", get(account_me_handler))
        .route("/impersonate/stop", post(account_impersonate_stop_handler))
        .route(
            "/{id}",
            put(account_update_handler).delete(account_delete_handler),
        )
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/account/register",
    request_body = RegisterRequest,
    description = "Creates new user, claims guest purchases made with the same email and signs in",
    responses(
        (status = 200, description = "User created successfully", body = UserEntity),
        (status = 400, description = "Invalid name, email or password", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account"
)]
async fn account_register_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<RegisterRequest>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let system = AuthenticatedUser::admin();
    let email = normalize_email(&payload.email);
    let found = UserEntity::find_by_email(state.pool(), &system, &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let config = Config::get_or_init(false).await;
    let role = if config.app().is_admin_email(&email) {
        UserRole::Admin
    } else {
        UserRole::User
    };

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let data = UserEntityCreateUpdate {
        email,
        name: payload.name.trim().to_string(),
        password_hash: hash,
        role: Some(role),
    };

    let created = UserEntity::create(state.pool(), &system, data)
        .await
        .map_err(|e| {
            // lost a race against a concurrent registration
            if e.is_unique_violation() {
                WebError::registration_conflict()
            } else {
                WebError::resource_fetch_error(UserEntity::get_resource_type(), e)
            }
        })?;

    let claimed = claim_guest_purchases(state.pool(), &system, created.id(), created.email())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    if claimed > 0 {
        tracing::info!(user_id = %created.id(), claimed, "guest purchases claimed");
    }

    start_session(&cookies, created.id(), None).await?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signin",
    description = "Authorizes user in the system",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "User signed in", body = UserEntity),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
async fn account_signin_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SigninRequest>,
) -> WebResult<impl IntoResponse> {
    let found = UserEntity::find_by_email(
        state.pool(),
        &AuthenticatedUser::admin(),
        &normalize_email(&payload.email),
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
    .ok_or_else(WebError::auth_invalid_credentials)?;

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    start_session(&cookies, found.id(), None).await?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signout",
    description = "Removes the session cookie",
    responses(
        (status = 200, description = "Signed out"),
    ),
    tag = "account",
)]
async fn account_signout_handler(cookies: Cookies) -> impl IntoResponse {
    remove_session_cookie(&cookies);
    StatusCode::OK
}

#[utoipa::path(
    get,
    path = "/api/v1/account/me",
    description = "Current user and, for impersonated sessions, the admin behind it",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn account_me_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    Ok((
        StatusCode::OK,
        Json(MeResponse {
            user: found,
            impersonated_by: user.impersonator(),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/account/{id}",
    request_body = AccountUpdateRequest,
    params(
        ("id" = Uuid, Path, description = "ID of the user to update")
    ),
    responses(
        (status = 200, description = "User updated successfully", body = UserEntity),
        (status = 400, description = "Invalid name, email or password", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You doesn't have enough permissions to do this", body = ErrorResponse),
        (status = 409, description = "Email is taken by another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn account_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountUpdateRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    payload.validate()?;

    let found = UserEntity::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    check_access(user, &found)
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let email = normalize_email(&payload.email);
    let conflict_found = UserEntity::find_by_email(state.pool(), user, &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if conflict_found.is_some_and(|other| other.id() != found.id()) {
        return Err(WebError::registration_conflict());
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => hash_password(password).map_err(WebError::server_crypt_error)?,
        None => String::new(), // keeps the stored hash
    };

    let data = UserEntityCreateUpdate {
        email,
        name: payload.name.trim().to_string(),
        password_hash,
        role: None,
    };

    let updated = found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/account/{id}",
    description = "Deletes specified user",
    params(
        ("id" = Uuid, Path, description = "ID of the user to delete")
    ),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn account_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    check_access(user, &found)
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if id == user.user_id() {
        remove_session_cookie(&cookies);
    }

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/account/impersonate/stop",
    description = "Ends an impersonated session and signs the admin back in",
    responses(
        (status = 200, description = "Admin session restored", body = UserEntity),
        (status = 400, description = "Session is not impersonated", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Impersonating admin no longer exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn account_impersonate_stop_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    cookies: Cookies,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let admin_id = user.impersonator().ok_or_else(WebError::not_impersonating)?;

    let admin = UserEntity::find_by_id(state.pool(), &AuthenticatedUser::admin(), admin_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .filter(|admin| admin.role() == UserRole::Admin)
        .ok_or_else(WebError::impersonation_denied)?;

    start_session(&cookies, admin.id(), None).await?;
    tracing::info!(admin_id = %admin.id(), user_id = %user.user_id(), "impersonation stopped");

    Ok((StatusCode::OK, Json(admin)))
}
