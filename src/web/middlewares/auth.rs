use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::{
    Config, auth,
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "SID";

/// Resolves the `SID` cookie into a [`RequestContext`]. A missing, invalid or
/// expired token, or one naming a deleted user, leaves the request anonymous
/// and drops the cookie.
pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = match cookies.get(AUTH_TOKEN) {
        Some(token) => token.value().to_string(),
        None => {
            req.extensions_mut().insert(RequestContext::anonymous());
            return Ok(next.run(req).await);
        }
    };

    let user = resolve_session(&state, &token).await?;
    if user.is_none() {
        remove_session_cookie(&cookies);
    }

    req.extensions_mut().insert(RequestContext::new(user));
    Ok(next.run(req).await)
}

async fn resolve_session(state: &AppState, token: &str) -> Result<Option<AuthenticatedUser>, WebError> {
    let claims = match auth::process_token(token, Config::get_or_init(false).await.app().jwt()) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!("discarding session cookie: {}", e);
            return Ok(None);
        }
    };

    let Some(id) = claims.subject() else {
        tracing::debug!("discarding session cookie with malformed subject");
        return Ok(None);
    };

    let found = UserEntity::find_by_id(state.pool(), &AuthenticatedUser::admin(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok(found.map(|user| match claims.impersonator() {
        Some(admin_id) => AuthenticatedUser::impersonated(user.id(), user.role(), admin_id),
        None => AuthenticatedUser::new(user.id(), user.role()),
    }))
}

/// Issues a session token for `user_id` and stores it in the `SID` cookie.
pub async fn start_session(
    cookies: &Cookies,
    user_id: Uuid,
    impersonator: Option<Uuid>,
) -> Result<(), WebError> {
    let key = Config::get_or_init(false).await.app().jwt();
    let token = auth::issue_session(user_id, impersonator, key)
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
    Ok(())
}

pub fn remove_session_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::from(AUTH_TOKEN);
    cookie.set_path("/");
    cookies.remove(cookie);
}
