use axum::{extract::Request, middleware::Next, response::Response};

use crate::web::{RequestContext, WebError};

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Session,
    Admin,
}

/// Path prefix lists consulted for every request. Admin prefixes win over
/// public ones, anything unlisted requires a session.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    admin: &'static [&'static str],
    public: &'static [&'static str],
}

pub static ADMIN_PREFIXES: &[&str] = &["/api/v1/admin"];

pub static PUBLIC_PREFIXES: &[&str] = &[
    "/api/v1/account/register",
    "/api/v1/account/signin",
    "/api/v1/account/signout",
    "/api/v1/catalog",
    "/api/v1/checkout",
    "/api/v1/webhooks",
    "/api/v1/docs",
    "/api/v1/static",
    "/api-doc",
];

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(ADMIN_PREFIXES, PUBLIC_PREFIXES)
    }
}

impl AccessPolicy {
    pub fn new(admin: &'static [&'static str], public: &'static [&'static str]) -> Self {
        Self { admin, public }
    }

    pub fn classify(&self, path: &str) -> RouteAccess {
        if self.admin.iter().any(|prefix| matches_prefix(path, prefix)) {
            RouteAccess::Admin
        } else if self.public.iter().any(|prefix| matches_prefix(path, prefix)) {
            RouteAccess::Public
        } else {
            RouteAccess::Session
        }
    }

    pub fn check(&self, path: &str, ctx: &RequestContext) -> Result<(), WebError> {
        match self.classify(path) {
            RouteAccess::Public => Ok(()),
            RouteAccess::Session => ctx.user().map(|_| ()),
            RouteAccess::Admin => ctx.admin().map(|_| ()),
        }
    }
}

/// `/api/v1/catalog` matches `/api/v1/catalog` and `/api/v1/catalog/x`, not
/// `/api/v1/catalogue`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Must run after [`super::extract_context_fn`].
pub async fn route_access_fn(req: Request, next: Next) -> Result<Response, WebError> {
    let ctx = req
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(RequestContext::anonymous);

    AccessPolicy::default().check(req.uri().path(), &ctx)?;
    Ok(next.run(req).await)
}
