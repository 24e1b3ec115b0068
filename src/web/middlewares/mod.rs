mod auth;
pub use auth::{AUTH_TOKEN, extract_context_fn, remove_session_cookie, start_session};

mod access;
pub use access::{AccessPolicy, RouteAccess, route_access_fn};
