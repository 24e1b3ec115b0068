use crate::{
    Config,
    web::{AppState, doc::ApiDoc, middlewares},
};
use axum::{Router, middleware};
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod account;
pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod dashboard;
pub mod lessons;
pub mod products;
pub mod quizzes;
pub mod webhooks;

const DEFAULT_PAGE_LIMIT: i64 = 20;
const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

impl PaginationQuery {
    /// `(limit, offset)` clamped to `1..=100` and `0..`.
    pub fn bounds(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    config: &'static Config,
) -> Router<S> {
    let mut router = Router::new()
        .nest("/api/v1/account", account::routes(state.clone()))
        .nest("/api/v1/admin", admin::routes(state.clone()))
        .nest("/api/v1/catalog", catalog::routes(state.clone()))
        .nest("/api/v1/lessons", lessons::routes(state.clone()))
        .nest("/api/v1/quizzes", quizzes::routes(state.clone()))
        .nest("/api/v1/products", products::routes(state.clone()))
        .nest("/api/v1/dashboard", dashboard::routes(state.clone()))
        .nest("/api/v1/checkout", checkout::routes(state.clone()))
        .nest("/api/v1/webhooks", webhooks::routes(state.clone()))
        .nest_service("/api/v1/static", ServeDir::new(config.app().uploads_dir()))
        // layers run bottom-up: cookies, then session context, then access rules
        .layer(middleware::from_fn(middlewares::route_access_fn))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pagination_bounds_test() {
        let query = PaginationQuery {
            limit: None,
            offset: None,
        };
        assert_eq!(query.bounds(), (20, 0));

        let query = PaginationQuery {
            limit: Some(1000),
            offset: Some(-5),
        };
        assert_eq!(query.bounds(), (100, 0));

        let query = PaginationQuery {
            limit: Some(0),
            offset: Some(40),
        };
        assert_eq!(query.bounds(), (1, 40));
    }
}
