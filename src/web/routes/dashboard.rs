use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};

use crate::{
    model::{
        ResourceTyped,
        entity::{OwnedCourseRow, OwnedProductRow, QuizAttempt},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::learning::{DashboardCourse, DashboardResponse},
        error::ErrorResponse,
    },
};

const RECENT_ATTEMPTS: i64 = 10;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(dashboard_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    description = "Owned courses with progress, owned products and the latest quiz attempts",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "dashboard"
)]
async fn dashboard_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (courses, products, recent_attempts) = tokio::try_join!(
        OwnedCourseRow::fetch_all(state.pool(), user),
        OwnedProductRow::fetch_all(state.pool(), user),
        QuizAttempt::recent(state.pool(), user, RECENT_ATTEMPTS),
    )
    .map_err(|e| WebError::resource_fetch_error(QuizAttempt::get_resource_type(), e))?;

    let res = DashboardResponse {
        courses: courses.into_iter().map(DashboardCourse::from).collect(),
        products,
        recent_attempts,
    };

    Ok((StatusCode::OK, Json(res)))
}
