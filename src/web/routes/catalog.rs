use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{
    model::{
        ResourceTyped,
        entity::{Course, DigitalProduct, LessonOutlineRow, Section},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::catalog::CourseOutline, error::ErrorResponse,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/courses", get(catalog_courses_handler))
        .route("/courses/{slug}", get(catalog_course_handler))
        .route("/products", get(catalog_products_handler))
        .route("/products/{slug}", get(catalog_product_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/courses",
    description = "Published courses, newest first",
    responses(
        (status = 200, description = "Published courses", body = Vec<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "catalog"
)]
async fn catalog_courses_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let courses = Course::list_published(state.pool(), &AuthenticatedUser::admin())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/courses/{slug}",
    description = "Course outline: sections with lesson titles. Completion flags are set for signed-in learners",
    params(
        ("slug" = String, Path, description = "Course slug")
    ),
    responses(
        (status = 200, description = "Course outline", body = CourseOutline),
        (status = 404, description = "Course not found or not published", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "catalog"
)]
async fn catalog_course_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    let system = AuthenticatedUser::admin();
    // anonymous visitors get the outline without progress
    let viewer = ctx.maybe_user().cloned().unwrap_or_else(AuthenticatedUser::admin);

    let course = Course::find_published_by_slug(state.pool(), &system, &slug)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    let (sections, lessons) = tokio::try_join!(
        Section::all_by_course(state.pool(), &system, course.id()),
        LessonOutlineRow::all_by_course(state.pool(), &viewer, course.id()),
    )
    .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(CourseOutline::from_rows(course, sections, lessons)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/products",
    description = "Published digital products, newest first",
    responses(
        (status = 200, description = "Published products", body = Vec<DigitalProduct>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "catalog"
)]
async fn catalog_products_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let products = DigitalProduct::list_published(state.pool(), &AuthenticatedUser::admin())
        .await
        .map_err(|e| WebError::resource_fetch_error(DigitalProduct::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product found", body = DigitalProduct),
        (status = 404, description = "Product not found or not published", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "catalog"
)]
async fn catalog_product_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    let product = DigitalProduct::find_published_by_slug(state.pool(), &AuthenticatedUser::admin(), &slug)
        .await
        .map_err(|e| WebError::resource_fetch_error(DigitalProduct::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(DigitalProduct::get_resource_type()))?;

    Ok((StatusCode::OK, Json(product)))
}
