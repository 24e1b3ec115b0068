use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Course, CourseCreate, Section},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::admin::SectionBody,
        error::ErrorResponse, routes::PaginationQuery,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses",
            get(admin_courses_page_handler).post(admin_course_create_handler),
        )
        .route(
            "/courses/{id}",
            get(admin_course_get_handler)
                .put(admin_course_update_handler)
                .delete(admin_course_delete_handler),
        )
        .route(
            "/courses/{id}/sections",
            get(admin_sections_list_handler).post(admin_section_create_handler),
        )
        .route(
            "/sections/{id}",
            get(admin_section_get_handler)
                .put(admin_section_update_handler)
                .delete(admin_section_delete_handler),
        )
}

async fn find_course(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Course> {
    Course::find_by_id(state.pool(), ctx.admin()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))
}

async fn find_section(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Section> {
    Section::find_by_id(state.pool(), ctx.admin()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Section::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/courses",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page, drafts included", body = crate::model::Page<Course>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_courses_page_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;
    let (limit, offset) = page.bounds();

    let courses = Course::page(state.pool(), user, limit, offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/courses",
    request_body = CourseCreate,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid course", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 409, description = "Slug is taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_course_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;
    payload.validate()?;

    let created = Course::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    tracing::info!(course_id = %created.id(), slug = created.slug(), "course created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_course_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;
    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CourseCreate,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Invalid course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Slug is taken", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_course_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    let course = find_course(&state, &ctx, id).await?;

    let updated = course
        .update(state.pool(), ctx.admin()?, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/courses/{id}",
    description = "Deletes the course with its sections, lessons and quizzes",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_course_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;

    course
        .delete(state.pool(), ctx.admin()?)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    tracing::info!(course_id = %id, "course deleted");
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/courses/{id}/sections",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Sections of the course in order", body = Vec<Section>),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_sections_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;

    let sections = Section::all_by_course(state.pool(), ctx.admin()?, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(sections)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/courses/{id}/sections",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = SectionBody,
    responses(
        (status = 201, description = "Section created", body = Section),
        (status = 400, description = "Invalid section", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_section_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SectionBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    let course = find_course(&state, &ctx, id).await?;

    let created = Section::create(state.pool(), ctx.admin()?, payload.into_create(course.id()))
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/sections/{id}",
    params(("id" = Uuid, Path, description = "Section ID")),
    responses(
        (status = 200, description = "Section found", body = Section),
        (status = 404, description = "Section not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_section_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let section = find_section(&state, &ctx, id).await?;
    Ok((StatusCode::OK, Json(section)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/sections/{id}",
    params(("id" = Uuid, Path, description = "Section ID")),
    request_body = SectionBody,
    responses(
        (status = 200, description = "Section updated", body = Section),
        (status = 400, description = "Invalid section", body = ErrorResponse),
        (status = 404, description = "Section not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_section_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SectionBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    let section = find_section(&state, &ctx, id).await?;
    let data = payload.into_create(section.course_id());

    let updated = section
        .update(state.pool(), ctx.admin()?, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/sections/{id}",
    params(("id" = Uuid, Path, description = "Section ID")),
    responses(
        (status = 200, description = "Section deleted"),
        (status = 404, description = "Section not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_section_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let section = find_section(&state, &ctx, id).await?;

    section
        .delete(state.pool(), ctx.admin()?)
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
