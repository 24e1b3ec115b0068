use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Attachment, Lesson, Section},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::admin::{AttachmentBody, LessonBody},
        error::ErrorResponse,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sections/{id}/lessons",
            get(admin_lessons_list_handler).post(admin_lesson_create_handler),
        )
        .route(
            "/lessons/{id}",
            get(admin_lesson_get_handler)
                .put(admin_lesson_update_handler)
                .delete(admin_lesson_delete_handler),
        )
        .route(
            "/lessons/{id}/attachments",
            get(admin_attachments_list_handler).post(admin_attachment_create_handler),
        )
        .route(
            "/attachments/{id}",
            get(admin_attachment_get_handler)
                .put(admin_attachment_update_handler)
                .delete(admin_attachment_delete_handler),
        )
}

async fn find_lesson(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Lesson> {
    Lesson::find_by_id(state.pool(), ctx.admin()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))
}

async fn find_attachment(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
) -> WebResult<Attachment> {
    Attachment::find_by_id(state.pool(), ctx.admin()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Attachment::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/sections/{id}/lessons",
    params(("id" = Uuid, Path, description = "Section ID")),
    responses(
        (status = 200, description = "Lessons of the section in order", body = Vec<Lesson>),
        (status = 404, description = "Section not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_lessons_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;
    let section = Section::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Section::get_resource_type()))?;

    let lessons = Lesson::all_by_section(state.pool(), user, section.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(lessons)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/sections/{id}/lessons",
    params(("id" = Uuid, Path, description = "Section ID")),
    request_body = LessonBody,
    responses(
        (status = 201, description = "Lesson created", body = Lesson),
        (status = 400, description = "Invalid lesson", body = ErrorResponse),
        (status = 404, description = "Section not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_lesson_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LessonBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;
    payload.validate()?;

    let section = Section::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Section::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Section::get_resource_type()))?;

    let created = Lesson::create(state.pool(), user, payload.into_create(section.id()))
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson found", body = Lesson),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_lesson_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let lesson = find_lesson(&state, &ctx, id).await?;
    Ok((StatusCode::OK, Json(lesson)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    request_body = LessonBody,
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 400, description = "Invalid lesson", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_lesson_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LessonBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    let lesson = find_lesson(&state, &ctx, id).await?;
    let data = payload.into_create(lesson.section_id());

    let updated = lesson
        .update(state.pool(), ctx.admin()?, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson deleted"),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_lesson_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let lesson = find_lesson(&state, &ctx, id).await?;

    lesson
        .delete(state.pool(), ctx.admin()?)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/lessons/{id}/attachments",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Attachments of the lesson", body = Vec<Attachment>),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_attachments_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let lesson = find_lesson(&state, &ctx, id).await?;

    let attachments = Attachment::all_by_lesson(state.pool(), ctx.admin()?, lesson.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(attachments)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/lessons/{id}/attachments",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    request_body = AttachmentBody,
    responses(
        (status = 201, description = "Attachment created", body = Attachment),
        (status = 400, description = "Invalid attachment", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_attachment_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachmentBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    let lesson = find_lesson(&state, &ctx, id).await?;

    let created = Attachment::create(state.pool(), ctx.admin()?, payload.into_create(lesson.id()))
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 200, description = "Attachment found", body = Attachment),
        (status = 404, description = "Attachment not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_attachment_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let attachment = find_attachment(&state, &ctx, id).await?;
    Ok((StatusCode::OK, Json(attachment)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    request_body = AttachmentBody,
    responses(
        (status = 200, description = "Attachment updated", body = Attachment),
        (status = 400, description = "Invalid attachment", body = ErrorResponse),
        (status = 404, description = "Attachment not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_attachment_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachmentBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    let attachment = find_attachment(&state, &ctx, id).await?;
    let data = payload.into_create(attachment.lesson_id());

    let updated = attachment
        .update(state.pool(), ctx.admin()?, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 200, description = "Attachment deleted"),
        (status = 404, description = "Attachment not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_attachment_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let attachment = find_attachment(&state, &ctx, id).await?;

    attachment
        .delete(state.pool(), ctx.admin()?)
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
