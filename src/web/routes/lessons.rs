use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Attachment, Course, CoursePurchase, Lesson, LessonOutlineRow, LessonProgress, Quiz},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::learning::LessonResponse, error::ErrorResponse,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}", get(lessons_get_handler))
        .route("/{id}/complete", post(lessons_complete_handler))
        .with_state(state)
}

/// Loads the lesson and checks the learner may open it. Admins always can,
/// buyers of the course always can. Free previews are open to any session
/// while the course is published. Lessons of drafts are hidden from everyone
/// else. Returns the lesson with the course it belongs to.
pub(crate) async fn open_lesson(
    state: &AppState,
    user: &AuthenticatedUser,
    lesson_id: Uuid,
) -> WebResult<(Lesson, Course)> {
    let lesson = Lesson::find_by_id(state.pool(), user, lesson_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let course = Course::find_by_lesson(state.pool(), user, lesson.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    if user.is_admin() || (course.published() && lesson.is_free_preview()) {
        return Ok((lesson, course));
    }

    let owned = CoursePurchase::user_owns(state.pool(), user, user.user_id(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(CoursePurchase::get_resource_type(), e))?;

    match (owned, course.published()) {
        (true, _) => Ok((lesson, course)),
        (false, false) => Err(WebError::resource_not_found(Lesson::get_resource_type())),
        (false, true) => Err(WebError::resource_forbidden(Lesson::get_resource_type())),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Fetch comprehensive info about lesson including its content",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to get")
    ),
    responses(
        (status = 200, description = "Lesson found", body = LessonResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Course is not purchased", body = ErrorResponse),
        (status = 404, description = "Lesson not found or course not published", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let (lesson, course) = open_lesson(&state, user, id).await?;

    let (attachments, completed, quiz, next) = tokio::try_join!(
        Attachment::all_by_lesson(state.pool(), user, lesson.id()),
        LessonProgress::is_completed(state.pool(), user, lesson.id()),
        Quiz::find_by_lesson(state.pool(), user, lesson.id()),
        LessonOutlineRow::find_next_uncompleted(state.pool(), user, lesson.id()),
    )
    .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let res = LessonResponse {
        lesson,
        course_id: course.id(),
        attachments,
        completed,
        quiz_id: quiz.map(|q| q.id()),
        next_lesson_id: next.map(|n| n.id),
    };

    Ok((StatusCode::OK, Json(res)))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/complete",
    description = "Mark lesson as completed, repeated calls keep the first completion time",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to mark")
    ),
    responses(
        (status = 200, description = "Lesson marked", body = LessonProgress),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Course is not purchased", body = ErrorResponse),
        (status = 404, description = "Lesson not found or course not published", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_complete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let (lesson, _) = open_lesson(&state, user, id).await?;

    let progress = LessonProgress::mark_completed(state.pool(), user, lesson.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(progress)))
}
