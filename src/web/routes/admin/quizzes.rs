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
        entity::{Lesson, Question, QuestionCreate, Quiz},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::admin::{QuestionBody, QuizBody, QuizWithQuestions},
        error::ErrorResponse,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/lessons/{id}/quiz",
            get(admin_lesson_quiz_get_handler).post(admin_quiz_create_handler),
        )
        .route(
            "/quizzes/{id}",
            get(admin_quiz_get_handler)
                .put(admin_quiz_update_handler)
                .delete(admin_quiz_delete_handler),
        )
        .route(
            "/quizzes/{id}/questions",
            get(admin_questions_list_handler).post(admin_question_create_handler),
        )
        .route(
            "/questions/{id}",
            get(admin_question_get_handler)
                .put(admin_question_update_handler)
                .delete(admin_question_delete_handler),
        )
}

async fn find_quiz(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Quiz> {
    Quiz::find_by_id(state.pool(), ctx.admin()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))
}

async fn find_question(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Question> {
    Question::find_by_id(state.pool(), ctx.admin()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Question::get_resource_type()))
}

async fn with_questions(state: &AppState, ctx: &RequestContext, quiz: Quiz) -> WebResult<QuizWithQuestions> {
    let questions = Question::all_by_quiz(state.pool(), ctx.admin()?, quiz.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;
    Ok(QuizWithQuestions { quiz, questions })
}

fn ensure_consistent(data: &QuestionCreate) -> WebResult<()> {
    if !data.is_consistent() {
        return Err(WebError::resource_bad_request(
            Question::get_resource_type(),
            "correct_index must point at one of the options",
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/lessons/{id}/quiz",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Quiz of the lesson with answers", body = QuizWithQuestions),
        (status = 404, description = "Lesson has no quiz", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_lesson_quiz_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let quiz = Quiz::find_by_lesson(state.pool(), ctx.admin()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))?;

    Ok((StatusCode::OK, Json(with_questions(&state, &ctx, quiz).await?)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/lessons/{id}/quiz",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    request_body = QuizBody,
    responses(
        (status = 201, description = "Quiz created", body = Quiz),
        (status = 400, description = "Invalid quiz", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 409, description = "Lesson already has a quiz", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_quiz_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuizBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin()?;
    payload.validate()?;

    let lesson = Lesson::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let created = Quiz::create(state.pool(), user, payload.into_create(lesson.id()))
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz with answers", body = QuizWithQuestions),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_quiz_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let quiz = find_quiz(&state, &ctx, id).await?;
    Ok((StatusCode::OK, Json(with_questions(&state, &ctx, quiz).await?)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = QuizBody,
    responses(
        (status = 200, description = "Quiz updated", body = Quiz),
        (status = 400, description = "Invalid quiz", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_quiz_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuizBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    let quiz = find_quiz(&state, &ctx, id).await?;
    let data = payload.into_create(quiz.lesson_id());

    let updated = quiz
        .update(state.pool(), ctx.admin()?, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz deleted with its questions and attempts"),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_quiz_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let quiz = find_quiz(&state, &ctx, id).await?;

    quiz.delete(state.pool(), ctx.admin()?)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/quizzes/{id}/questions",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Questions in quiz order", body = Vec<Question>),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_questions_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let quiz = find_quiz(&state, &ctx, id).await?;
    Ok((StatusCode::OK, Json(with_questions(&state, &ctx, quiz).await?.questions)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/quizzes/{id}/questions",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = QuestionBody,
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 400, description = "Invalid question", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_question_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuestionBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    let quiz = find_quiz(&state, &ctx, id).await?;
    let data = payload.into_create(quiz.id());
    ensure_consistent(&data)?;

    let created = Question::create(state.pool(), ctx.admin()?, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question found", body = Question),
        (status = 404, description = "Question not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_question_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let question = find_question(&state, &ctx, id).await?;
    Ok((StatusCode::OK, Json(question)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = QuestionBody,
    responses(
        (status = 200, description = "Question updated", body = Question),
        (status = 400, description = "Invalid question", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_question_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuestionBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    let question = find_question(&state, &ctx, id).await?;
    let data = payload.into_create(question.quiz_id());
    ensure_consistent(&data)?;

    let updated = question
        .update(state.pool(), ctx.admin()?, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question deleted"),
        (status = 404, description = "Question not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("cookie" = []))
)]
async fn admin_question_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let question = find_question(&state, &ctx, id).await?;

    question
        .delete(state.pool(), ctx.admin()?)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
