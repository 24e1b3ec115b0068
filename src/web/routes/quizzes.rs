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
    grading,
    model::{
        CrudRepository, ResourceTyped,
        entity::{LessonProgress, Question, Quiz, QuizAttempt, QuizAttemptCreate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::learning::{AttemptRequest, AttemptResponse, QuizView},
        error::ErrorResponse,
        routes::lessons::open_lesson,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}", get(quizzes_get_handler))
        .route(
            "/{id}/attempts",
            get(quizzes_attempts_handler).post(quizzes_attempt_handler),
        )
        .with_state(state)
}

/// Quiz the learner may take, i.e. one attached to a lesson they can open.
async fn open_quiz(state: &AppState, user: &AuthenticatedUser, quiz_id: Uuid) -> WebResult<Quiz> {
    let quiz = Quiz::find_by_id(state.pool(), user, quiz_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))?;

    open_lesson(state, user, quiz.lesson_id()).await?;
    Ok(quiz)
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}",
    description = "Quiz with its questions in order, correct answers are not included",
    params(
        ("quiz_id" = Uuid, Path, description = "ID of the quiz")
    ),
    responses(
        (status = 200, description = "Quiz found", body = QuizView),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Course is not purchased", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quizzes_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let quiz = open_quiz(&state, user, id).await?;

    let questions = Question::all_by_quiz(state.pool(), user, quiz.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(QuizView::new(quiz, questions))))
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/attempts",
    description = "Grades submitted answers and stores the attempt. A passing attempt completes the lesson",
    params(
        ("quiz_id" = Uuid, Path, description = "ID of the quiz")
    ),
    request_body = AttemptRequest,
    responses(
        (status = 201, description = "Attempt graded and stored", body = AttemptResponse),
        (status = 400, description = "Unknown question, negative selection or quiz without questions", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Course is not purchased", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quizzes_attempt_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(req): Json<AttemptRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    req.validate()?;
    let quiz = open_quiz(&state, user, id).await?;

    let questions = Question::all_by_quiz(state.pool(), user, quiz.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    let submitted = req.align(&questions).map_err(|question_id| {
        WebError::resource_bad_request(
            Question::get_resource_type(),
            format!("question {question_id} is not part of this quiz"),
        )
    })?;

    let correct: Vec<i32> = questions.iter().map(|q| q.correct_index()).collect();
    let grade = grading::grade(&correct, &submitted, quiz.passing_score())
        .map_err(WebError::grading_error)?;

    let attempt = QuizAttempt::create(
        state.pool(),
        user,
        QuizAttemptCreate {
            user_id: user.user_id(),
            quiz_id: quiz.id(),
            score: grade.score,
            passed: grade.passed,
            answers: grading::stored_answers(&submitted),
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(QuizAttempt::get_resource_type(), e))?;

    if grade.passed {
        LessonProgress::mark_completed(state.pool(), user, quiz.lesson_id())
            .await
            .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;
    }

    tracing::debug!(quiz_id = %quiz.id(), score = grade.score, passed = grade.passed, "quiz attempt graded");

    Ok((
        StatusCode::CREATED,
        Json(AttemptResponse::new(attempt, grade, quiz.passing_score())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}/attempts",
    description = "Own attempts at the quiz, newest first",
    params(
        ("quiz_id" = Uuid, Path, description = "ID of the quiz")
    ),
    responses(
        (status = 200, description = "Attempts", body = Vec<QuizAttempt>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quizzes_attempts_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let quiz = Quiz::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))?;

    let attempts = QuizAttempt::all_by_quiz(state.pool(), user, quiz.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizAttempt::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(attempts)))
}
