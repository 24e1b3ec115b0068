use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    grading::QuizGrade,
    model::entity::{Attachment, Lesson, OwnedCourseRow, OwnedProductRow, Question, Quiz, QuizAttempt},
};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonResponse {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub course_id: Uuid,
    pub attachments: Vec<Attachment>,
    pub completed: bool,
    pub quiz_id: Option<Uuid>,
    pub next_lesson_id: Option<Uuid>,
}

/// Question as shown to learners, without the correct index.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuestionView {
    pub id: Uuid,
    pub prompt: String,
    pub options: Vec<String>,
    pub order_index: i32,
}

impl From<Question> for QuestionView {
    fn from(value: Question) -> Self {
        Self {
            id: value.id(),
            prompt: value.prompt().to_string(),
            options: value.options().to_vec(),
            order_index: value.order_index(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizView {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub passing_score: i32,
    pub questions: Vec<QuestionView>,
}

impl QuizView {
    pub fn new(quiz: Quiz, questions: Vec<Question>) -> Self {
        Self {
            id: quiz.id(),
            lesson_id: quiz.lesson_id(),
            title: quiz.title().to_string(),
            passing_score: quiz.passing_score(),
            questions: questions.into_iter().map(QuestionView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema, Validate)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    /// Negative values are reserved for unanswered questions.
    #[validate(range(min = 0))]
    pub selected_index: i32,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema, Validate)]
pub struct AttemptRequest {
    #[validate(nested)]
    pub answers: Vec<SubmittedAnswer>,
}

impl AttemptRequest {
    /// Lines submitted answers up with `questions`, missing ones stay `None`.
    /// Returns the first question id that is not part of the quiz.
    pub fn align(&self, questions: &[Question]) -> Result<Vec<Option<i32>>, Uuid> {
        let mut aligned = vec![None; questions.len()];
        for answer in &self.answers {
            let position = questions
                .iter()
                .position(|q| q.id() == answer.question_id)
                .ok_or(answer.question_id)?;
            aligned[position] = Some(answer.selected_index);
        }
        Ok(aligned)
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AttemptResponse {
    #[serde(flatten)]
    pub attempt: QuizAttempt,
    pub correct: usize,
    pub total: usize,
    pub passing_score: i32,
    /// Per question, in quiz order
    pub outcomes: Vec<bool>,
}

impl AttemptResponse {
    pub fn new(attempt: QuizAttempt, grade: QuizGrade, passing_score: i32) -> Self {
        Self {
            attempt,
            correct: grade.correct,
            total: grade.total,
            passing_score,
            outcomes: grade.outcomes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DashboardCourse {
    #[serde(flatten)]
    pub course: OwnedCourseRow,
    pub progress_percent: i32,
}

impl From<OwnedCourseRow> for DashboardCourse {
    fn from(value: OwnedCourseRow) -> Self {
        let total = usize::try_from(value.total_lessons).unwrap_or(0);
        let completed = usize::try_from(value.completed_lessons).unwrap_or(0);
        Self {
            progress_percent: crate::grading::score_percent(completed, total),
            course: value,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub courses: Vec<DashboardCourse>,
    pub products: Vec<OwnedProductRow>,
    pub recent_attempts: Vec<QuizAttempt>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DownloadResponse {
    pub url: String,
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(total: i64, completed: i64) -> OwnedCourseRow {
        OwnedCourseRow {
            id: Uuid::nil(),
            title: String::from("Rust"),
            slug: String::from("rust"),
            image_url: None,
            total_lessons: total,
            completed_lessons: completed,
        }
    }

    fn question(id: Uuid, order_index: i32) -> Question {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "quiz_id": Uuid::nil(),
            "prompt": "?",
            "options": ["a", "b"],
            "correct_index": 0,
            "order_index": order_index,
        }))
        .unwrap()
    }

    #[test]
    fn align_answers_test() {
        let (q1, q2, q3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let questions = vec![question(q1, 0), question(q2, 1), question(q3, 2)];

        let request = AttemptRequest {
            answers: vec![
                SubmittedAnswer { question_id: q3, selected_index: 1 },
                SubmittedAnswer { question_id: q1, selected_index: 0 },
            ],
        };
        assert_eq!(request.align(&questions), Ok(vec![Some(0), None, Some(1)]));

        let stranger = Uuid::new_v4();
        let request = AttemptRequest {
            answers: vec![SubmittedAnswer { question_id: stranger, selected_index: 0 }],
        };
        assert_eq!(request.align(&questions), Err(stranger));
    }

    #[test]
    fn negative_selection_is_rejected_test() {
        let request = AttemptRequest {
            answers: vec![
                SubmittedAnswer { question_id: Uuid::new_v4(), selected_index: 2 },
                SubmittedAnswer { question_id: Uuid::new_v4(), selected_index: -1 },
            ],
        };
        assert!(request.validate().is_err());

        let request = AttemptRequest {
            answers: vec![SubmittedAnswer { question_id: Uuid::new_v4(), selected_index: 0 }],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn progress_percent_test() {
        assert_eq!(DashboardCourse::from(row(3, 1)).progress_percent, 33);
        assert_eq!(DashboardCourse::from(row(4, 4)).progress_percent, 100);
        assert_eq!(DashboardCourse::from(row(0, 0)).progress_percent, 0);
    }
}
