//! Quiz grading.
//!
//! A quiz is graded by comparing the submitted option index of every question
//! with the stored correct index. The score is the rounded percentage of
//! correct answers and the attempt passes when the score reaches the quiz's
//! passing threshold.

use thiserror::Error;

pub type GradingResult<T> = std::result::Result<T, GradingError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GradingError {
    #[error("quiz has no questions")]
    EmptyQuiz,
    #[error("expected {expected} answers, got {actual}")]
    AnswerCountMismatch { expected: usize, actual: usize },
}

/// Stored as `-1` in the attempt's answer column.
pub const UNANSWERED: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizGrade {
    pub correct: usize,
    pub total: usize,
    pub score: i32,
    pub passed: bool,
    /// Per question, in the order the correct indices were given.
    pub outcomes: Vec<bool>,
}

pub fn grade(
    correct_indices: &[i32],
    submitted: &[Option<i32>],
    passing_score: i32,
) -> GradingResult<QuizGrade> {
    if correct_indices.is_empty() {
        return Err(GradingError::EmptyQuiz);
    }

    if correct_indices.len() != submitted.len() {
        return Err(GradingError::AnswerCountMismatch {
            expected: correct_indices.len(),
            actual: submitted.len(),
        });
    }

    let outcomes: Vec<bool> = correct_indices
        .iter()
        .zip(submitted)
        .map(|(correct, answer)| *answer == Some(*correct))
        .collect();

    let total = outcomes.len();
    let correct = outcomes.iter().filter(|ok| **ok).count();
    let score = score_percent(correct, total);

    Ok(QuizGrade {
        correct,
        total,
        score,
        passed: is_passing(score, passing_score),
        outcomes,
    })
}

pub fn score_percent(correct: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as i32
}

#[inline]
pub fn is_passing(score: i32, passing_score: i32) -> bool {
    score >= passing_score
}

/// Flattens answers for storage, unanswered questions become [`UNANSWERED`].
pub fn stored_answers(submitted: &[Option<i32>]) -> Vec<i32> {
    submitted.iter().map(|a| a.unwrap_or(UNANSWERED)).collect()
}
