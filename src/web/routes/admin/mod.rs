//! Admin surface: content editing, user management, purchase listings and
//! impersonation. Every handler requires the admin role.

use axum::Router;

use crate::web::AppState;

pub mod courses;
pub mod lessons;
pub mod products;
pub mod quizzes;
pub mod users;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .merge(courses::routes())
        .merge(lessons::routes())
        .merge(quizzes::routes())
        .merge(products::routes())
        .merge(users::routes())
        .with_state(state)
}
