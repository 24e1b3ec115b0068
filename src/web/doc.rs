use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::AUTH_TOKEN;

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_TOKEN,
                    "JWT session token of the current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::account::account_register_handler,
        crate::web::routes::account::account_signin_handler,
        crate::web::routes::account::account_signout_handler,
        crate::web::routes::account::account_me_handler,
        crate::web::routes::account::account_update_handler,
        crate::web::routes::account::account_delete_handler,
        crate::web::routes::account::account_impersonate_stop_handler,
        crate::web::routes::catalog::catalog_courses_handler,
        crate::web::routes::catalog::catalog_course_handler,
        crate::web::routes::catalog::catalog_products_handler,
        crate::web::routes::catalog::catalog_product_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_complete_handler,
        crate::web::routes::quizzes::quizzes_get_handler,
        crate::web::routes::quizzes::quizzes_attempt_handler,
        crate::web::routes::quizzes::quizzes_attempts_handler,
        crate::web::routes::products::products_download_handler,
        crate::web::routes::dashboard::dashboard_handler,
        crate::web::routes::checkout::checkout_handler,
        crate::web::routes::webhooks::webhooks_payments_handler,
        crate::web::routes::admin::courses::admin_courses_page_handler,
        crate::web::routes::admin::courses::admin_course_create_handler,
        crate::web::routes::admin::courses::admin_course_get_handler,
        crate::web::routes::admin::courses::admin_course_update_handler,
        crate::web::routes::admin::courses::admin_course_delete_handler,
        crate::web::routes::admin::courses::admin_sections_list_handler,
        crate::web::routes::admin::courses::admin_section_create_handler,
        crate::web::routes::admin::courses::admin_section_get_handler,
        crate::web::routes::admin::courses::admin_section_update_handler,
        crate::web::routes::admin::courses::admin_section_delete_handler,
        crate::web::routes::admin::lessons::admin_lessons_list_handler,
        crate::web::routes::admin::lessons::admin_lesson_create_handler,
        crate::web::routes::admin::lessons::admin_lesson_get_handler,
        crate::web::routes::admin::lessons::admin_lesson_update_handler,
        crate::web::routes::admin::lessons::admin_lesson_delete_handler,
        crate::web::routes::admin::lessons::admin_attachments_list_handler,
        crate::web::routes::admin::lessons::admin_attachment_create_handler,
        crate::web::routes::admin::lessons::admin_attachment_get_handler,
        crate::web::routes::admin::lessons::admin_attachment_update_handler,
        crate::web::routes::admin::lessons::admin_attachment_delete_handler,
        crate::web::routes::admin::quizzes::admin_lesson_quiz_get_handler,
        crate::web::routes::admin::quizzes::admin_quiz_create_handler,
        crate::web::routes::admin::quizzes::admin_quiz_get_handler,
        crate::web::routes::admin::quizzes::admin_quiz_update_handler,
        crate::web::routes::admin::quizzes::admin_quiz_delete_handler,
        crate::web::routes::admin::quizzes::admin_questions_list_handler,
        crate::web::routes::admin::quizzes::admin_question_create_handler,
        crate::web::routes::admin::quizzes::admin_question_get_handler,
        crate::web::routes::admin::quizzes::admin_question_update_handler,
        crate::web::routes::admin::quizzes::admin_question_delete_handler,
        crate::web::routes::admin::products::admin_products_page_handler,
        crate::web::routes::admin::products::admin_product_create_handler,
        crate::web::routes::admin::products::admin_product_get_handler,
        crate::web::routes::admin::products::admin_product_update_handler,
        crate::web::routes::admin::products::admin_product_delete_handler,
        crate::web::routes::admin::users::admin_users_page_handler,
        crate::web::routes::admin::users::admin_user_role_handler,
        crate::web::routes::admin::users::admin_course_purchases_handler,
        crate::web::routes::admin::users::admin_product_purchases_handler,
        crate::web::routes::admin::users::admin_impersonate_handler,
    ),
    tags(
        (name = "account", description = "Registration, sessions and own account"),
        (name = "catalog", description = "Public storefront"),
        (name = "lessons", description = "Lesson content and progress"),
        (name = "quizzes", description = "Quizzes and graded attempts"),
        (name = "products", description = "Purchased product downloads"),
        (name = "dashboard", description = "Learner dashboard"),
        (name = "checkout", description = "Hosted checkout sessions"),
        (name = "webhooks", description = "Payment provider callbacks"),
        (name = "admin", description = "Content, users and purchases administration"),
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn openapi_lists_routes_test() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/account/register",
            "/api/v1/catalog/courses/{slug}",
            "/api/v1/quizzes/{quiz_id}/attempts",
            "/api/v1/webhooks/payments",
            "/api/v1/admin/impersonate",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("cookie"));
    }
}
