mod common;
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, course_paid_action, create_course_action, create_product_action,
    register_action, register_admin_action, setup_server, setup_test_db,
};

#[tokio::test]
async fn guest_checkout_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_admin_action())
        .step(create_course_action("guest-checkout", true))
        .step(
            Action::new("no_email", "POST", "/api/v1/checkout")
                .with_clear_cookies(true)
                .with_dyn_body(|ctx| json!({ "kind": "course", "item_id": ctx.field("course", "id") }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("bad_email", "POST", "/api/v1/checkout")
                .with_dyn_body(|ctx| {
                    json!({ "kind": "course", "item_id": ctx.field("course", "id"), "email": "not-an-email" })
                })
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("checkout", "POST", "/api/v1/checkout")
                .with_dyn_body(|ctx| {
                    json!({ "kind": "course", "item_id": ctx.field("course", "id"), "email": "guest@example.com" })
                })
                .assert_body(|body| {
                    assert!(body["id"].as_str().unwrap().starts_with("cs_test_"));
                    assert!(body["url"].is_string());
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn checkout_unavailable_item_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_admin_action())
        .step(create_course_action("draft-course", false))
        .step(
            Action::new("draft", "POST", "/api/v1/checkout")
                .with_dyn_body(|ctx| json!({ "kind": "course", "item_id": ctx.field("course", "id") }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        // a course id is not a product id
        .step(
            Action::new("wrong_kind", "POST", "/api/v1/checkout")
                .with_dyn_body(|ctx| json!({ "kind": "product", "item_id": ctx.field("course", "id") }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("unknown_kind", "POST", "/api/v1/checkout")
                .with_dyn_body(|ctx| json!({ "kind": "bundle", "item_id": ctx.field("course", "id") }))
                .with_expect(StatusCode::UNPROCESSABLE_ENTITY),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn owned_course_checkout_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_admin_action())
        .step(create_course_action("owned-course", true))
        .step(create_product_action("owned-product"))
        .step(
            register_action("Owner", "owner@example.com")
                .with_clear_cookies(true)
                .with_save_as("owner"),
        )
        .step(
            Action::new("checkout", "POST", "/api/v1/checkout")
                .with_dyn_body(|ctx| {
                    // signed-in learners use their account email
                    json!({ "kind": "course", "item_id": ctx.field("course", "id"), "email": "other@example.com" })
                })
                .assert_body(|body| assert!(body["url"].as_str().unwrap().contains("owner@example.com")))
                .with_save_as("checkout"),
        )
        .step(course_paid_action(Some("owner"), "owner@example.com"))
        .step(
            Action::new("checkout_again", "POST", "/api/v1/checkout")
                .with_dyn_body(|ctx| json!({ "kind": "course", "item_id": ctx.field("course", "id") }))
                .with_expect(StatusCode::CONFLICT),
        )
        // products may be bought again
        .step(
            Action::new("product_checkout", "POST", "/api/v1/checkout")
                .with_dyn_body(|ctx| json!({ "kind": "product", "item_id": ctx.field("product", "id") })),
        )
        .run(&mut server, pool)
        .await;
}
