mod common;
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, WEBHOOK_SECRET, completed_event, course_paid_action, create_course_action,
    create_product_action, register_action, register_admin_action, setup_server, setup_test_db,
    signin_admin_action,
};

fn learner_checkout() -> Action {
    Action::new("checkout", "POST", "/api/v1/checkout")
        .with_dyn_body(|ctx| json!({ "kind": "course", "item_id": ctx.field("course", "id") }))
        .with_save_as("checkout")
}

#[tokio::test]
async fn duplicate_delivery_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_admin_action())
        .step(create_course_action("dup-course", true))
        .step(
            register_action("Learner", "learner@example.com")
                .with_clear_cookies(true)
                .with_save_as("learner"),
        )
        .step(learner_checkout())
        .step(
            course_paid_action(Some("learner"), "learner@example.com").assert_body(|body| {
                assert_eq!(body["received"], true);
                assert_eq!(body["outcome"], "recorded");
                assert!(body["purchase_id"].is_string());
            }),
        )
        .step(
            course_paid_action(Some("learner"), "learner@example.com")
                .assert_body(|body| assert_eq!(body["outcome"], "duplicate")),
        )
        .step(signin_admin_action())
        .step(
            Action::new("purchases", "GET", "/api/v1/admin/purchases/courses").assert_with_ctx(
                |ctx, body| {
                    assert_eq!(body["total"], 1);
                    let purchase = &body["items"][0];
                    assert_eq!(purchase["user_id"].as_str().unwrap(), ctx.field("learner", "id"));
                    assert_eq!(purchase["payment_session_id"].as_str().unwrap(), ctx.field("checkout", "id"));
                    assert_eq!(purchase["amount_cents"], 4900);
                },
            ),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn signature_rejected_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    let event = |_: &common::FlowContext| {
        completed_event("cs_forged", "course", "00000000-0000-0000-0000-000000000000", None, "x@example.com")
    };

    Flow::new()
        .step(
            Action::new("wrong_secret", "POST", "/api/v1/webhooks/payments")
                .with_signed_body(Some("whsec_other"), event)
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("unsigned", "POST", "/api/v1/webhooks/payments")
                .with_signed_body(None, event)
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn ignored_events_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_admin_action())
        .step(create_course_action("ignored-course", true))
        .step(
            Action::new("other_type", "POST", "/api/v1/webhooks/payments")
                .with_signed_body(Some(WEBHOOK_SECRET), |_| {
                    json!({ "id": "evt_1", "type": "payment_intent.created", "data": { "object": {} } })
                })
                .assert_body(|body| assert_eq!(body["outcome"], "ignored")),
        )
        .step(
            Action::new("unpaid", "POST", "/api/v1/webhooks/payments")
                .with_signed_body(Some(WEBHOOK_SECRET), |ctx| {
                    let mut event = completed_event(
                        "cs_unpaid",
                        "course",
                        &ctx.field("course", "id"),
                        None,
                        "late@example.com",
                    );
                    event["data"]["object"]["payment_status"] = json!("unpaid");
                    event
                })
                .assert_body(|body| assert_eq!(body["outcome"], "ignored")),
        )
        .step(
            Action::new("purchases", "GET", "/api/v1/admin/purchases/courses")
                .assert_body(|body| assert_eq!(body["total"], 0)),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn invalid_metadata_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("unknown_item", "POST", "/api/v1/webhooks/payments")
                .with_signed_body(Some(WEBHOOK_SECRET), |_| {
                    completed_event(
                        "cs_unknown",
                        "course",
                        "00000000-0000-0000-0000-000000000000",
                        None,
                        "x@example.com",
                    )
                })
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("unknown_kind", "POST", "/api/v1/webhooks/payments")
                .with_signed_body(Some(WEBHOOK_SECRET), |_| {
                    completed_event(
                        "cs_bundle",
                        "bundle",
                        "00000000-0000-0000-0000-000000000000",
                        None,
                        "x@example.com",
                    )
                })
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn guest_purchase_claimed_on_register_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_admin_action())
        .step(create_course_action("guest-course", true))
        .step(
            Action::new("guest_checkout", "POST", "/api/v1/checkout")
                .with_clear_cookies(true)
                .with_dyn_body(|ctx| {
                    json!({ "kind": "course", "item_id": ctx.field("course", "id"), "email": "Guest@Example.com" })
                })
                .assert_body(|body| assert!(body["url"].as_str().unwrap().contains("guest@example.com")))
                .with_save_as("checkout"),
        )
        .step(course_paid_action(None, "guest@example.com").assert_body(|body| assert_eq!(body["outcome"], "recorded")))
        .step(register_action("Guest", "guest@example.com"))
        .step(
            Action::new("dashboard", "GET", "/api/v1/dashboard").assert_body(|body| {
                let courses = body["courses"].as_array().unwrap();
                assert_eq!(courses.len(), 1);
                assert_eq!(courses[0]["slug"], "guest-course");
                assert_eq!(courses[0]["progress_percent"], 0);
            }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn purchase_linked_by_email_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    // the account exists but the session carries no user id
    Flow::new()
        .step(register_admin_action())
        .step(create_course_action("email-course", true))
        .step(register_action("Known", "known@example.com").with_clear_cookies(true))
        .step(
            Action::new("paid", "POST", "/api/v1/webhooks/payments")
                .with_signed_body(Some(WEBHOOK_SECRET), |ctx| {
                    completed_event("cs_by_email", "course", &ctx.field("course", "id"), None, "KNOWN@example.com")
                }),
        )
        .step(
            Action::new("dashboard", "GET", "/api/v1/dashboard")
                .assert_body(|body| assert_eq!(body["courses"].as_array().unwrap().len(), 1)),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn product_download_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_admin_action())
        .step(create_product_action("cheatsheet"))
        // admins can always download
        .step(
            Action::new("admin_download", "GET", "")
                .with_dyn_path(|ctx| format!("/api/v1/products/{}/download", ctx.field("product", "id")))
                .assert_body(|body| assert_eq!(body["url"], "/api/v1/static/cheatsheet.pdf")),
        )
        .step(
            register_action("Buyer", "buyer@example.com")
                .with_clear_cookies(true)
                .with_save_as("buyer"),
        )
        .step(
            Action::new("download_locked", "GET", "")
                .with_dyn_path(|ctx| format!("/api/v1/products/{}/download", ctx.field("product", "id")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("checkout", "POST", "/api/v1/checkout")
                .with_dyn_body(|ctx| json!({ "kind": "product", "item_id": ctx.field("product", "id") }))
                .with_save_as("checkout"),
        )
        .step(
            Action::new("paid", "POST", "/api/v1/webhooks/payments")
                .with_signed_body(Some(WEBHOOK_SECRET), |ctx| {
                    completed_event(
                        &ctx.field("checkout", "id"),
                        "product",
                        &ctx.field("product", "id"),
                        Some(&ctx.field("buyer", "id")),
                        "buyer@example.com",
                    )
                }),
        )
        .step(
            Action::new("download", "GET", "")
                .with_dyn_path(|ctx| format!("/api/v1/products/{}/download", ctx.field("product", "id")))
                .assert_body(|body| assert_eq!(body["url"], "/api/v1/static/cheatsheet.pdf")),
        )
        .step(
            Action::new("dashboard", "GET", "/api/v1/dashboard").assert_body(|body| {
                let products = body["products"].as_array().unwrap();
                assert_eq!(products.len(), 1);
                assert_eq!(products[0]["slug"], "cheatsheet");
            }),
        )
        .step(
            Action::new("missing_product", "GET", "/api/v1/products/00000000-0000-0000-0000-000000000000/download")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}
