mod common;
use axum::http::StatusCode;
use coursehub::web::middlewares::AUTH_TOKEN;
use serde_json::json;
use tower_cookies::cookie::SameSite;

use crate::common::{
    Action, Flow, IMPERSONATION_SECRET, PASSWORD, register_action, register_admin_action,
    setup_server, setup_test_db, signin_action, signin_admin_action,
};

#[tokio::test]
async fn route_register_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            register_action("Foo Bar", "Foo@Example.com")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    assert_eq!(body["email"], "foo@example.com");
                    assert_eq!(body["role"], "user");
                    assert!(body.get("password_hash").is_none());
                }),
        )
        // same email in another case
        .step(register_action("Foo", "FOO@example.com").with_expect(StatusCode::CONFLICT))
        .step(
            Action::new("short_password", "POST", "/api/v1/account/register")
                .with_body(json!({ "name": "Foo", "email": "bar@example.com", "password": "short" }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert_eq!(body["success"], false)),
        )
        .step(
            Action::new("bad_email", "POST", "/api/v1/account/register")
                .with_body(json!({ "name": "Foo", "email": "nope", "password": PASSWORD }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(register_admin_action())
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signin_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("Signin", "signin@example.com").with_save_cookies(false))
        .step(
            signin_action("SIGNIN@example.com", PASSWORD)
                .with_clear_cookies(true)
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| assert_eq!(body["email"], "signin@example.com")),
        )
        .step(
            Action::new("me", "GET", "/api/v1/account/me").assert_body(|body| {
                assert_eq!(body["email"], "signin@example.com");
                assert!(body["impersonated_by"].is_null());
            }),
        )
        // wrong credentials
        .step(
            signin_action("signin@example.com", "wrong-password")
                .with_save_cookies(false)
                .with_clear_cookies(true)
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert_eq!(body["status_code"], "401")),
        )
        // non-existing account
        .step(signin_action("nobody@example.com", PASSWORD).with_expect(StatusCode::UNAUTHORIZED))
        .step(Action::new("me_anonymous", "GET", "/api/v1/account/me").with_expect(StatusCode::UNAUTHORIZED))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signout_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("Leaving", "leaving@example.com"))
        .step(Action::new("me", "GET", "/api/v1/account/me"))
        .step(Action::new("signout", "POST", "/api/v1/account/signout"))
        .step(Action::new("me_after", "GET", "/api/v1/account/me").with_expect(StatusCode::UNAUTHORIZED))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn invalid_session_cookie_is_anonymous_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    // public routes keep working with a garbage token, protected ones answer 401
    server
        .get("/api/v1/catalog/courses")
        .add_cookie(tower_cookies::Cookie::new(AUTH_TOKEN, "garbage"))
        .await
        .assert_status(StatusCode::OK);

    server
        .get("/api/v1/account/me")
        .add_cookie(tower_cookies::Cookie::new(AUTH_TOKEN, "garbage"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    drop(pool);
}

#[tokio::test]
async fn route_account_update_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("First", "first@example.com").with_save_as("first"))
        .step(
            register_action("Second", "second@example.com")
                .with_clear_cookies(true)
                .with_save_as("second"),
        )
        // second can't touch first
        .step(
            Action::new("update_other", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", ctx.field("first", "id")))
                .with_body(json!({ "name": "Hacked", "email": "first@example.com" }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        // nor take its email
        .step(
            Action::new("update_conflict", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", ctx.field("second", "id")))
                .with_body(json!({ "name": "Second", "email": "first@example.com" }))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("update_self", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", ctx.field("second", "id")))
                .with_body(json!({ "name": "Renamed", "email": "renamed@example.com" }))
                .assert_body(|body| {
                    assert_eq!(body["name"], "Renamed");
                    assert_eq!(body["email"], "renamed@example.com");
                    assert_eq!(body["role"], "user");
                }),
        )
        // password was kept
        .step(signin_action("renamed@example.com", PASSWORD).with_clear_cookies(true))
        // admin may edit anyone
        .step(register_admin_action())
        .step(
            Action::new("admin_update", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", ctx.field("first", "id")))
                .with_body(json!({ "name": "Edited", "email": "first@example.com", "password": "new-password" }))
                .assert_body(|body| assert_eq!(body["name"], "Edited")),
        )
        .step(signin_action("first@example.com", "new-password").with_clear_cookies(true))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_account_delete_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("Gone", "gone@example.com").with_save_as("gone"))
        .step(
            Action::new("delete_self", "DELETE", "")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", ctx.field("gone", "id"))),
        )
        .step(Action::new("me_after", "GET", "/api/v1/account/me").with_expect(StatusCode::UNAUTHORIZED))
        .step(signin_action("gone@example.com", PASSWORD).with_expect(StatusCode::UNAUTHORIZED))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_access_rules_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("admin_anonymous", "GET", "/api/v1/admin/users")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(Action::new("dashboard_anonymous", "GET", "/api/v1/dashboard").with_expect(StatusCode::UNAUTHORIZED))
        .step(register_action("Learner", "learner@example.com"))
        .step(Action::new("admin_learner", "GET", "/api/v1/admin/users").with_expect(StatusCode::FORBIDDEN))
        .step(register_admin_action())
        .step(
            Action::new("admin_users", "GET", "/api/v1/admin/users")
                .with_param("limit", "1")
                .assert_body(|body| {
                    assert_eq!(body["total"], 2);
                    assert_eq!(body["limit"], 1);
                    assert_eq!(body["items"].as_array().unwrap().len(), 1);
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_role_update_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("Promoted", "promoted@example.com").with_save_as("promoted"))
        .step(register_admin_action())
        .step(
            Action::new("promote", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}/role", ctx.field("promoted", "id")))
                .with_body(json!({ "role": "admin" }))
                .assert_body(|body| assert_eq!(body["role"], "admin")),
        )
        // role is read on every request, no new session needed
        .step(signin_action("promoted@example.com", PASSWORD).with_clear_cookies(true))
        .step(Action::new("admin_users", "GET", "/api/v1/admin/users"))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_impersonation_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("Target", "target@example.com").with_save_as("target"))
        // learners can't impersonate
        .step(
            Action::new("impersonate_learner", "POST", "/api/v1/admin/impersonate")
                .with_body(json!({ "email": "target@example.com", "secret": IMPERSONATION_SECRET }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(register_admin_action().with_save_as("admin"))
        .step(
            Action::new("impersonate_wrong_secret", "POST", "/api/v1/admin/impersonate")
                .with_body(json!({ "email": "target@example.com", "secret": "guess" }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("impersonate_missing", "POST", "/api/v1/admin/impersonate")
                .with_body(json!({ "email": "nobody@example.com", "secret": IMPERSONATION_SECRET }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("stop_not_impersonating", "POST", "/api/v1/account/impersonate/stop")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("impersonate", "POST", "/api/v1/admin/impersonate")
                .with_body(json!({ "email": "Target@example.com", "secret": IMPERSONATION_SECRET }))
                .assert_with_ctx(|ctx, body| {
                    assert_eq!(body["email"], "target@example.com");
                    assert_eq!(body["impersonated_by"].as_str().unwrap(), ctx.field("admin", "id"));
                }),
        )
        .step(
            Action::new("me_impersonated", "GET", "/api/v1/account/me").assert_with_ctx(|ctx, body| {
                assert_eq!(body["id"].as_str().unwrap(), ctx.field("target", "id"));
                assert_eq!(body["impersonated_by"].as_str().unwrap(), ctx.field("admin", "id"));
            }),
        )
        // the impersonated session has the target's role
        .step(Action::new("admin_while_impersonating", "GET", "/api/v1/admin/users").with_expect(StatusCode::FORBIDDEN))
        .step(
            Action::new("stop", "POST", "/api/v1/account/impersonate/stop")
                .assert_body(|body| assert_eq!(body["email"], "admin@example.com")),
        )
        .step(
            Action::new("me_restored", "GET", "/api/v1/account/me").assert_body(|body| {
                assert_eq!(body["role"], "admin");
                assert!(body["impersonated_by"].is_null());
            }),
        )
        .step(signin_admin_action())
        .run(&mut server, pool)
        .await;
}
