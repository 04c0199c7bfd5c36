mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

// These tests drive the router in-process and never touch the database:
// they cover the public surface, the JWT gate, and the capability gate.

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    common::ensure_jwt_secret();
    let app = crm_api_rust::app();

    let res = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "CRM API (Rust)");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    common::ensure_jwt_secret();
    let app = crm_api_rust::app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/whoami")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(res).await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn garbage_tokens_are_rejected() -> Result<()> {
    common::ensure_jwt_secret();
    let app = crm_api_rust::app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/whoami")
                .header("authorization", "Bearer not.a.jwt")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn whoami_reports_role_capabilities() -> Result<()> {
    common::ensure_jwt_secret();
    let app = crm_api_rust::app();

    let user_id = Uuid::new_v4();
    let token = common::token_for(user_id, "ceo");

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/whoami")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await?;
    assert_eq!(body["data"]["id"], serde_json::json!(user_id));
    assert_eq!(body["data"]["role"], "ceo");
    let capabilities = body["data"]["capabilities"].as_array().unwrap();
    assert!(capabilities.iter().any(|c| c == "move_lead"));
    Ok(())
}

#[tokio::test]
async fn capability_gate_rejects_uncapable_roles() -> Result<()> {
    common::ensure_jwt_secret();

    // Agents cannot manage labels
    let token = common::token_for(Uuid::new_v4(), "agent");
    let res = crm_api_rust::app()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/labels/{}", Uuid::new_v4()))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = body_json(res).await?;
    assert_eq!(body["code"], "FORBIDDEN");

    // Agents cannot view commissions either
    let token = common::token_for(Uuid::new_v4(), "agent");
    let res = crm_api_rust::app()
        .oneshot(
            Request::builder()
                .uri("/api/commission/commissions")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn login_validates_required_fields() -> Result<()> {
    common::ensure_jwt_secret();
    let app = crm_api_rust::app();

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"email": "", "password": "x"}"#))?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = body_json(res).await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["email"], "This field is required");
    Ok(())
}
