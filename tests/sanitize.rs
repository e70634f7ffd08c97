use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    routing::post,
};
use food_order_api::{dto::orders::UpdateOrderStatusRequest, sanitize::SanitizedJson};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn echo(SanitizedJson(payload): SanitizedJson<Value>) -> Json<Value> {
    Json(payload)
}

async fn status(SanitizedJson(payload): SanitizedJson<UpdateOrderStatusRequest>) -> String {
    payload.status
}

fn app() -> Router {
    Router::new()
        .route("/echo", post(echo))
        .route("/status", post(status))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn handler_sees_cleaned_payload() {
    let response = app()
        .oneshot(post_json(
            "/echo",
            json!({
                "email": { "$gt": "" },
                "$where": "1 == 1",
                "profile.role": "admin",
                "notes": "<img src=x onerror=alert(1)>no onions<script>steal()</script>",
                "quantity": 2,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        value,
        json!({ "email": {}, "notes": "no onions", "quantity": 2 })
    );
}

#[tokio::test]
async fn markup_is_stripped_before_typed_deserialization() {
    let response = app()
        .oneshot(post_json("/status", json!({ "status": "<b>Ready</b>" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Ready");
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let response = app()
        .oneshot(post_json("/status", json!({ "state": "Ready" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
