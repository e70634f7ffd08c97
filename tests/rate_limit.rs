use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::from_fn_with_state,
    routing::get,
};
use food_order_api::middleware::rate_limit::{RateLimiter, rate_limit};
use tower::ServiceExt;

fn app(max: u32) -> Router {
    let limiter = RateLimiter::new("test", max, Duration::from_secs(60));
    Router::new()
        .route("/ping", get(|| async { "pong" }))
        .layer(from_fn_with_state(limiter, rate_limit))
}

fn request_from(ip: &str) -> Request<Body> {
    Request::builder()
        .uri("/ping")
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn rejects_requests_over_the_limit() {
    let app = app(2);

    for _ in 0..2 {
        let response = app.clone().oneshot(request_from("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(request_from("10.0.0.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    // Other clients keep their own budget.
    let response = app.oneshot(request_from("10.0.0.2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
