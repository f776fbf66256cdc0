#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use serde_json::Value;
use smart_home_server::devices::provisioning::ServerInstance;
use smart_home_server::handlers;
use smart_home_server::models::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

pub fn test_state(instance: ServerInstance, max_workers: usize) -> Arc<AppState> {
    Arc::new(AppState::new(instance, max_workers, CancellationToken::new()).unwrap())
}

/// Router for `instance` with a fresh registry.
pub fn build_test_app(instance: ServerInstance) -> Router {
    handlers::router(test_state(instance, 10))
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST and return status plus decoded body.
pub async fn call(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = post_json(app, uri, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

/// Serves `state` on an ephemeral local port.
pub async fn spawn_server(state: Arc<AppState>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = handlers::router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
