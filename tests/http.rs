mod common;

use axum::body::Body;
use http::{Method, Request, StatusCode};
use tower::ServiceExt;

use common::TestServer;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::new();
    let response = server.router().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = TestServer::new();
    let response = server.router().oneshot(get("/version")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::parse_body(response).await;
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["git_sha"].is_string());
}

#[tokio::test]
async fn test_not_found() {
    let server = TestServer::new();
    let response = server.router().oneshot(get("/nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_headers_present() {
    let server = TestServer::new();
    let response = server
        .router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_room_requires_auth_cookie() {
    let server = TestServer::new();
    let response = server.router().oneshot(get("/room")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = common::parse_body(response).await;
    assert_eq!(json["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_room_rejects_garbage_cookie() {
    let server = TestServer::new();
    let response = server
        .router()
        .oneshot(
            Request::builder()
                .uri("/room")
                .header("Cookie", "auth=%%%not-base64")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_count_starts_empty() {
    let server = TestServer::new();
    let response = server.router().oneshot(get("/room/members")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::parse_body(response).await;
    assert_eq!(json["data"]["count"], 0);
}

#[tokio::test]
async fn test_logout_clears_cookie_and_redirects() {
    let server = TestServer::new();
    let alice = common::profile("alice-id", "alice");
    let response = server
        .router()
        .oneshot(common::authenticated_request(Method::GET, "/logout", &alice))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()["location"], "/chat");
    let cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(cookie.starts_with("auth=;"), "unexpected cookie: {cookie}");
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_upload_avatar_and_serve_it() {
    let server = TestServer::new();
    let alice = common::profile("alice-id", "alice");
    let response = server
        .router()
        .oneshot(common::multipart_request(
            "/uploader",
            Some(&alice),
            "avatarFile",
            "image/png",
            b"\x89PNG fake",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"Successful");
    assert!(server.state.avatar_path.join("alice-id.png").exists());

    let response = server
        .router()
        .oneshot(get("/avatars/alice-id.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"\x89PNG fake");
}

#[tokio::test]
async fn test_upload_requires_auth() {
    let server = TestServer::new();
    let response = server
        .router()
        .oneshot(common::multipart_request(
            "/uploader",
            None,
            "avatarFile",
            "image/png",
            b"png",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let server = TestServer::new();
    let alice = common::profile("alice-id", "alice");
    let response = server
        .router()
        .oneshot(common::multipart_request(
            "/uploader",
            Some(&alice),
            "avatarFile",
            "text/plain",
            b"hello",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_missing_field() {
    let server = TestServer::new();
    let alice = common::profile("alice-id", "alice");
    let response = server
        .router()
        .oneshot(common::multipart_request(
            "/uploader",
            Some(&alice),
            "somethingElse",
            "image/png",
            b"png",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let server = TestServer::new();
    let alice = common::profile("alice-id", "alice");
    let data = vec![0u8; server.state.max_upload_size + 1];
    let response = server
        .router()
        .oneshot(common::multipart_request(
            "/uploader",
            Some(&alice),
            "avatarFile",
            "image/png",
            &data,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!server.state.avatar_path.join("alice-id.png").exists());
}
