#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use http::{Method, Request};
use wschat::avatar::AvatarChain;
use wschat::config::SessionConfig;
use wschat::gateway::hub::Hub;
use wschat::middleware::auth::encode_profile;
use wschat::models::user::UserProfile;
use wschat::routes;
use wschat::state::AppState;
use wschat::storage;

/// Test server with its own hub and avatar directory.
/// Each instance is isolated — safe for parallel tests.
pub struct TestServer {
    pub state: AppState,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_session(SessionConfig::default())
    }

    pub fn with_session(session: SessionConfig) -> Self {
        let avatar_path = storage::temp_storage_path();
        std::fs::create_dir_all(&avatar_path).ok();

        let avatars = AvatarChain::from_names(&["auth", "file", "gravatar"][..], &avatar_path);

        let state = AppState {
            hub: Hub::spawn(wschat::trace::off()),
            avatars: Arc::new(avatars),
            session,
            avatar_path,
            max_upload_size: 16 * 1024,
        };

        Self { state }
    }

    /// Returns an Axum Router wired to this server's state for `oneshot()` calls.
    pub fn router(&self) -> axum::Router {
        routes::router(self.state.clone())
    }

    /// Binds a TCP listener on port 0, spawns the server, and returns the address.
    pub async fn spawn(&self) -> String {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("127.0.0.1:{}", addr.port())
    }

    /// Wait until the hub reports exactly `count` members.
    pub async fn wait_for_members(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.state.hub.members().await.len() != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("hub never reached {count} member(s)"));
    }
}

pub fn profile(user_id: &str, name: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.to_string(),
        name: name.to_string(),
        email: None,
        avatar_url: None,
    }
}

/// `Cookie` header value authenticating `profile`.
pub fn auth_cookie(profile: &UserProfile) -> String {
    format!("auth={}", encode_profile(profile).unwrap())
}

/// Build a request carrying an auth cookie.
pub fn authenticated_request(method: Method, uri: &str, profile: &UserProfile) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Cookie", auth_cookie(profile))
        .body(Body::empty())
        .unwrap()
}

/// Build a multipart upload request with one file field.
pub fn multipart_request(
    uri: &str,
    profile: Option<&UserProfile>,
    field: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let boundary = "wschat-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"avatar\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        );
    if let Some(profile) = profile {
        builder = builder.header("Cookie", auth_cookie(profile));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Parse a response body into a `serde_json::Value`.
pub async fn parse_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
