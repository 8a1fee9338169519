//! End-to-end HTTP tests for the composed application
//!
//! These tests drive the full router, middleware included, against an
//! in-memory user store:
//! - Root redirect and feature mounts
//! - Oversized upload handling
//! - Current user resolution from the session cookie
//! - Login and logout redirects

use axum::{
    body::Body,
    http::{
        header::{CONTENT_LENGTH, COOKIE, LOCATION, SET_COOKIE},
        Request, StatusCode,
    },
    routing::get,
    Router,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower::util::ServiceExt; // for oneshot

use webfaf::api::middleware::payload_limit::FILE_TOO_LARGE;
use webfaf::app::{build_app, build_router, route_table};
use webfaf::auth::verifier::AssertionVerifier;
use webfaf::auth::session::create_session_token;
use webfaf::config::{Config, Profile};
use webfaf::domain::repositories::User;
use webfaf::domain::user::value_objects::Username;
use webfaf::infrastructure::repositories::InMemoryUserRepository;

const UPLOAD_LIMIT: usize = 64;
const JDOE_IDENTITY: &str = "https://jdoe.id.fedoraproject.org/";

fn test_config(dumpdir: &Path) -> Config {
    let mut config = Config::defaults(Profile::Testing);
    config.secret_key = "integration-test-secret".to_string();
    config.max_content_length = UPLOAD_LIMIT;
    config.dumpdir_path = dumpdir.to_path_buf();
    config
}

fn test_users() -> InMemoryUserRepository {
    InMemoryUserRepository::with_users([User {
        username: Username::new("jdoe").unwrap(),
        mail: "jdoe@example.com".to_string(),
        admin: false,
    }])
}

/// Setup test application with a single known user
fn setup_app(dumpdir: &Path) -> Router {
    build_app(test_config(dumpdir), Arc::new(test_users())).expect("valid route table")
}

fn session_cookie(identity: &str) -> String {
    let token = create_session_token(identity, "integration-test-secret", 1).unwrap();
    format!("session={}", token)
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn get_json(app: Router, uri: &str, cookie: Option<String>) -> Value {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }

    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);

    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_root_redirects_to_summary() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers().get(LOCATION).unwrap().to_str().unwrap();
    assert_eq!(location, "/summary");

    let json = get_json(app, location, None).await;
    assert_eq!(json["section"], "summary");
}

#[tokio::test]
async fn test_feature_sections_are_mounted() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    for (uri, section) in [
        ("/dumpdirs", "dumpdirs"),
        ("/reports", "reports"),
        ("/problems", "problems"),
        ("/stats", "stats"),
        ("/summary", "summary"),
    ] {
        let json = get_json(app.clone(), uri, None).await;
        assert_eq!(json["section"], section);
    }
}

#[tokio::test]
async fn test_summary_links_to_sections() {
    let dir = tempfile::tempdir().unwrap();
    let json = get_json(setup_app(dir.path()), "/summary", None).await;

    let urls: Vec<&str> = json["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|link| link["url"].as_str().unwrap())
        .collect();
    assert_eq!(urls, vec!["/reports", "/problems", "/stats", "/dumpdirs"]);
}

#[tokio::test]
async fn test_problems_page_labels_states() {
    let dir = tempfile::tempdir().unwrap();
    let json = get_json(setup_app(dir.path()), "/problems", None).await;

    assert_eq!(json["states"][0]["state"], "NEW");
    assert_eq!(json["states"][0]["label"], "label-danger");
    assert_eq!(json["states"][2]["label"], "label-success");
}

#[tokio::test]
async fn test_oversized_upload_with_content_length() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());
    let payload = vec![b'x'; UPLOAD_LIMIT + 1];

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/dumpdirs/new?name=big.tar.gz")
                .header(CONTENT_LENGTH, payload.len())
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_bytes(response).await, FILE_TOO_LARGE.as_bytes());
    assert!(!dir.path().join("big.tar.gz").exists());
}

#[tokio::test]
async fn test_oversized_upload_without_content_length() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/dumpdirs/new?name=big.tar.gz")
                .body(Body::from(vec![b'x'; UPLOAD_LIMIT * 4]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_bytes(response).await, b"File Too Large");
}

#[tokio::test]
async fn test_upload_within_limit_is_listed() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/dumpdirs/new?name=ccpp-1.tar.gz")
                .body(Body::from("small archive"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(created["name"], "ccpp-1.tar.gz");
    assert_eq!(created["size"], 13);

    let json = get_json(app.clone(), "/dumpdirs", None).await;
    assert_eq!(json["entries"][0]["name"], "ccpp-1.tar.gz");

    // A second upload under the same name is refused
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/dumpdirs/new?name=ccpp-1.tar.gz")
                .body(Body::from("again"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_upload_rejects_path_names() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/dumpdirs/new?name=..%2Fescape")
                .body(Body::from("data"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_resolves_current_user() {
    let dir = tempfile::tempdir().unwrap();
    let json = get_json(
        setup_app(dir.path()),
        "/summary",
        Some(session_cookie(JDOE_IDENTITY)),
    )
    .await;

    assert_eq!(json["user"], "jdoe");
}

#[tokio::test]
async fn test_anonymous_requests_have_no_user() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    let cases = [
        None,
        Some(session_cookie("https://alice.id.fedoraproject.org/")),
        Some("session=not-a-valid-token".to_string()),
    ];

    for cookie in cases {
        let json = get_json(app.clone(), "/summary", cookie).await;
        assert!(json["user"].is_null());
    }
}

#[tokio::test]
async fn test_login_redirects_to_identity_provider() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/login")
                .header("host", "faf.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers().get(LOCATION).unwrap().to_str().unwrap();
    assert!(location.starts_with("https://id.fedoraproject.org/?"));
    assert!(location.contains("openid.return_to=http%3A%2F%2Ffaf.example.com%2Flogin%2Ffinish"));
}

#[tokio::test]
async fn test_login_when_signed_in_goes_to_summary() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/login")
                .header(COOKIE, session_cookie(JDOE_IDENTITY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/summary");
}

#[tokio::test]
async fn test_logout_clears_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/logout")
                .header(COOKIE, session_cookie(JDOE_IDENTITY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/summary");

    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("session="));
}

#[tokio::test]
async fn test_login_return_opens_session_for_user() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    // Browser comes back from the provider with a positive assertion
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/login/finish?openid.mode=id_res&openid.identity=https%3A%2F%2Fjdoe.id.fedoraproject.org%2F")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/summary");

    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    let session = set_cookie.split(';').next().unwrap().to_string();
    assert!(session.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));

    // The issued session resolves to the stored user on the next request
    let json = get_json(app, "/summary", Some(session)).await;
    assert_eq!(json["user"], "jdoe");
}

#[tokio::test]
async fn test_login_return_rejects_bad_assertions() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path());

    for uri in [
        "/login/finish?openid.mode=cancel",
        "/login/finish?openid.mode=id_res",
        "/login/finish?openid.mode=id_res&openid.identity=https%3A%2F%2Fjdoe.evil.example.com%2F",
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "GET {}", uri);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_payload_too_large_from_handler_is_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let identity = Arc::new(AssertionVerifier::for_provider(&config.openid_provider).unwrap());

    let table = route_table().route(
        "/too-large",
        "too_large",
        get(|| async { (StatusCode::PAYLOAD_TOO_LARGE, "upstream says no") }),
    );
    let app = build_router(table, config, Arc::new(test_users()), identity).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/too-large")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_bytes(response).await, FILE_TOO_LARGE.as_bytes());
}
