//! Contract tests for `OAuthClient` against a mocked introspection service.
//!
//! | Remote behavior                         | Test                                  |
//! |-----------------------------------------|---------------------------------------|
//! | 200 with access token                   | `test_valid_token_*`                  |
//! | 404 with error body                     | `test_unknown_token_*`                |
//! | 401 / 403 with error body               | `test_rejected_token_*`               |
//! | >299 with garbage body                  | `test_malformed_error_body_*`         |
//! | 200 with garbage body                   | `test_malformed_token_body_*`         |
//! | slower than the timeout                 | `test_slow_service_*`                 |
//! | nothing listening                       | `test_unreachable_service_*`          |
//! | token `.` / `..` (never sent)           | `test_dot_segment_token_*`            |
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use oauth_gate::oauth::{
    AnonymousReason, AuthOutcome, Authenticator, CALLER_ID_HEADER, CLIENT_ID_HEADER,
    CallerContextExt, INVALID_CLIENT_RESPONSE, Identity, OAuthClient,
};
use oauth_gate::{ErrorKind, OAuthSettings};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_millis(200);

fn client_for(server: &MockServer) -> OAuthClient {
    OAuthClient::new(&OAuthSettings::new(server.uri(), TIMEOUT)).unwrap()
}

fn request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn forged_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Caller-Id", "1")
        .header("X-Client-Id", "1")
        .header("X-Public", "true")
        .body(Body::empty())
        .unwrap()
}

fn assert_no_identity(req: &Request<Body>) {
    assert!(req.headers().get(CALLER_ID_HEADER).is_none());
    assert!(req.headers().get(CLIENT_ID_HEADER).is_none());
}

async fn mount_token_response(server: &MockServer, token: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/oauth/access_token/{token}")))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

// ── No token ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_token_passes_through_without_remote_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server);

    for uri in ["/resource", "/resource?access_token=", "/resource?access_token=%20%09"] {
        let mut req = forged_request(uri);
        let outcome = client.authenticate_request(Some(&mut req)).await.unwrap();

        assert_eq!(outcome, AuthOutcome::anonymous(AnonymousReason::MissingToken));
        assert_no_identity(&req);
        // Only trust headers are stripped
        assert!(req.is_public());
    }
}

#[tokio::test]
async fn test_absent_request_is_not_an_error() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let outcome = client
        .authenticate_request::<Body>(None)
        .await
        .unwrap();

    assert_eq!(outcome, AuthOutcome::anonymous(AnonymousReason::NoRequest));
}

#[tokio::test]
async fn test_dot_segment_token_is_refused_without_remote_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": 1,
            "client_id": 1,
            "expires": 1
        })))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server);

    for uri in [
        "/resource?access_token=..",
        "/resource?access_token=%20.%20",
        "/resource?access_token=%2E%2E",
    ] {
        let mut req = forged_request(uri);
        let err = client
            .authenticate_request(Some(&mut req))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_no_identity(&req);
    }
}

// ── 2xx ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_valid_token_stamps_identity_headers() {
    let server = MockServer::start().await;
    mount_token_response(
        &server,
        "abc123",
        ResponseTemplate::new(200).set_body_json(json!({
            "user_id": 42,
            "client_id": 7,
            "expires": 9_999_999_999_i64
        })),
    )
    .await;
    let client = client_for(&server);

    let mut req = forged_request("/resource?access_token=abc123");
    let outcome = client.authenticate_request(Some(&mut req)).await.unwrap();

    assert_eq!(
        outcome,
        AuthOutcome::Authenticated(Identity {
            caller_id: 42,
            client_id: 7
        })
    );
    assert_eq!(req.headers().get(CALLER_ID_HEADER).unwrap(), "42");
    assert_eq!(req.headers().get(CLIENT_ID_HEADER).unwrap(), "7");
    assert_eq!(req.caller_id(), 42);
    assert_eq!(req.client_id(), 7);
}

#[tokio::test]
async fn test_valid_token_is_trimmed_before_lookup() {
    let server = MockServer::start().await;
    mount_token_response(
        &server,
        "abc123",
        ResponseTemplate::new(201).set_body_json(json!({
            "user_id": 1,
            "client_id": 2,
            "expires": 3
        })),
    )
    .await;
    let client = client_for(&server);

    let mut req = request("/resource?access_token=%20abc123%20");
    let outcome = client.authenticate_request(Some(&mut req)).await.unwrap();

    assert!(outcome.is_authenticated());
    assert_eq!(req.caller_id(), 1);
}

#[tokio::test]
async fn test_malformed_token_body_is_internal_error() {
    let server = MockServer::start().await;
    mount_token_response(
        &server,
        "abc123",
        ResponseTemplate::new(200).set_body_string("<html>oops</html>"),
    )
    .await;
    let client = client_for(&server);

    let mut req = forged_request("/resource?access_token=abc123");
    let err = client
        .authenticate_request(Some(&mut req))
        .await
        .unwrap_err();

    assert_eq!(err.status, 500);
    assert_eq!(err.kind(), ErrorKind::InternalServerError);
    assert_no_identity(&req);
}

// ── >299 ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_token_is_soft_failure() {
    let server = MockServer::start().await;
    mount_token_response(
        &server,
        "stale",
        ResponseTemplate::new(404).set_body_json(json!({
            "message": "no access token found with given id",
            "code": 404,
            "error": "not_found"
        })),
    )
    .await;
    let client = client_for(&server);

    let mut req = forged_request("/resource?access_token=stale");
    let outcome = client.authenticate_request(Some(&mut req)).await.unwrap();

    assert_eq!(outcome, AuthOutcome::anonymous(AnonymousReason::TokenNotFound));
    assert_no_identity(&req);
}

#[tokio::test]
async fn test_rejected_token_error_is_passed_through() {
    let server = MockServer::start().await;
    mount_token_response(
        &server,
        "expired",
        ResponseTemplate::new(401).set_body_json(json!({
            "message": "access token expired",
            "code": 401,
            "error": "unauthorized"
        })),
    )
    .await;
    let client = client_for(&server);

    let mut req = forged_request("/resource?access_token=expired");
    let err = client
        .authenticate_request(Some(&mut req))
        .await
        .unwrap_err();

    assert_eq!(err.status, 401);
    assert_eq!(err.message, "access token expired");
    assert_eq!(err.cause, "unauthorized");
    assert_eq!(err.kind(), ErrorKind::Other);
    assert_no_identity(&req);
}

#[tokio::test]
async fn test_rejected_token_keeps_remote_code_over_http_status() {
    let server = MockServer::start().await;
    mount_token_response(
        &server,
        "weird",
        ResponseTemplate::new(503).set_body_json(json!({
            "message": "bad request",
            "code": 400,
            "error": "bad_request"
        })),
    )
    .await;
    let client = client_for(&server);

    let mut req = request("/resource?access_token=weird");
    let err = client
        .authenticate_request(Some(&mut req))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_malformed_error_body_is_internal_error() {
    let server = MockServer::start().await;
    mount_token_response(
        &server,
        "abc123",
        ResponseTemplate::new(404).set_body_string("not found"),
    )
    .await;
    let client = client_for(&server);

    let mut req = request("/resource?access_token=abc123");
    let err = client
        .authenticate_request(Some(&mut req))
        .await
        .unwrap_err();

    // An undecodable 404 is not a soft failure
    assert_eq!(err.status, 500);
    assert!(!err.cause.is_empty());
    assert_no_identity(&req);
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_slow_service_times_out_as_internal_error() {
    let server = MockServer::start().await;
    mount_token_response(
        &server,
        "abc123",
        ResponseTemplate::new(200)
            .set_body_json(json!({"user_id": 1, "client_id": 1, "expires": 1}))
            .set_delay(Duration::from_millis(1000)),
    )
    .await;
    let client = client_for(&server);

    let mut req = forged_request("/resource?access_token=abc123");
    let err = client
        .authenticate_request(Some(&mut req))
        .await
        .unwrap_err();

    assert_eq!(err.status, 500);
    assert_eq!(err.cause, INVALID_CLIENT_RESPONSE);
    assert_no_identity(&req);
}

#[tokio::test]
async fn test_unreachable_service_is_internal_error() {
    // Grab a free port, then release it so nothing is listening
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client =
        OAuthClient::new(&OAuthSettings::new(format!("http://127.0.0.1:{port}"), TIMEOUT))
            .unwrap();

    let mut req = forged_request("/resource?access_token=abc123");
    let err = client
        .authenticate_request(Some(&mut req))
        .await
        .unwrap_err();

    assert_eq!(err.status, 500);
    assert_eq!(err.cause, INVALID_CLIENT_RESPONSE);
    assert_no_identity(&req);
}

// ── Concurrency ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_requests_share_one_client() {
    let server = MockServer::start().await;
    for id in 1..=5 {
        mount_token_response(
            &server,
            &format!("token-{id}"),
            ResponseTemplate::new(200).set_body_json(json!({
                "user_id": id,
                "client_id": id * 10,
                "expires": 0
            })),
        )
        .await;
    }
    let client = client_for(&server);

    let handles: Vec<_> = (1..=5)
        .map(|id| {
            let client = client.clone();
            tokio::spawn(async move {
                let mut req = request(&format!("/resource?access_token=token-{id}"));
                client.authenticate_request(Some(&mut req)).await.unwrap();
                (id, req.caller_id(), req.client_id())
            })
        })
        .collect();

    for handle in handles {
        let (id, caller, client_id) = handle.await.unwrap();
        assert_eq!(caller, id);
        assert_eq!(client_id, id * 10);
    }
}
