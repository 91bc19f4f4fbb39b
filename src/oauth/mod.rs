//! Access-token authentication against a remote OAuth service.
//!
//! # Flow
//!
//! ```text
//! request ─► strip X-Caller-Id / X-Client-Id
//!              │
//!              ├─ no ?access_token ──────────────► Anonymous(MissingToken)
//!              ▼
//!        GET /oauth/access_token/{token}
//!              │
//!              ├─ resolved ─► set trust headers ─► Authenticated(identity)
//!              ├─ not found ─────────────────────► Anonymous(TokenNotFound)
//!              └─ anything else ─────────────────► Err(RestError)
//! ```
//!
//! Trust headers are never taken from the caller: they are removed on every
//! request before anything else happens and only written back after the
//! introspection service vouched for the token.

mod client;
pub mod headers;
mod token;
mod validator;

use std::future::Future;

use axum::http::Request;

pub use client::OAuthClient;
pub(crate) use client::authenticate_with;
pub use headers::{
    ACCESS_TOKEN_QUERY, CALLER_ID_HEADER, CLIENT_ID_HEADER, CallerContextExt, PUBLIC_HEADER,
    caller_id, clean_request, client_id, is_public,
};
pub use token::{AccessToken, AnonymousReason, AuthOutcome, AuthResult, Identity, TokenLookup};
pub use validator::{INVALID_CLIENT_RESPONSE, TokenValidator};

/// Capability to authenticate an inbound request.
///
/// Implementations must strip trust headers from every request they are given
/// and only set them after a successful validation. A missing request, a
/// missing token, or a token the service does not know all yield
/// `Ok(AuthOutcome::Anonymous { .. })`; other failures yield `Err`.
pub trait Authenticator: Send + Sync {
    fn authenticate_request<B: Send>(
        &self,
        request: Option<&mut Request<B>>,
    ) -> impl Future<Output = AuthResult> + Send;
}
