//! In-memory [`Authenticator`] for tests of code sitting behind the middleware.
//!
//! Runs the same sanitize/extract/stamp sequence as [`crate::oauth::OAuthClient`]
//! but answers token lookups from a table instead of the network. Unknown
//! tokens behave like a "not found" answer from the real service.
//!
//! ```rust,ignore
//! let auth = StubAuthenticator::new()
//!     .with_token("good", AccessToken { user_id: 1, client_id: 2, expires: 0 })
//!     .with_failure("broken", RestError::internal_server_error("down", "test"));
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::http::Request;

use crate::error::RestError;
use crate::oauth::{AccessToken, AuthResult, Authenticator, TokenLookup, authenticate_with};

#[derive(Debug, Clone, Default)]
pub struct StubAuthenticator {
    tokens: Arc<HashMap<String, TokenLookup>>,
}

impl StubAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `token` to the given access token.
    pub fn with_token(self, token: impl Into<String>, access_token: AccessToken) -> Self {
        self.with_lookup(token, TokenLookup::Resolved(access_token))
    }

    /// Fail validation of `token` with `error`.
    pub fn with_failure(self, token: impl Into<String>, error: RestError) -> Self {
        self.with_lookup(token, TokenLookup::Failed(error))
    }

    fn with_lookup(self, token: impl Into<String>, lookup: TokenLookup) -> Self {
        let mut tokens = Arc::unwrap_or_clone(self.tokens);
        tokens.insert(token.into(), lookup);
        Self {
            tokens: Arc::new(tokens),
        }
    }

    fn lookup(&self, token: &str) -> TokenLookup {
        self.tokens.get(token).cloned().unwrap_or_else(|| {
            TokenLookup::NotFound(RestError::not_found(
                "access token not found",
                "unknown token",
            ))
        })
    }
}

impl Authenticator for StubAuthenticator {
    fn authenticate_request<B: Send>(
        &self,
        request: Option<&mut Request<B>>,
    ) -> impl Future<Output = AuthResult> + Send {
        authenticate_with(request, move |token| {
            std::future::ready(self.lookup(&token))
        })
    }
}
