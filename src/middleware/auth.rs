//! Access-token authentication middleware.
//!
//! Wraps any [`Authenticator`] as a Tower layer. For every request it:
//!
//! 1. Strips forged `X-Caller-Id` / `X-Client-Id` headers
//! 2. Validates the `access_token` query parameter, if any
//! 3. Stamps the trusted identity headers on success
//! 4. Stores the [`AuthOutcome`] in request extensions
//!
//! Requests without a token, or with a token the OAuth service does not know,
//! continue anonymously. Authorization is left to the handlers.
//!
//! # Usage
//!
//! ```bash
//! curl "http://localhost:3000/whoami?access_token=abc123"
//! ```
//!
//! # Failure Policy
//!
//! When validation fails for any other reason (service down, timeout, token
//! rejected), [`FailurePolicy`] decides:
//!
//! - `reject` - respond with the validation error and its status code
//! - `anonymous` - log and continue without identity

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use tower::{Layer, Service};
use tracing::warn;

use crate::oauth::{AnonymousReason, AuthOutcome, Authenticator};

/// What to do with a request whose token could not be validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Answer with the validation error
    #[default]
    Reject,
    /// Continue without identity
    Anonymous,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "anonymous" => Ok(Self::Anonymous),
            other => Err(format!(
                "unknown failure policy '{other}' (expected 'reject' or 'anonymous')"
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reject => "reject",
            Self::Anonymous => "anonymous",
        })
    }
}

/// OAuth authentication layer.
pub struct OAuthLayer<A> {
    authenticator: Arc<A>,
    policy: FailurePolicy,
}

impl<A> OAuthLayer<A> {
    pub fn new(authenticator: A, policy: FailurePolicy) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            policy,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }
}

// Manual impl: cloning shares the authenticator, so `A: Clone` is not needed
impl<A> Clone for OAuthLayer<A> {
    fn clone(&self) -> Self {
        Self {
            authenticator: self.authenticator.clone(),
            policy: self.policy,
        }
    }
}

impl<S, A> Layer<S> for OAuthLayer<A> {
    type Service = OAuthService<S, A>;

    fn layer(&self, inner: S) -> Self::Service {
        OAuthService {
            inner,
            authenticator: self.authenticator.clone(),
            policy: self.policy,
        }
    }
}

/// OAuth authentication service wrapper.
pub struct OAuthService<S, A> {
    inner: S,
    authenticator: Arc<A>,
    policy: FailurePolicy,
}

impl<S: Clone, A> Clone for OAuthService<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            authenticator: self.authenticator.clone(),
            policy: self.policy,
        }
    }
}

impl<S, A> Service<Request<Body>> for OAuthService<S, A>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
    A: Authenticator + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let authenticator = self.authenticator.clone();
        let policy = self.policy;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let outcome = match authenticator.authenticate_request(Some(&mut req)).await {
                Ok(outcome) => outcome,
                Err(err) => match policy {
                    FailurePolicy::Reject => return Ok(err.into_response()),
                    FailurePolicy::Anonymous => {
                        warn!(
                            path = %req.uri().path(),
                            status = err.status,
                            "Continuing anonymously after failed token validation"
                        );
                        AuthOutcome::anonymous(AnonymousReason::ValidationFailed)
                    }
                },
            };

            req.extensions_mut().insert(outcome);
            inner.call(req).await
        })
    }
}
