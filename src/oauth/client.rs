use std::future::Future;

use axum::http::Request;
use tracing::{debug, warn};

use crate::config::OAuthSettings;
use crate::error::AppResult;
use crate::metrics;

use super::headers::{CALLER_ID_HEADER, CLIENT_ID_HEADER, access_token, clean_request};
use super::token::{AnonymousReason, AuthOutcome, AuthResult, Identity, TokenLookup};
use super::validator::TokenValidator;
use super::Authenticator;

/// Production [`Authenticator`] backed by the remote introspection service.
///
/// ```rust,ignore
/// let client = OAuthClient::new(&OAuthSettings::default())?;
/// match client.authenticate_request(Some(&mut request)).await {
///     Ok(outcome) => { /* continue, identity headers set if authenticated */ }
///     Err(err) => return err.into_response(),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct OAuthClient {
    validator: TokenValidator,
}

impl OAuthClient {
    /// # Errors
    ///
    /// See [`TokenValidator::new`].
    pub fn new(settings: &OAuthSettings) -> AppResult<Self> {
        Ok(Self::with_validator(TokenValidator::new(settings)?))
    }

    pub fn with_validator(validator: TokenValidator) -> Self {
        Self { validator }
    }
}

impl Authenticator for OAuthClient {
    fn authenticate_request<B: Send>(
        &self,
        request: Option<&mut Request<B>>,
    ) -> impl Future<Output = AuthResult> + Send {
        authenticate_with(request, move |token| async move {
            self.validator.validate(&token).await
        })
    }
}

/// Sanitize, extract the token, look it up and stamp identity headers.
///
/// Shared by every [`Authenticator`]; implementations only differ in how a
/// token is looked up.
pub(crate) async fn authenticate_with<B, F, Fut>(
    request: Option<&mut Request<B>>,
    lookup: F,
) -> AuthResult
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = TokenLookup>,
{
    let Some(request) = request else {
        return Ok(AuthOutcome::anonymous(AnonymousReason::NoRequest));
    };

    clean_request(Some(&mut *request));

    let Some(token) = access_token(request.uri()) else {
        debug!(path = %request.uri().path(), "No access token supplied");
        metrics::record_authentication(metrics::OUTCOME_ANONYMOUS);
        return Ok(AuthOutcome::anonymous(AnonymousReason::MissingToken));
    };

    match lookup(token).await {
        TokenLookup::Resolved(token) => {
            let identity = Identity::from(&token);
            let headers = request.headers_mut();
            headers.insert(CALLER_ID_HEADER, identity.caller_id.into());
            headers.insert(CLIENT_ID_HEADER, identity.client_id.into());

            debug!(
                caller_id = identity.caller_id,
                client_id = identity.client_id,
                "Request authenticated"
            );
            metrics::record_authentication(metrics::OUTCOME_AUTHENTICATED);
            Ok(AuthOutcome::Authenticated(identity))
        }
        TokenLookup::NotFound(_) => {
            debug!(path = %request.uri().path(), "Unknown access token, continuing unauthenticated");
            metrics::record_authentication(metrics::OUTCOME_ANONYMOUS);
            Ok(AuthOutcome::anonymous(AnonymousReason::TokenNotFound))
        }
        TokenLookup::Failed(err) => {
            warn!(
                path = %request.uri().path(),
                status = err.status,
                message = %err.message,
                "Access token validation failed"
            );
            metrics::record_authentication(metrics::OUTCOME_FAILED);
            Err(err)
        }
    }
}
