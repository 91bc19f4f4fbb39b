//! Header-local helpers: trust header sanitization, identity extraction and
//! publicity classification.
//!
//! None of these fail. Missing or malformed input degrades to a safe value
//! (`0` for identifiers, `true` for publicity of an absent request).

use axum::http::{HeaderMap, Request, Uri};
use url::form_urlencoded;

/// Header marking a request as coming from outside the internal network.
pub const PUBLIC_HEADER: &str = "x-public";

/// Trusted client identifier, only ever written after successful validation.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Trusted caller identifier, only ever written after successful validation.
pub const CALLER_ID_HEADER: &str = "x-caller-id";

/// Query parameter carrying the access token.
pub const ACCESS_TOKEN_QUERY: &str = "access_token";

/// Remove any trust headers a caller tried to smuggle in.
pub fn clean_request<B>(request: Option<&mut Request<B>>) {
    if let Some(request) = request {
        strip_trust_headers(request.headers_mut());
    }
}

fn strip_trust_headers(headers: &mut HeaderMap) {
    // `remove` drops every value stored under the name
    headers.remove(CLIENT_ID_HEADER);
    headers.remove(CALLER_ID_HEADER);
}

/// Whether the request is public. An absent request counts as public.
pub fn is_public<B>(request: Option<&Request<B>>) -> bool {
    request.is_none_or(|r| r.headers().is_public())
}

/// Caller id from `X-Caller-Id`, or 0.
pub fn caller_id<B>(request: Option<&Request<B>>) -> i64 {
    request.map_or(0, |r| r.headers().caller_id())
}

/// Client id from `X-Client-Id`, or 0.
pub fn client_id<B>(request: Option<&Request<B>>) -> i64 {
    request.map_or(0, |r| r.headers().client_id())
}

/// Extension trait to read trusted identity from a request or its headers.
pub trait CallerContextExt {
    fn caller_id(&self) -> i64;
    fn client_id(&self) -> i64;
    fn is_public(&self) -> bool;
}

impl CallerContextExt for HeaderMap {
    fn caller_id(&self) -> i64 {
        parse_id(self, CALLER_ID_HEADER)
    }

    fn client_id(&self) -> i64 {
        parse_id(self, CLIENT_ID_HEADER)
    }

    fn is_public(&self) -> bool {
        self.get(PUBLIC_HEADER)
            .is_some_and(|v| v.as_bytes() == b"true")
    }
}

impl<B> CallerContextExt for Request<B> {
    fn caller_id(&self) -> i64 {
        self.headers().caller_id()
    }

    fn client_id(&self) -> i64 {
        self.headers().client_id()
    }

    fn is_public(&self) -> bool {
        self.headers().is_public()
    }
}

fn parse_id(headers: &HeaderMap, name: &str) -> i64 {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Extract the access token from the query string.
///
/// Takes the first `access_token` pair, form-decoded and trimmed. Returns
/// `None` when it is missing or blank.
pub(crate) fn access_token(uri: &Uri) -> Option<String> {
    let query = uri.query()?;

    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| *key == ACCESS_TOKEN_QUERY)
        .map(|(_, value)| value.trim().to_string())
        .filter(|token| !token.is_empty())
}
