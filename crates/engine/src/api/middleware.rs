//! Bearer-token gate in front of every route.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    middleware::Next,
    response::Response,
};

use crate::app::App;

use super::error::ApiError;

const PUBLIC_PATHS: &[&str] = &["/health", "/api/health", "/api/auth/login", "/api/auth/register"];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path.trim_end_matches('/'))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Verify the bearer token and store its claims in the request extensions.
///
/// Only the signature and expiry are checked here; handlers that need the
/// stored user read it themselves.
pub async fn require_auth(
    State(app): State<Arc<App>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS || is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers()).ok_or_else(ApiError::unauthorized)?;
    let claims = app.tokens.verify(token).map_err(|e| {
        tracing::warn!(error = %e, path = %request.uri().path(), "Rejected bearer token");
        ApiError::invalid_token()
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn public_paths_skip_the_gate() {
        assert!(is_public("/api/health"));
        assert!(is_public("/api/auth/login/"));
        assert!(!is_public("/api/auth/me"));
        assert!(!is_public("/api/spells"));
    }

    #[test]
    fn bearer_token_requires_the_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }
}
