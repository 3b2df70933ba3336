//! Request extractors: validated JSON bodies and the authenticated caller.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::infrastructure::auth::Claims;
use crate::use_cases::Actor;

use super::error::ApiError;

/// A JSON body that has passed its `validator` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Claims of the caller, placed in the request extensions by
/// [`require_auth`](super::middleware::require_auth).
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.0.user_id(),
            is_admin: self.0.is_admin,
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(ApiError::unauthorized)
    }
}

/// An authenticated caller whose token says they are an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin {
            tracing::warn!(user_id = claims.id, "Non-admin attempted an admin operation");
            return Err(ApiError::admin_required());
        }
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    fn claims(is_admin: bool) -> Claims {
        Claims {
            id: 7,
            username: "mordenkainen".into(),
            is_admin,
            preferred_edition_id: None,
            iat: 0,
            exp: i64::MAX,
        }
    }

    async fn admin_only(AdminUser(claims): AdminUser) -> String {
        claims.username
    }

    async fn status_for(claims: Option<Claims>) -> StatusCode {
        let app = Router::new().route("/", get(admin_only));
        let mut request = Request::builder().uri("/").body(Body::empty()).expect("request");
        if let Some(claims) = claims {
            request.extensions_mut().insert(claims);
        }
        app.oneshot(request).await.expect("response").status()
    }

    #[tokio::test]
    async fn admin_extractor_checks_the_role() {
        assert_eq!(status_for(Some(claims(true))).await, StatusCode::OK);
        assert_eq!(status_for(Some(claims(false))).await, StatusCode::FORBIDDEN);
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn actor_carries_id_and_role() {
        let actor = AuthUser(claims(false)).actor();
        assert_eq!(actor.user_id.get(), 7);
        assert!(!actor.is_admin);
    }
}
