//! Bearer-token identity extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::HeaderMap;
use http::request::Parts;
use uuid::Uuid;

use marquee_core::error::AppError;
use marquee_domain::user::UserRole;

use crate::token::validate_access_token;

/// HMAC secret used to validate access tokens. Expose it from service state via `FromRef`.
#[derive(Clone)]
pub struct JwtSecret(pub Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

/// Caller identity read from `Authorization: Bearer <jwt>`.
///
/// Returns 401 if the header is absent, the token fails validation, or the role
/// claim is unknown. Account-state and role enforcement happen after extraction.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Pull the raw bearer token out of the request headers.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_owned())
}

impl<S> FromRequestParts<S> for Identity
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract values synchronously and return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer_token(&parts.headers);
        let secret = JwtSecret::from_ref(state);

        async move {
            let token = token.ok_or(AppError::Unauthorized)?;
            let info = validate_access_token(&token, &secret.0).map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                AppError::Unauthorized
            })?;
            let role = UserRole::from_u8(info.user_role).ok_or(AppError::Unauthorized)?;
            Ok(Self {
                user_id: info.user_id,
                role,
            })
        }
    }
}
