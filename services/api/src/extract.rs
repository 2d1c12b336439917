//! Request extractors layered on top of the bearer `Identity`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;

use marquee_auth::guard::require_role;
use marquee_auth::identity::Identity;
use marquee_domain::user::UserRole;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, loaded fresh from the database.
///
/// Rejects with 401 when the token is missing or invalid, the account no longer
/// exists, or it is not `active`. Role checks use the stored role, not the claim.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> uuid::Uuid {
        self.0.id
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == UserRole::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        require_role(self.0.role, UserRole::Admin).map_err(ApiError::from)
    }

    /// Staff or admin.
    pub fn require_staff(&self) -> Result<(), ApiError> {
        require_role(self.0.role, UserRole::Staff).map_err(ApiError::from)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        let user = state
            .user_repo()
            .find_by_id(identity.user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        if !user.is_active() {
            tracing::debug!(user_id = %user.id, status = %user.status, "rejected inactive account");
            return Err(ApiError::Unauthorized);
        }
        Ok(Self(user))
    }
}

/// `Json` whose rejections (bad syntax, wrong types, missing fields) come back
/// as a 400 validation error in the usual envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid(rejection.body_text())
    }
}

/// `Query` that rejects unparsable parameters like [`JsonBody`] does.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid(rejection.body_text())
    }
}

/// `Path` whose segments failing to parse (a bad UUID, say) are a 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => Self::invalid(e.body_text()),
            other => Self::Internal(anyhow::anyhow!("path extraction: {}", other.body_text())),
        }
    }
}
