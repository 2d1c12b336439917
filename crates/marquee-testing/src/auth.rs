//! Mock auth helpers for router tests.
//!
//! `MockAuth` signs a real access token with the test secret so requests pass
//! through the same `Identity` extractor as production traffic.

use axum::http::{HeaderMap, HeaderValue, header};
use uuid::Uuid;

use marquee_auth::token::issue_access_token;
use marquee_domain::user::UserRole;

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn customer() -> Self {
        Self::new(Uuid::now_v7(), UserRole::Customer)
    }

    pub fn admin() -> Self {
        Self::new(Uuid::now_v7(), UserRole::Admin)
    }

    /// Signed bearer token valid for one hour.
    pub fn token(&self, secret: &str) -> String {
        let (token, _) = issue_access_token(self.user_id, self.role.as_u8(), secret, 3600)
            .expect("sign test token");
        token
    }

    /// `Authorization: Bearer <token>` value for `axum-test` requests.
    pub fn bearer(&self, secret: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token(secret)))
            .expect("token is a valid header value")
    }

    /// Return headers carrying the bearer token.
    pub fn headers(&self, secret: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, self.bearer(secret));
        map
    }
}
