use marquee_auth::token::ACCESS_TOKEN_EXP;

const DEFAULT_PAYMENT_SECRET: &str = "mock_payment_secret_key";

/// API service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    /// Access-token lifetime in seconds. Env var: `JWT_EXPIRES_SECS`.
    pub jwt_expires_secs: u64,
    /// TCP port to listen on (default 5000). Env var: `API_PORT`.
    pub api_port: u16,
    /// Redis URL for shared rate-limit counters. In-process counters when unset.
    pub redis_url: Option<String>,
    /// HMAC key the mock payment gateway signs with.
    pub payment_secret: String,
    /// Base URL for links placed in outgoing mail (verification, reset).
    pub public_base_url: String,
    /// `production` enables HSTS. Env var: `RUST_ENV`.
    pub environment: String,
    /// Comma-separated CORS origins. Env var: `CORS_ALLOWED_ORIGINS`.
    pub cors_allowed_origins: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            jwt_expires_secs: std::env::var("JWT_EXPIRES_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(ACCESS_TOKEN_EXP),
            api_port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            payment_secret: std::env::var("PAYMENT_SECRET")
                .unwrap_or_else(|_| DEFAULT_PAYMENT_SECRET.to_owned()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_owned()),
            environment: std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_owned()),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS").ok(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
