use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use marquee_api::config::ApiConfig;
use marquee_api::infra::gateway::MockPaymentGateway;
use marquee_api::router::build_router;
use marquee_api::state::AppState;
use marquee_auth::identity::JwtSecret;
use marquee_core::middleware::SecurityHeaders;
use marquee_core::rate_limit::RateLimiter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    marquee_core::tracing::init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let rate_limiter = match config.redis_url.as_deref() {
        Some(url) => {
            let pool = deadpool_redis::Config::from_url(url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .expect("failed to create Redis pool");
            RateLimiter::redis(pool)
        }
        None => RateLimiter::in_memory(),
    };

    let state = AppState {
        db,
        jwt_secret: JwtSecret::new(config.jwt_secret.as_str()),
        jwt_expires_secs: config.jwt_expires_secs,
        gateway: MockPaymentGateway::new(config.payment_secret.as_str()),
        rate_limiter,
        public_base_url: Arc::from(config.public_base_url.trim_end_matches('/')),
        security_headers: SecurityHeaders {
            hsts: config.is_production(),
        },
        cors_allowed_origins: config.cors_allowed_origins.as_deref().map(Arc::from),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(environment = %config.environment, "api listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
