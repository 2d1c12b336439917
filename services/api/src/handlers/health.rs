use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub version: &'static str,
}

// ── GET /api/v1/health ───────────────────────────────────────────────────────

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "API is running",
        version: env!("CARGO_PKG_VERSION"),
    })
}
