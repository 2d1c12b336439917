use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marquee_domain::entry_pass::EntryPassStatus;

use crate::domain::types::EntryPass;
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody};
use crate::state::AppState;
use crate::usecase::entry_pass::{
    GetMyEntryPassUseCase, PurchaseEntryPassInput, PurchaseEntryPassUseCase,
};

#[derive(Serialize)]
pub struct EntryPassResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub head_count: i32,
    pub amount: i64,
    pub payment_id: String,
    pub transaction_info: serde_json::Value,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub purchased_at: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    pub status: EntryPassStatus,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<EntryPass> for EntryPassResponse {
    fn from(p: EntryPass) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            head_count: p.head_count,
            amount: p.amount,
            payment_id: p.payment_id,
            transaction_info: p.transaction_info,
            purchased_at: p.purchased_at,
            expires_at: p.expires_at,
            status: p.status,
            updated_at: p.updated_at,
        }
    }
}

/// `{ entry_pass }`, where the pass may be `null`.
#[derive(Serialize)]
pub struct EntryPassEnvelope {
    pub entry_pass: Option<EntryPassResponse>,
}

// ── POST /entrypass/purchase ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub head_count: i32,
    pub amount: i64,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub transaction_info: serde_json::Value,
}

pub async fn purchase(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PurchaseRequest>,
) -> Result<(StatusCode, Json<EntryPassEnvelope>), ApiError> {
    let usecase = PurchaseEntryPassUseCase {
        passes: state.entry_pass_repo(),
        settings: state.settings_repo(),
    };
    let pass = usecase
        .execute(
            auth.id(),
            PurchaseEntryPassInput {
                head_count: body.head_count,
                amount: body.amount,
                payment_id: body.payment_id,
                transaction_info: body.transaction_info,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(EntryPassEnvelope {
            entry_pass: Some(pass.into()),
        }),
    ))
}

// ── GET /entrypass/me ────────────────────────────────────────────────────────

pub async fn my_entry_pass(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<EntryPassEnvelope>, ApiError> {
    let usecase = GetMyEntryPassUseCase {
        passes: state.entry_pass_repo(),
    };
    let pass = usecase.execute(auth.id()).await?;
    Ok(Json(EntryPassEnvelope {
        entry_pass: pass.map(EntryPassResponse::from),
    }))
}
