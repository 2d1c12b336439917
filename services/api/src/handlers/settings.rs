use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marquee_domain::settings::{EmailProvider, SmsProvider};

use crate::domain::types::Settings;
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody};
use crate::state::AppState;
use crate::usecase::settings::{GetSettingsUseCase, UpdateSettingsInput, UpdateSettingsUseCase};

#[derive(Serialize)]
pub struct SettingsResponse {
    pub site_name: String,
    pub contact_email: String,
    pub description: Option<String>,
    pub enable_qr_scanning: bool,
    pub require_email_verification: bool,
    pub allow_ticket_transfers: bool,
    pub enable_email_notifications: bool,
    pub enable_sms_notifications: bool,
    pub sms_provider: SmsProvider,
    pub email_provider: EmailProvider,
    pub email_from: Option<String>,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
    pub entry_pass_expiration_days: i32,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Settings> for SettingsResponse {
    fn from(s: Settings) -> Self {
        Self {
            site_name: s.site_name,
            contact_email: s.contact_email,
            description: s.description,
            enable_qr_scanning: s.enable_qr_scanning,
            require_email_verification: s.require_email_verification,
            allow_ticket_transfers: s.allow_ticket_transfers,
            enable_email_notifications: s.enable_email_notifications,
            enable_sms_notifications: s.enable_sms_notifications,
            sms_provider: s.sms_provider,
            email_provider: s.email_provider,
            email_from: s.email_from,
            maintenance_mode: s.maintenance_mode,
            maintenance_message: s.maintenance_message,
            entry_pass_expiration_days: s.entry_pass_expiration_days,
            updated_at: s.updated_at,
        }
    }
}

// ── GET /admin/settings ──────────────────────────────────────────────────────

pub async fn get_settings(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = GetSettingsUseCase {
        repo: state.settings_repo(),
    };
    Ok(Json(usecase.execute().await?.into()))
}

// ── PUT /admin/settings ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub site_name: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub enable_qr_scanning: Option<bool>,
    pub require_email_verification: Option<bool>,
    pub allow_ticket_transfers: Option<bool>,
    pub enable_email_notifications: Option<bool>,
    pub enable_sms_notifications: Option<bool>,
    pub sms_provider: Option<SmsProvider>,
    pub email_provider: Option<EmailProvider>,
    pub email_from: Option<String>,
    pub maintenance_mode: Option<bool>,
    pub maintenance_message: Option<String>,
    pub entry_pass_expiration_days: Option<i32>,
}

pub async fn update_settings(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = UpdateSettingsUseCase {
        repo: state.settings_repo(),
    };
    let settings = usecase
        .execute(UpdateSettingsInput {
            site_name: body.site_name,
            contact_email: body.contact_email,
            description: body.description,
            enable_qr_scanning: body.enable_qr_scanning,
            require_email_verification: body.require_email_verification,
            allow_ticket_transfers: body.allow_ticket_transfers,
            enable_email_notifications: body.enable_email_notifications,
            enable_sms_notifications: body.enable_sms_notifications,
            sms_provider: body.sms_provider,
            email_provider: body.email_provider,
            email_from: body.email_from,
            maintenance_mode: body.maintenance_mode,
            maintenance_message: body.maintenance_message,
            entry_pass_expiration_days: body.entry_pass_expiration_days,
        })
        .await?;
    Ok(Json(settings.into()))
}
