use chrono::Utc;

use marquee_domain::settings::{EmailProvider, SmsProvider};

use crate::domain::repository::SettingsRepository;
use crate::domain::types::Settings;
use crate::domain::validation::Validator;
use crate::error::ApiError;

// ── GetSettings ──────────────────────────────────────────────────────────────

pub struct GetSettingsUseCase<S: SettingsRepository> {
    pub repo: S,
}

impl<S: SettingsRepository> GetSettingsUseCase<S> {
    /// The stored row, or the defaults when none has been saved yet.
    pub async fn execute(&self) -> Result<Settings, ApiError> {
        Ok(self.repo.get().await?.unwrap_or_default())
    }
}

// ── UpdateSettings ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateSettingsInput {
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

pub struct UpdateSettingsUseCase<S: SettingsRepository> {
    pub repo: S,
}

impl<S: SettingsRepository> UpdateSettingsUseCase<S> {
    pub async fn execute(&self, input: UpdateSettingsInput) -> Result<Settings, ApiError> {
        let mut v = Validator::new();
        v.optional_text("site_name", input.site_name.as_deref(), 100)
            .max_len("description", input.description.as_deref(), 500)
            .optional_text(
                "maintenance_message",
                input.maintenance_message.as_deref(),
                500,
            )
            .check(
                input.entry_pass_expiration_days.is_none_or(|d| d >= 1),
                "entry_pass_expiration_days must be at least 1",
            );
        if let Some(ref email) = input.contact_email {
            v.email("contact_email", email);
        }
        if let Some(ref email) = input.email_from {
            v.email("email_from", email);
        }
        v.finish()?;

        let mut settings = self.repo.get().await?.unwrap_or_default();
        if let Some(value) = input.site_name {
            settings.site_name = value;
        }
        if let Some(value) = input.contact_email {
            settings.contact_email = value;
        }
        if let Some(value) = input.enable_qr_scanning {
            settings.enable_qr_scanning = value;
        }
        if let Some(value) = input.require_email_verification {
            settings.require_email_verification = value;
        }
        if let Some(value) = input.allow_ticket_transfers {
            settings.allow_ticket_transfers = value;
        }
        if let Some(value) = input.enable_email_notifications {
            settings.enable_email_notifications = value;
        }
        if let Some(value) = input.enable_sms_notifications {
            settings.enable_sms_notifications = value;
        }
        if let Some(value) = input.sms_provider {
            settings.sms_provider = value;
        }
        if let Some(value) = input.email_provider {
            settings.email_provider = value;
        }
        if let Some(value) = input.maintenance_mode {
            settings.maintenance_mode = value;
        }
        if let Some(value) = input.maintenance_message {
            settings.maintenance_message = value;
        }
        if let Some(value) = input.entry_pass_expiration_days {
            settings.entry_pass_expiration_days = value;
        }
        if input.description.is_some() {
            settings.description = input.description;
        }
        if input.email_from.is_some() {
            settings.email_from = input.email_from;
        }
        settings.updated_at = Utc::now();
        self.repo.upsert(&settings).await?;
        tracing::info!(maintenance_mode = settings.maintenance_mode, "settings updated");
        Ok(settings)
    }
}
