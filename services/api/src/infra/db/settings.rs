use anyhow::Context as _;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait, sea_query::OnConflict};

use marquee_api_schema::settings;

use crate::domain::repository::SettingsRepository;
use crate::domain::types::Settings;
use crate::error::ApiError;

use super::parse_column;

/// Primary key of the only settings row.
const SETTINGS_ID: i32 = 1;

#[derive(Clone)]
pub struct DbSettingsRepository {
    pub db: DatabaseConnection,
}

impl SettingsRepository for DbSettingsRepository {
    async fn get(&self) -> Result<Option<Settings>, ApiError> {
        let model = settings::Entity::find_by_id(SETTINGS_ID)
            .one(&self.db)
            .await
            .context("find settings")?;
        model.map(settings_from_model).transpose()
    }

    async fn upsert(&self, s: &Settings) -> Result<(), ApiError> {
        let am = settings::ActiveModel {
            id: Set(SETTINGS_ID),
            site_name: Set(s.site_name.clone()),
            contact_email: Set(s.contact_email.clone()),
            description: Set(s.description.clone()),
            enable_qr_scanning: Set(s.enable_qr_scanning),
            require_email_verification: Set(s.require_email_verification),
            allow_ticket_transfers: Set(s.allow_ticket_transfers),
            enable_email_notifications: Set(s.enable_email_notifications),
            enable_sms_notifications: Set(s.enable_sms_notifications),
            sms_provider: Set(s.sms_provider.as_str().to_owned()),
            email_provider: Set(s.email_provider.as_str().to_owned()),
            email_from: Set(s.email_from.clone()),
            maintenance_mode: Set(s.maintenance_mode),
            maintenance_message: Set(s.maintenance_message.clone()),
            entry_pass_expiration_days: Set(s.entry_pass_expiration_days),
            updated_at: Set(s.updated_at),
        };
        settings::Entity::insert(am)
            .on_conflict(
                OnConflict::column(settings::Column::Id)
                    .update_columns([
                        settings::Column::SiteName,
                        settings::Column::ContactEmail,
                        settings::Column::Description,
                        settings::Column::EnableQrScanning,
                        settings::Column::RequireEmailVerification,
                        settings::Column::AllowTicketTransfers,
                        settings::Column::EnableEmailNotifications,
                        settings::Column::EnableSmsNotifications,
                        settings::Column::SmsProvider,
                        settings::Column::EmailProvider,
                        settings::Column::EmailFrom,
                        settings::Column::MaintenanceMode,
                        settings::Column::MaintenanceMessage,
                        settings::Column::EntryPassExpirationDays,
                        settings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert settings")?;
        Ok(())
    }
}

fn settings_from_model(model: settings::Model) -> Result<Settings, ApiError> {
    Ok(Settings {
        site_name: model.site_name,
        contact_email: model.contact_email,
        description: model.description,
        enable_qr_scanning: model.enable_qr_scanning,
        require_email_verification: model.require_email_verification,
        allow_ticket_transfers: model.allow_ticket_transfers,
        enable_email_notifications: model.enable_email_notifications,
        enable_sms_notifications: model.enable_sms_notifications,
        sms_provider: parse_column(&model.sms_provider, "settings.sms_provider")?,
        email_provider: parse_column(&model.email_provider, "settings.email_provider")?,
        email_from: model.email_from,
        maintenance_mode: model.maintenance_mode,
        maintenance_message: model.maintenance_message,
        entry_pass_expiration_days: model.entry_pass_expiration_days,
        updated_at: model.updated_at,
    })
}
