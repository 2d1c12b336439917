use sea_orm::entity::prelude::*;

/// Site-wide settings. The table holds at most one row, `id = 1`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub site_name: String,
    pub contact_email: String,
    pub description: Option<String>,
    pub enable_qr_scanning: bool,
    pub require_email_verification: bool,
    pub allow_ticket_transfers: bool,
    pub enable_email_notifications: bool,
    pub enable_sms_notifications: bool,
    pub sms_provider: String,
    pub email_provider: String,
    pub email_from: Option<String>,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
    pub entry_pass_expiration_days: i32,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
