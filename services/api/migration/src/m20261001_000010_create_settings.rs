use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::SiteName).string_len(100).not_null())
                    .col(ColumnDef::new(Settings::ContactEmail).string().not_null())
                    .col(ColumnDef::new(Settings::Description).string_len(500))
                    .col(
                        ColumnDef::new(Settings::EnableQrScanning)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Settings::RequireEmailVerification)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Settings::AllowTicketTransfers)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Settings::EnableEmailNotifications)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Settings::EnableSmsNotifications)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Settings::SmsProvider)
                            .string()
                            .not_null()
                            .default("none"),
                    )
                    .col(
                        ColumnDef::new(Settings::EmailProvider)
                            .string()
                            .not_null()
                            .default("smtp"),
                    )
                    .col(ColumnDef::new(Settings::EmailFrom).string())
                    .col(
                        ColumnDef::new(Settings::MaintenanceMode)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Settings::MaintenanceMessage).string().not_null())
                    .col(
                        ColumnDef::new(Settings::EntryPassExpirationDays)
                            .integer()
                            .not_null()
                            .default(30),
                    )
                    .col(
                        ColumnDef::new(Settings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // Singleton row.
                    .check(Expr::cust("id = 1"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Settings {
    Table,
    Id,
    SiteName,
    ContactEmail,
    Description,
    EnableQrScanning,
    RequireEmailVerification,
    AllowTicketTransfers,
    EnableEmailNotifications,
    EnableSmsNotifications,
    SmsProvider,
    EmailProvider,
    EmailFrom,
    MaintenanceMode,
    MaintenanceMessage,
    EntryPassExpirationDays,
    UpdatedAt,
}
