use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PhoneNumber).string())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Users::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::EmailVerificationTokenHash).string())
                    .col(
                        ColumnDef::new(Users::EmailVerificationExpiresAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(Users::ResetPasswordTokenHash).string())
                    .col(ColumnDef::new(Users::ResetPasswordExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::QrCode).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::LastLoginAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Token lookups hash the presented token and match on these columns.
        manager
            .create_index(
                Index::create()
                    .table(Users::Table)
                    .col(Users::EmailVerificationTokenHash)
                    .name("idx_users_email_verification_token_hash")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Users::Table)
                    .col(Users::ResetPasswordTokenHash)
                    .name("idx_users_reset_password_token_hash")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PhoneNumber,
    PasswordHash,
    Role,
    Status,
    EmailVerified,
    EmailVerificationTokenHash,
    EmailVerificationExpiresAt,
    ResetPasswordTokenHash,
    ResetPasswordExpiresAt,
    QrCode,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}
