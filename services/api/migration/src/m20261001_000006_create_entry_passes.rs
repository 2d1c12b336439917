use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EntryPasses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntryPasses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EntryPasses::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(EntryPasses::HeadCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(EntryPasses::Amount).big_integer().not_null())
                    .col(ColumnDef::new(EntryPasses::PaymentId).string().not_null())
                    .col(
                        ColumnDef::new(EntryPasses::TransactionInfo)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(EntryPasses::PurchasedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EntryPasses::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EntryPasses::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(EntryPasses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(EntryPasses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::cust("head_count >= 0"))
                    .foreign_key(
                        ForeignKey::create()
                            .from(EntryPasses::Table, EntryPasses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(EntryPasses::Table)
                    .col(EntryPasses::UserId)
                    .col(EntryPasses::Status)
                    .name("idx_entry_passes_user_id_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntryPasses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EntryPasses {
    Table,
    Id,
    UserId,
    HeadCount,
    Amount,
    PaymentId,
    TransactionInfo,
    PurchasedAt,
    ExpiresAt,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
