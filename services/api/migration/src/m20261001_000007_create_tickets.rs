use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tickets::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Tickets::TicketNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Tickets::QrCode).string().unique_key())
                    .col(ColumnDef::new(Tickets::PurchasedBy).uuid().not_null())
                    .col(ColumnDef::new(Tickets::IssuedBy).uuid().not_null())
                    .col(ColumnDef::new(Tickets::EventId).uuid().not_null())
                    .col(ColumnDef::new(Tickets::ShowId).uuid())
                    .col(
                        ColumnDef::new(Tickets::HeadCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Tickets::Attendees)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Tickets::TotalAmount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Tickets::PaymentStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Tickets::PaymentId).uuid())
                    .col(ColumnDef::new(Tickets::EntryPassId).uuid())
                    .col(
                        ColumnDef::new(Tickets::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Tickets::PurchaseDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tickets::VerifiedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Tickets::VerifiedBy).uuid())
                    .col(ColumnDef::new(Tickets::AttendedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Tickets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::cust("head_count >= 1"))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tickets::Table, Tickets::EventId)
                            .to(Events::Table, Events::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tickets::Table, Tickets::ShowId)
                            .to(Shows::Table, Shows::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tickets::Table, Tickets::PurchasedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tickets::Table, Tickets::EntryPassId)
                            .to(EntryPasses::Table, EntryPasses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Tickets::Table)
                    .col(Tickets::PurchasedBy)
                    .col(Tickets::PurchaseDate)
                    .name("idx_tickets_purchased_by_purchase_date")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Tickets::Table)
                    .col(Tickets::EventId)
                    .col(Tickets::Status)
                    .name("idx_tickets_event_id_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Tickets {
    Table,
    Id,
    TicketNumber,
    QrCode,
    PurchasedBy,
    IssuedBy,
    EventId,
    ShowId,
    HeadCount,
    Attendees,
    TotalAmount,
    PaymentStatus,
    PaymentId,
    EntryPassId,
    Status,
    PurchaseDate,
    VerifiedAt,
    VerifiedBy,
    AttendedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
}

#[derive(Iden)]
enum Shows {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum EntryPasses {
    Table,
    Id,
}
