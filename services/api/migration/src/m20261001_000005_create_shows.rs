use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shows::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shows::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Shows::EventId).uuid().not_null())
                    .col(
                        ColumnDef::new(Shows::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shows::EndsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Shows::SeatCapacity).integer().not_null())
                    .col(
                        ColumnDef::new(Shows::SeatsBooked)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shows::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // Seat counter can never leave [0, seat_capacity].
                    .check(Expr::cust(
                        "seats_booked >= 0 AND seats_booked <= seat_capacity",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Shows::Table, Shows::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Shows::Table)
                    .col(Shows::EventId)
                    .name("idx_shows_event_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shows::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Shows {
    Table,
    Id,
    EventId,
    StartsAt,
    EndsAt,
    SeatCapacity,
    SeatsBooked,
    CreatedAt,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
}
