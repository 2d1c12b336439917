use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Exhibitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Exhibitions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Exhibitions::Name).string().not_null())
                    .col(ColumnDef::new(Exhibitions::Description).text().not_null())
                    .col(
                        ColumnDef::new(Exhibitions::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Exhibitions::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Exhibitions::VenueName).string().not_null())
                    .col(ColumnDef::new(Exhibitions::VenueAddress).string().not_null())
                    .col(ColumnDef::new(Exhibitions::VenueCity).string().not_null())
                    .col(ColumnDef::new(Exhibitions::VenueState).string().not_null())
                    .col(ColumnDef::new(Exhibitions::VenuePincode).string().not_null())
                    .col(ColumnDef::new(Exhibitions::VenueLatitude).double())
                    .col(ColumnDef::new(Exhibitions::VenueLongitude).double())
                    .col(ColumnDef::new(Exhibitions::MapLayout).text())
                    .col(ColumnDef::new(Exhibitions::OrganizerId).uuid())
                    .col(
                        ColumnDef::new(Exhibitions::Status)
                            .string()
                            .not_null()
                            .default("upcoming"),
                    )
                    .col(
                        ColumnDef::new(Exhibitions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Exhibitions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Exhibitions::Table)
                    .col(Exhibitions::StartDate)
                    .name("idx_exhibitions_start_date")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Exhibitions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Exhibitions {
    Table,
    Id,
    Name,
    Description,
    StartDate,
    EndDate,
    VenueName,
    VenueAddress,
    VenueCity,
    VenueState,
    VenuePincode,
    VenueLatitude,
    VenueLongitude,
    MapLayout,
    OrganizerId,
    Status,
    CreatedAt,
    UpdatedAt,
}
