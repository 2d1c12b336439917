use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users;
mod m20261001_000002_create_categories;
mod m20261001_000003_create_exhibitions;
mod m20261001_000004_create_events;
mod m20261001_000005_create_shows;
mod m20261001_000006_create_entry_passes;
mod m20261001_000007_create_tickets;
mod m20261001_000008_create_payments;
mod m20261001_000009_create_ratings;
mod m20261001_000010_create_settings;
mod m20261001_000011_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users::Migration),
            Box::new(m20261001_000002_create_categories::Migration),
            Box::new(m20261001_000003_create_exhibitions::Migration),
            Box::new(m20261001_000004_create_events::Migration),
            Box::new(m20261001_000005_create_shows::Migration),
            Box::new(m20261001_000006_create_entry_passes::Migration),
            Box::new(m20261001_000007_create_tickets::Migration),
            Box::new(m20261001_000008_create_payments::Migration),
            Box::new(m20261001_000009_create_ratings::Migration),
            Box::new(m20261001_000010_create_settings::Migration),
            Box::new(m20261001_000011_create_outbox_events::Migration),
        ]
    }
}
