//! sea-orm implementations of the domain repositories.

mod category;
mod entry_pass;
mod event;
mod exhibition;
mod payment;
mod rating;
mod settings;
mod stats;
mod ticket;
mod user;

use std::str::FromStr;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait, PaginatorTrait, QuerySelect,
    Select,
};

use marquee_api_schema::outbox_events;
use marquee_domain::pagination::{Page, PageRequest};

use crate::domain::types::OutboxEvent;
use crate::error::ApiError;

pub use category::DbCategoryRepository;
pub use entry_pass::DbEntryPassRepository;
pub use event::DbEventRepository;
pub use exhibition::DbExhibitionRepository;
pub use payment::DbPaymentRepository;
pub use rating::DbRatingRepository;
pub use settings::DbSettingsRepository;
pub use stats::DbStatsRepository;
pub use ticket::DbTicketRepository;
pub use user::DbUserRepository;

/// Parse a stored enum column. A value outside the enum means a corrupt row.
fn parse_column<T>(value: &str, column: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("decode {column}"))
}

fn from_json<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    column: &'static str,
) -> anyhow::Result<T> {
    serde_json::from_value(value).with_context(|| format!("decode {column}"))
}

fn to_json<T: serde::Serialize>(
    value: &T,
    column: &'static str,
) -> anyhow::Result<serde_json::Value> {
    serde_json::to_value(value).with_context(|| format!("encode {column}"))
}

/// Count the full selection, then fetch one page of it.
async fn fetch_page<'db, E, C>(
    select: Select<E>,
    db: &'db C,
    page: PageRequest,
    what: &'static str,
) -> Result<Page<E::Model>, ApiError>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'db,
    C: ConnectionTrait,
{
    let page = page.clamped();
    let total = select.clone().count(db).await.context(what)?;
    let items = select
        .offset(page.offset())
        .limit(u64::from(page.limit))
        .all(db)
        .await
        .context(what)?;
    Ok(Page::new(items, total))
}

async fn insert_outbox_event<C: ConnectionTrait>(
    conn: &C,
    event: &OutboxEvent,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(conn)
    .await?;
    Ok(())
}
