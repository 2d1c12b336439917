use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, Statement,
};
use uuid::Uuid;

use marquee_api_schema::{events, shows, tickets};
use marquee_domain::pagination::{Page, PageRequest};

use crate::domain::repository::EventRepository;
use crate::domain::types::{Event, EventFilter, Show};
use crate::error::ApiError;

use super::{fetch_page, from_json, parse_column, to_json};

/// Head count still holding capacity (everything but cancelled and refunded).
pub(super) const SEATS_TAKEN_SQL: &str = r#"
    SELECT COALESCE(SUM(head_count), 0)::BIGINT AS taken
    FROM tickets
    WHERE event_id = $1 AND status NOT IN ('cancelled', 'refunded')
"#;

#[derive(Debug, FromQueryResult)]
pub(super) struct SeatsTakenRow {
    pub taken: i64,
}

#[derive(Clone)]
pub struct DbEventRepository {
    pub db: DatabaseConnection,
}

impl EventRepository for DbEventRepository {
    async fn list(&self, filter: EventFilter, page: PageRequest) -> Result<Page<Event>, ApiError> {
        let mut select = events::Entity::find();
        if let Some(status) = filter.status {
            select = select.filter(events::Column::Status.eq(status.as_str()));
        }
        if let Some(exhibition_id) = filter.exhibition_id {
            select = select.filter(events::Column::ExhibitionId.eq(exhibition_id));
        }
        let select = select.order_by_asc(events::Column::StartDate);
        let page = fetch_page(select, &self.db, page, "list events").await?;
        let total = page.total;
        let items = page
            .items
            .into_iter()
            .map(event_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn list_by_exhibition(&self, exhibition_id: Uuid) -> Result<Vec<Event>, ApiError> {
        let models = events::Entity::find()
            .filter(events::Column::ExhibitionId.eq(exhibition_id))
            .order_by_asc(events::Column::StartDate)
            .all(&self.db)
            .await
            .context("list events by exhibition")?;
        models.into_iter().map(event_from_model).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ApiError> {
        let model = events::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find event by id")?;
        model.map(event_from_model).transpose()
    }

    async fn create(&self, event: &Event) -> Result<(), ApiError> {
        active_model(event)?
            .insert(&self.db)
            .await
            .context("create event")?;
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), ApiError> {
        let mut am = active_model(event)?;
        am.created_at = NotSet;
        // Maintained by the rating repository.
        am.average_rating = NotSet;
        am.update(&self.db).await.context("update event")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = events::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| ApiError::from_delete(e, ApiError::EventHasTickets, "delete event"))?;
        Ok(result.rows_affected > 0)
    }

    async fn count_tickets(&self, event_id: Uuid) -> Result<u64, ApiError> {
        let count = tickets::Entity::find()
            .filter(tickets::Column::EventId.eq(event_id))
            .count(&self.db)
            .await
            .context("count event tickets")?;
        Ok(count)
    }

    async fn seats_taken(&self, event_id: Uuid) -> Result<i64, ApiError> {
        let row = SeatsTakenRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            SEATS_TAKEN_SQL,
            [event_id.into()],
        ))
        .one(&self.db)
        .await
        .context("sum seats taken")?;
        Ok(row.map(|r| r.taken).unwrap_or(0))
    }

    async fn list_shows(&self, event_id: Uuid) -> Result<Vec<Show>, ApiError> {
        let models = shows::Entity::find()
            .filter(shows::Column::EventId.eq(event_id))
            .order_by_asc(shows::Column::StartsAt)
            .all(&self.db)
            .await
            .context("list shows")?;
        Ok(models.into_iter().map(show_from_model).collect())
    }

    async fn find_show(&self, show_id: Uuid) -> Result<Option<Show>, ApiError> {
        let model = shows::Entity::find_by_id(show_id)
            .one(&self.db)
            .await
            .context("find show by id")?;
        Ok(model.map(show_from_model))
    }

    async fn create_show(&self, show: &Show) -> Result<(), ApiError> {
        shows::ActiveModel {
            id: Set(show.id),
            event_id: Set(show.event_id),
            starts_at: Set(show.starts_at),
            ends_at: Set(show.ends_at),
            seat_capacity: Set(show.seat_capacity),
            seats_booked: Set(show.seats_booked),
            created_at: Set(show.created_at),
        }
        .insert(&self.db)
        .await
        .context("create show")?;
        Ok(())
    }
}

fn active_model(event: &Event) -> Result<events::ActiveModel, ApiError> {
    Ok(events::ActiveModel {
        id: Set(event.id),
        title: Set(event.title.clone()),
        description: Set(event.description.clone()),
        start_date: Set(event.start_date),
        end_date: Set(event.end_date),
        venue: Set(event.venue.clone()),
        category_id: Set(event.category_id),
        exhibition_id: Set(event.exhibition_id),
        price: Set(event.price),
        capacity: Set(event.capacity),
        status: Set(event.status.as_str().to_owned()),
        image: Set(event.image.clone()),
        gallery: Set(to_json(&event.gallery, "events.gallery")?),
        tags: Set(to_json(&event.tags, "events.tags")?),
        features: Set(to_json(&event.features, "events.features")?),
        terms: Set(event.terms.clone()),
        organizer_id: Set(event.organizer_id),
        average_rating: Set(event.average_rating),
        created_at: Set(event.created_at),
        updated_at: Set(event.updated_at),
    })
}

fn event_from_model(model: events::Model) -> Result<Event, ApiError> {
    Ok(Event {
        id: model.id,
        title: model.title,
        description: model.description,
        start_date: model.start_date,
        end_date: model.end_date,
        venue: model.venue,
        category_id: model.category_id,
        exhibition_id: model.exhibition_id,
        price: model.price,
        capacity: model.capacity,
        status: parse_column(&model.status, "events.status")?,
        image: model.image,
        gallery: from_json(model.gallery, "events.gallery")?,
        tags: from_json(model.tags, "events.tags")?,
        features: from_json(model.features, "events.features")?,
        terms: model.terms,
        organizer_id: model.organizer_id,
        average_rating: model.average_rating,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn show_from_model(model: shows::Model) -> Show {
    Show {
        id: model.id,
        event_id: model.event_id,
        starts_at: model.starts_at,
        ends_at: model.ends_at,
        seat_capacity: model.seat_capacity,
        seats_booked: model.seats_booked,
        created_at: model.created_at,
    }
}
