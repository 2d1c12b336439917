use chrono::{DateTime, Utc};
use uuid::Uuid;

use marquee_domain::event::EventStatus;
use marquee_domain::pagination::{Page, PageRequest};

use crate::domain::repository::EventRepository;
use crate::domain::types::{Event, EventFilter, Show};
use crate::domain::validation::Validator;
use crate::error::ApiError;

fn validate_event(event: &Event) -> Result<(), ApiError> {
    Validator::new()
        .text("title", &event.title, 100)
        .text("description", &event.description, 2000)
        .text("venue", &event.venue, 200)
        .date_order(
            event.start_date,
            event.end_date,
            "end_date must not be before start_date",
        )
        .check(event.price >= 0, "price must not be negative")
        .check(event.capacity >= 1, "capacity must be at least 1")
        .max_len("terms", event.terms.as_deref(), 1000)
        .finish()
}

// ── ListEvents ───────────────────────────────────────────────────────────────

pub struct ListEventsUseCase<R: EventRepository> {
    pub repo: R,
}

impl<R: EventRepository> ListEventsUseCase<R> {
    pub async fn execute(
        &self,
        filter: EventFilter,
        page: PageRequest,
    ) -> Result<Page<Event>, ApiError> {
        self.repo.list(filter, page.clamped()).await
    }
}

// ── GetEvent ─────────────────────────────────────────────────────────────────

pub struct GetEventUseCase<R: EventRepository> {
    pub repo: R,
}

impl<R: EventRepository> GetEventUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(Event, Vec<Show>), ApiError> {
        let event = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::EventNotFound)?;
        let shows = self.repo.list_shows(id).await?;
        Ok((event, shows))
    }
}

// ── CreateEvent ──────────────────────────────────────────────────────────────

pub struct CreateEventInput {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub venue: String,
    pub category_id: Option<Uuid>,
    pub exhibition_id: Option<Uuid>,
    pub price: i64,
    pub capacity: i32,
    pub status: Option<EventStatus>,
    pub image: Option<String>,
    pub gallery: Vec<String>,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub terms: Option<String>,
}

pub struct CreateEventUseCase<R: EventRepository> {
    pub repo: R,
}

impl<R: EventRepository> CreateEventUseCase<R> {
    pub async fn execute(
        &self,
        organizer_id: Uuid,
        input: CreateEventInput,
    ) -> Result<Event, ApiError> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::now_v7(),
            title: input.title.trim().to_owned(),
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date,
            venue: input.venue,
            category_id: input.category_id,
            exhibition_id: input.exhibition_id,
            price: input.price,
            capacity: input.capacity,
            status: input.status.unwrap_or_default(),
            image: input.image,
            gallery: input.gallery,
            tags: input.tags,
            features: input.features,
            terms: input.terms,
            organizer_id,
            average_rating: 0.0,
            created_at: now,
            updated_at: now,
        };
        validate_event(&event)?;
        self.repo.create(&event).await?;
        tracing::info!(event_id = %event.id, organizer_id = %organizer_id, "event created");
        Ok(event)
    }
}

// ── UpdateEvent ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateEventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub category_id: Option<Uuid>,
    pub exhibition_id: Option<Uuid>,
    pub price: Option<i64>,
    pub capacity: Option<i32>,
    pub status: Option<EventStatus>,
    pub image: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub terms: Option<String>,
}

pub struct UpdateEventUseCase<R: EventRepository> {
    pub repo: R,
}

impl<R: EventRepository> UpdateEventUseCase<R> {
    pub async fn execute(&self, id: Uuid, input: UpdateEventInput) -> Result<Event, ApiError> {
        let mut event = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::EventNotFound)?;
        let capacity_changed = input.capacity.is_some_and(|c| c != event.capacity);

        if let Some(title) = input.title {
            event.title = title.trim().to_owned();
        }
        if let Some(description) = input.description {
            event.description = description;
        }
        if let Some(start_date) = input.start_date {
            event.start_date = start_date;
        }
        if let Some(end_date) = input.end_date {
            event.end_date = end_date;
        }
        if let Some(venue) = input.venue {
            event.venue = venue;
        }
        if input.category_id.is_some() {
            event.category_id = input.category_id;
        }
        if input.exhibition_id.is_some() {
            event.exhibition_id = input.exhibition_id;
        }
        if let Some(price) = input.price {
            event.price = price;
        }
        if let Some(capacity) = input.capacity {
            event.capacity = capacity;
        }
        if let Some(status) = input.status {
            event.status = status;
        }
        if input.image.is_some() {
            event.image = input.image;
        }
        if let Some(gallery) = input.gallery {
            event.gallery = gallery;
        }
        if let Some(tags) = input.tags {
            event.tags = tags;
        }
        if let Some(features) = input.features {
            event.features = features;
        }
        if input.terms.is_some() {
            event.terms = input.terms;
        }
        validate_event(&event)?;

        if capacity_changed {
            let taken = self.repo.seats_taken(id).await?;
            if i64::from(event.capacity) < taken {
                return Err(ApiError::invalid(format!(
                    "capacity cannot be less than the {taken} seats already booked"
                )));
            }
        }

        event.updated_at = Utc::now();
        self.repo.update(&event).await?;
        Ok(event)
    }
}

// ── SetEventStatus ───────────────────────────────────────────────────────────

pub struct SetEventStatusUseCase<R: EventRepository> {
    pub repo: R,
}

impl<R: EventRepository> SetEventStatusUseCase<R> {
    pub async fn execute(&self, id: Uuid, status: EventStatus) -> Result<Event, ApiError> {
        let mut event = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::EventNotFound)?;
        event.status = status;
        event.updated_at = Utc::now();
        self.repo.update(&event).await?;
        Ok(event)
    }
}

// ── DeleteEvent ──────────────────────────────────────────────────────────────

pub struct DeleteEventUseCase<R: EventRepository> {
    pub repo: R,
}

impl<R: EventRepository> DeleteEventUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), ApiError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::EventNotFound);
        }
        if self.repo.count_tickets(id).await? > 0 {
            return Err(ApiError::EventHasTickets);
        }
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::EventNotFound)
        }
    }
}

// ── Shows ────────────────────────────────────────────────────────────────────

pub struct ListShowsUseCase<R: EventRepository> {
    pub repo: R,
}

impl<R: EventRepository> ListShowsUseCase<R> {
    pub async fn execute(&self, event_id: Uuid) -> Result<Vec<Show>, ApiError> {
        if self.repo.find_by_id(event_id).await?.is_none() {
            return Err(ApiError::EventNotFound);
        }
        self.repo.list_shows(event_id).await
    }
}

pub struct CreateShowInput {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub seat_capacity: i32,
}

pub struct CreateShowUseCase<R: EventRepository> {
    pub repo: R,
}

impl<R: EventRepository> CreateShowUseCase<R> {
    pub async fn execute(&self, event_id: Uuid, input: CreateShowInput) -> Result<Show, ApiError> {
        Validator::new()
            .date_order(
                input.starts_at,
                input.ends_at,
                "ends_at must not be before starts_at",
            )
            .check(input.seat_capacity >= 1, "seat_capacity must be at least 1")
            .finish()?;
        if self.repo.find_by_id(event_id).await?.is_none() {
            return Err(ApiError::EventNotFound);
        }
        let show = Show {
            id: Uuid::now_v7(),
            event_id,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            seat_capacity: input.seat_capacity,
            seats_booked: 0,
            created_at: Utc::now(),
        };
        self.repo.create_show(&show).await?;
        Ok(show)
    }
}
