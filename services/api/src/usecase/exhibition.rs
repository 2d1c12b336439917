use chrono::{DateTime, Utc};
use uuid::Uuid;

use marquee_domain::event::ExhibitionStatus;
use marquee_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{EventRepository, ExhibitionRepository};
use crate::domain::types::{Event, Exhibition, Venue};
use crate::domain::validation::Validator;
use crate::error::ApiError;

fn validate_exhibition(exhibition: &Exhibition) -> Result<(), ApiError> {
    let venue = &exhibition.venue;
    Validator::new()
        .text("name", &exhibition.name, 200)
        .text("description", &exhibition.description, 2000)
        .date_order(
            exhibition.start_date,
            exhibition.end_date,
            "end_date must not be before start_date",
        )
        .text("venue.name", &venue.name, 200)
        .text("venue.address", &venue.address, 500)
        .text("venue.city", &venue.city, 100)
        .text("venue.state", &venue.state, 100)
        .text("venue.pincode", &venue.pincode, 20)
        .check(
            venue
                .latitude
                .is_none_or(|lat| (-90.0..=90.0).contains(&lat)),
            "venue.latitude must be between -90 and 90",
        )
        .check(
            venue
                .longitude
                .is_none_or(|lng| (-180.0..=180.0).contains(&lng)),
            "venue.longitude must be between -180 and 180",
        )
        .finish()
}

// ── ListExhibitions ──────────────────────────────────────────────────────────

pub struct ListExhibitionsUseCase<R: ExhibitionRepository> {
    pub repo: R,
}

impl<R: ExhibitionRepository> ListExhibitionsUseCase<R> {
    pub async fn execute(
        &self,
        status: Option<ExhibitionStatus>,
        page: PageRequest,
    ) -> Result<Page<Exhibition>, ApiError> {
        self.repo.list(status, page.clamped()).await
    }
}

// ── UpcomingExhibitions ──────────────────────────────────────────────────────

pub struct UpcomingExhibitionsUseCase<R: ExhibitionRepository> {
    pub repo: R,
}

impl<R: ExhibitionRepository> UpcomingExhibitionsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Exhibition>, ApiError> {
        self.repo.list_starting_after(Utc::now()).await
    }
}

// ── GetExhibition ────────────────────────────────────────────────────────────

pub struct GetExhibitionUseCase<R: ExhibitionRepository> {
    pub repo: R,
}

impl<R: ExhibitionRepository> GetExhibitionUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Exhibition, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::ExhibitionNotFound)
    }
}

// ── ExhibitionEvents ─────────────────────────────────────────────────────────

pub struct ExhibitionEventsUseCase<R: ExhibitionRepository, E: EventRepository> {
    pub exhibitions: R,
    pub events: E,
}

impl<R: ExhibitionRepository, E: EventRepository> ExhibitionEventsUseCase<R, E> {
    pub async fn execute(&self, id: Uuid) -> Result<Vec<Event>, ApiError> {
        if self.exhibitions.find_by_id(id).await?.is_none() {
            return Err(ApiError::ExhibitionNotFound);
        }
        self.events.list_by_exhibition(id).await
    }
}

// ── CreateExhibition ─────────────────────────────────────────────────────────

pub struct CreateExhibitionInput {
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub venue: Venue,
    pub map_layout: Option<String>,
    pub status: Option<ExhibitionStatus>,
}

pub struct CreateExhibitionUseCase<R: ExhibitionRepository> {
    pub repo: R,
}

impl<R: ExhibitionRepository> CreateExhibitionUseCase<R> {
    pub async fn execute(
        &self,
        organizer_id: Uuid,
        input: CreateExhibitionInput,
    ) -> Result<Exhibition, ApiError> {
        let now = Utc::now();
        let exhibition = Exhibition {
            id: Uuid::now_v7(),
            name: input.name.trim().to_owned(),
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date,
            venue: input.venue,
            map_layout: input.map_layout,
            organizer_id: Some(organizer_id),
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        validate_exhibition(&exhibition)?;
        self.repo.create(&exhibition).await?;
        Ok(exhibition)
    }
}

// ── UpdateExhibition ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateExhibitionInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub venue: Option<Venue>,
    pub map_layout: Option<String>,
    pub status: Option<ExhibitionStatus>,
}

pub struct UpdateExhibitionUseCase<R: ExhibitionRepository> {
    pub repo: R,
}

impl<R: ExhibitionRepository> UpdateExhibitionUseCase<R> {
    pub async fn execute(
        &self,
        id: Uuid,
        input: UpdateExhibitionInput,
    ) -> Result<Exhibition, ApiError> {
        let mut exhibition = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::ExhibitionNotFound)?;
        if let Some(name) = input.name {
            exhibition.name = name.trim().to_owned();
        }
        if let Some(description) = input.description {
            exhibition.description = description;
        }
        if let Some(start_date) = input.start_date {
            exhibition.start_date = start_date;
        }
        if let Some(end_date) = input.end_date {
            exhibition.end_date = end_date;
        }
        if let Some(venue) = input.venue {
            exhibition.venue = venue;
        }
        if input.map_layout.is_some() {
            exhibition.map_layout = input.map_layout;
        }
        if let Some(status) = input.status {
            exhibition.status = status;
        }
        validate_exhibition(&exhibition)?;
        exhibition.updated_at = Utc::now();
        self.repo.update(&exhibition).await?;
        Ok(exhibition)
    }
}

// ── DeleteExhibition ─────────────────────────────────────────────────────────

pub struct DeleteExhibitionUseCase<R: ExhibitionRepository> {
    pub repo: R,
}

impl<R: ExhibitionRepository> DeleteExhibitionUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::ExhibitionNotFound)
        }
    }
}
