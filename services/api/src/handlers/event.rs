use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marquee_domain::event::EventStatus;

use crate::domain::types::{Event, EventFilter, Show};
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody, PathParam, QueryParams};
use crate::handlers::{Listed, PageQuery, Paged, parse_param};
use crate::state::AppState;
use crate::usecase::event::{
    CreateEventInput, CreateEventUseCase, CreateShowInput, CreateShowUseCase, DeleteEventUseCase,
    GetEventUseCase, ListEventsUseCase, ListShowsUseCase, UpdateEventInput, UpdateEventUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub start_date: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub end_date: DateTime<Utc>,
    pub venue: String,
    pub category_id: Option<Uuid>,
    pub exhibition_id: Option<Uuid>,
    pub price: i64,
    pub capacity: i32,
    pub status: EventStatus,
    pub image: Option<String>,
    pub gallery: Vec<String>,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub terms: Option<String>,
    pub organizer_id: Uuid,
    pub average_rating: f64,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            start_date: e.start_date,
            end_date: e.end_date,
            venue: e.venue,
            category_id: e.category_id,
            exhibition_id: e.exhibition_id,
            price: e.price,
            capacity: e.capacity,
            status: e.status,
            image: e.image,
            gallery: e.gallery,
            tags: e.tags,
            features: e.features,
            terms: e.terms,
            organizer_id: e.organizer_id,
            average_rating: e.average_rating,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ShowResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub starts_at: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub ends_at: DateTime<Utc>,
    pub seat_capacity: i32,
    pub seats_booked: i32,
    pub seats_left: i32,
}

impl From<Show> for ShowResponse {
    fn from(s: Show) -> Self {
        Self {
            seats_left: s.seats_left(),
            id: s.id,
            event_id: s.event_id,
            starts_at: s.starts_at,
            ends_at: s.ends_at,
            seat_capacity: s.seat_capacity,
            seats_booked: s.seats_booked,
        }
    }
}

#[derive(Serialize)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub shows: Vec<ShowResponse>,
}

// ── Shared with /admin/events ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EventListQuery {
    pub status: Option<String>,
    pub exhibition: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub(crate) async fn list(
    state: &AppState,
    query: EventListQuery,
    default_status: Option<EventStatus>,
) -> Result<Paged<EventResponse>, ApiError> {
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .request();
    let status = parse_param("status", query.status.as_deref())?.or(default_status);
    let usecase = ListEventsUseCase {
        repo: state.event_repo(),
    };
    let page = usecase
        .execute(
            EventFilter {
                status,
                exhibition_id: query.exhibition,
            },
            request,
        )
        .await?;
    Ok(Paged::from_page(page, request, EventResponse::from))
}

pub(crate) async fn get(state: &AppState, id: Uuid) -> Result<EventDetailResponse, ApiError> {
    let usecase = GetEventUseCase {
        repo: state.event_repo(),
    };
    let (event, shows) = usecase.execute(id).await?;
    Ok(EventDetailResponse {
        event: event.into(),
        shows: shows.into_iter().map(ShowResponse::from).collect(),
    })
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub venue: String,
    pub category_id: Option<Uuid>,
    pub exhibition_id: Option<Uuid>,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub capacity: i32,
    pub status: Option<EventStatus>,
    pub image: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub terms: Option<String>,
}

pub(crate) async fn create(
    state: &AppState,
    organizer_id: Uuid,
    body: CreateEventRequest,
) -> Result<EventResponse, ApiError> {
    let usecase = CreateEventUseCase {
        repo: state.event_repo(),
    };
    let event = usecase
        .execute(
            organizer_id,
            CreateEventInput {
                title: body.title,
                description: body.description,
                start_date: body.start_date,
                end_date: body.end_date,
                venue: body.venue,
                category_id: body.category_id,
                exhibition_id: body.exhibition_id,
                price: body.price,
                capacity: body.capacity,
                status: body.status,
                image: body.image,
                gallery: body.gallery,
                tags: body.tags,
                features: body.features,
                terms: body.terms,
            },
        )
        .await?;
    Ok(event.into())
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
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

pub(crate) async fn update(
    state: &AppState,
    id: Uuid,
    body: UpdateEventRequest,
) -> Result<EventResponse, ApiError> {
    let usecase = UpdateEventUseCase {
        repo: state.event_repo(),
    };
    let event = usecase
        .execute(
            id,
            UpdateEventInput {
                title: body.title,
                description: body.description,
                start_date: body.start_date,
                end_date: body.end_date,
                venue: body.venue,
                category_id: body.category_id,
                exhibition_id: body.exhibition_id,
                price: body.price,
                capacity: body.capacity,
                status: body.status,
                image: body.image,
                gallery: body.gallery,
                tags: body.tags,
                features: body.features,
                terms: body.terms,
            },
        )
        .await?;
    Ok(event.into())
}

pub(crate) async fn delete(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    let usecase = DeleteEventUseCase {
        repo: state.event_repo(),
    };
    usecase.execute(id).await
}

// ── GET /events ──────────────────────────────────────────────────────────────

/// Public listing shows published events unless `?status=` asks otherwise.
pub async fn list_events(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<EventListQuery>,
) -> Result<Json<Paged<EventResponse>>, ApiError> {
    Ok(Json(list(&state, query, Some(EventStatus::Published)).await?))
}

// ── GET /events/{id} ─────────────────────────────────────────────────────────

pub async fn get_event(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<EventDetailResponse>, ApiError> {
    Ok(Json(get(&state, id).await?))
}

// ── POST /events ─────────────────────────────────────────────────────────────

pub async fn create_event(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    auth.require_staff()?;
    let event = create(&state, auth.id(), body).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

// ── PUT /events/{id} ─────────────────────────────────────────────────────────

pub async fn update_event(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    auth.require_staff()?;
    Ok(Json(update(&state, id, body).await?))
}

// ── DELETE /events/{id} ──────────────────────────────────────────────────────

pub async fn delete_event(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_staff()?;
    delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /events/{id}/shows ───────────────────────────────────────────────────

pub async fn list_shows(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Listed<ShowResponse>>, ApiError> {
    let usecase = ListShowsUseCase {
        repo: state.event_repo(),
    };
    let shows = usecase.execute(id).await?;
    Ok(Json(Listed::new(
        shows.into_iter().map(ShowResponse::from).collect(),
    )))
}

// ── POST /events/{id}/shows ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateShowRequest {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub seat_capacity: i32,
}

pub async fn create_show(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<CreateShowRequest>,
) -> Result<(StatusCode, Json<ShowResponse>), ApiError> {
    auth.require_staff()?;
    let usecase = CreateShowUseCase {
        repo: state.event_repo(),
    };
    let show = usecase
        .execute(
            id,
            CreateShowInput {
                starts_at: body.starts_at,
                ends_at: body.ends_at,
                seat_capacity: body.seat_capacity,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(show.into())))
}
