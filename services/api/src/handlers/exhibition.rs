use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marquee_domain::event::ExhibitionStatus;

use crate::domain::types::{Exhibition, Venue};
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody, PathParam, QueryParams};
use crate::handlers::event::EventResponse;
use crate::handlers::{Listed, PageQuery, Paged, parse_param};
use crate::state::AppState;
use crate::usecase::exhibition::{
    CreateExhibitionInput, CreateExhibitionUseCase, DeleteExhibitionUseCase,
    ExhibitionEventsUseCase, GetExhibitionUseCase, ListExhibitionsUseCase,
    UpcomingExhibitionsUseCase, UpdateExhibitionInput, UpdateExhibitionUseCase,
};

#[derive(Serialize)]
pub struct ExhibitionResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub start_date: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub end_date: DateTime<Utc>,
    pub venue: Venue,
    pub map_layout: Option<String>,
    pub organizer_id: Option<Uuid>,
    pub status: ExhibitionStatus,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Exhibition> for ExhibitionResponse {
    fn from(x: Exhibition) -> Self {
        Self {
            id: x.id,
            name: x.name,
            description: x.description,
            start_date: x.start_date,
            end_date: x.end_date,
            venue: x.venue,
            map_layout: x.map_layout,
            organizer_id: x.organizer_id,
            status: x.status,
            created_at: x.created_at,
            updated_at: x.updated_at,
        }
    }
}

// ── GET /exhibitions ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ExhibitionListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_exhibitions(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ExhibitionListQuery>,
) -> Result<Json<Paged<ExhibitionResponse>>, ApiError> {
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .request();
    let status = parse_param("status", query.status.as_deref())?;
    let usecase = ListExhibitionsUseCase {
        repo: state.exhibition_repo(),
    };
    let page = usecase.execute(status, request).await?;
    Ok(Json(Paged::from_page(page, request, ExhibitionResponse::from)))
}

// ── GET /exhibitions/upcoming ────────────────────────────────────────────────

pub async fn upcoming_exhibitions(
    State(state): State<AppState>,
) -> Result<Json<Listed<ExhibitionResponse>>, ApiError> {
    let usecase = UpcomingExhibitionsUseCase {
        repo: state.exhibition_repo(),
    };
    let exhibitions = usecase.execute().await?;
    Ok(Json(Listed::new(
        exhibitions
            .into_iter()
            .map(ExhibitionResponse::from)
            .collect(),
    )))
}

// ── GET /exhibitions/{id} ────────────────────────────────────────────────────

pub async fn get_exhibition(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ExhibitionResponse>, ApiError> {
    let usecase = GetExhibitionUseCase {
        repo: state.exhibition_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── GET /exhibitions/{id}/events ─────────────────────────────────────────────

pub async fn exhibition_events(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Listed<EventResponse>>, ApiError> {
    let usecase = ExhibitionEventsUseCase {
        exhibitions: state.exhibition_repo(),
        events: state.event_repo(),
    };
    let events = usecase.execute(id).await?;
    Ok(Json(Listed::new(
        events.into_iter().map(EventResponse::from).collect(),
    )))
}

// ── POST /exhibitions ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateExhibitionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub venue: Venue,
    pub map_layout: Option<String>,
    pub status: Option<ExhibitionStatus>,
}

pub async fn create_exhibition(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateExhibitionRequest>,
) -> Result<(StatusCode, Json<ExhibitionResponse>), ApiError> {
    auth.require_staff()?;
    let usecase = CreateExhibitionUseCase {
        repo: state.exhibition_repo(),
    };
    let exhibition = usecase
        .execute(
            auth.id(),
            CreateExhibitionInput {
                name: body.name,
                description: body.description,
                start_date: body.start_date,
                end_date: body.end_date,
                venue: body.venue,
                map_layout: body.map_layout,
                status: body.status,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(exhibition.into())))
}

// ── PUT /exhibitions/{id} ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateExhibitionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub venue: Option<Venue>,
    pub map_layout: Option<String>,
    pub status: Option<ExhibitionStatus>,
}

pub async fn update_exhibition(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateExhibitionRequest>,
) -> Result<Json<ExhibitionResponse>, ApiError> {
    auth.require_staff()?;
    let usecase = UpdateExhibitionUseCase {
        repo: state.exhibition_repo(),
    };
    let exhibition = usecase
        .execute(
            id,
            UpdateExhibitionInput {
                name: body.name,
                description: body.description,
                start_date: body.start_date,
                end_date: body.end_date,
                venue: body.venue,
                map_layout: body.map_layout,
                status: body.status,
            },
        )
        .await?;
    Ok(Json(exhibition.into()))
}

// ── DELETE /exhibitions/{id} ─────────────────────────────────────────────────

pub async fn delete_exhibition(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_staff()?;
    let usecase = DeleteExhibitionUseCase {
        repo: state.exhibition_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
