//! `/admin/*`. Every handler requires an admin.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marquee_domain::event::EventStatus;
use marquee_domain::user::{UserRole, UserStatus};

use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody, PathParam, QueryParams};
use crate::handlers::event::{
    self, CreateEventRequest, EventDetailResponse, EventListQuery, EventResponse,
    UpdateEventRequest,
};
use crate::handlers::ticket::{self, TicketListQuery, TicketResponse};
use crate::handlers::user::UserResponse;
use crate::handlers::{PageQuery, Paged};
use crate::state::AppState;
use crate::usecase::admin::{DashboardStatsUseCase, StatsQuery};
use crate::usecase::event::{GetEventUseCase, SetEventStatusUseCase};
use crate::usecase::user::{GetUserUseCase, ListUsersUseCase, UpdateUserInput, UpdateUserUseCase};

// ── GET /admin/stats ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StatsParams {
    pub time_range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize)]
pub struct UserCounts {
    pub total: u64,
    pub new: u64,
}

#[derive(Serialize)]
pub struct EventCounts {
    pub total: u64,
    pub upcoming: u64,
}

#[derive(Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Serialize)]
pub struct TicketCounts {
    pub total: u64,
    pub active: u64,
    pub by_status: Vec<StatusCount>,
}

#[derive(Serialize)]
pub struct RevenueTotals {
    pub total: i64,
    pub period: i64,
}

#[derive(Serialize)]
pub struct DateRangeResponse {
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub start: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub end: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub users: UserCounts,
    pub events: EventCounts,
    pub tickets: TicketCounts,
    pub revenue: RevenueTotals,
    pub date_range: DateRangeResponse,
}

pub async fn stats(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(params): QueryParams<StatsParams>,
) -> Result<Json<StatsResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = DashboardStatsUseCase {
        repo: state.stats_repo(),
    };
    let (stats, range) = usecase
        .execute(StatsQuery {
            time_range: params.time_range,
            start_date: params.start_date,
            end_date: params.end_date,
        })
        .await?;
    Ok(Json(StatsResponse {
        users: UserCounts {
            total: stats.total_users,
            new: stats.new_users,
        },
        events: EventCounts {
            total: stats.total_events,
            upcoming: stats.upcoming_events,
        },
        tickets: TicketCounts {
            total: stats.total_tickets,
            active: stats.active_tickets,
            by_status: stats
                .tickets_by_status
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
        },
        revenue: RevenueTotals {
            total: stats.total_revenue,
            period: stats.period_revenue,
        },
        date_range: DateRangeResponse {
            start: range.start,
            end: range.end,
        },
    }))
}

// ── Users ────────────────────────────────────────────────────────────────────

pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paged<UserResponse>>, ApiError> {
    auth.require_admin()?;
    let request = query.request();
    let usecase = ListUsersUseCase {
        repo: state.user_repo(),
    };
    let page = usecase.execute(request).await?;
    Ok(Json(Paged::from_page(page, request, UserResponse::from)))
}

pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

#[derive(Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

pub async fn set_user_role(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<RoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = UpdateUserUseCase {
        repo: state.user_repo(),
    };
    let input = UpdateUserInput {
        role: Some(body.role),
        ..UpdateUserInput::default()
    };
    Ok(Json(usecase.execute(auth.id(), id, input).await?.into()))
}

#[derive(Deserialize)]
pub struct UserStatusRequest {
    pub status: UserStatus,
}

pub async fn set_user_status(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UserStatusRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = UpdateUserUseCase {
        repo: state.user_repo(),
    };
    let input = UpdateUserInput {
        status: Some(body.status),
        ..UpdateUserInput::default()
    };
    Ok(Json(usecase.execute(auth.id(), id, input).await?.into()))
}

pub async fn user_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    QueryParams(query): QueryParams<TicketListQuery>,
) -> Result<Json<Paged<TicketResponse>>, ApiError> {
    auth.require_admin()?;
    GetUserUseCase {
        repo: state.user_repo(),
    }
    .execute(id)
    .await?;
    Ok(Json(ticket::list_filtered(&state, query, Some(id), None).await?))
}

// ── Tickets ──────────────────────────────────────────────────────────────────

pub async fn list_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<TicketListQuery>,
) -> Result<Json<Paged<TicketResponse>>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ticket::list_filtered(&state, query, None, None).await?))
}

pub async fn get_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<TicketResponse>, ApiError> {
    auth.require_admin()?;
    Ok(Json(ticket::get(&state, &auth, id).await?))
}

// ── Events ───────────────────────────────────────────────────────────────────

/// Every status unless `?status=` narrows it.
pub async fn list_events(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<EventListQuery>,
) -> Result<Json<Paged<EventResponse>>, ApiError> {
    auth.require_admin()?;
    Ok(Json(event::list(&state, query, None).await?))
}

pub async fn create_event(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    auth.require_admin()?;
    let event = event::create(&state, auth.id(), body).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<EventDetailResponse>, ApiError> {
    auth.require_admin()?;
    Ok(Json(event::get(&state, id).await?))
}

pub async fn update_event(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    auth.require_admin()?;
    Ok(Json(event::update(&state, id, body).await?))
}

pub async fn delete_event(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    event::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct EventStatusRequest {
    pub status: EventStatus,
}

pub async fn set_event_status(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<EventStatusRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = SetEventStatusUseCase {
        repo: state.event_repo(),
    };
    Ok(Json(usecase.execute(id, body.status).await?.into()))
}

pub async fn event_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    QueryParams(query): QueryParams<TicketListQuery>,
) -> Result<Json<Paged<TicketResponse>>, ApiError> {
    auth.require_admin()?;
    GetEventUseCase {
        repo: state.event_repo(),
    }
    .execute(id)
    .await?;
    Ok(Json(ticket::list_filtered(&state, query, None, Some(id)).await?))
}
