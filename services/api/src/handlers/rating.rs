use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Rating, RatingFilter};
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody, PathParam, QueryParams};
use crate::handlers::{PageQuery, Paged};
use crate::state::AppState;
use crate::usecase::rating::{
    CreateRatingUseCase, DeleteRatingUseCase, ListAllRatingsUseCase, ListEventRatingsUseCase,
    UpdateRatingUseCase,
};

#[derive(Serialize)]
pub struct RatingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(r: Rating) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            event_id: r.event_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ── GET /events/{event_id}/ratings ───────────────────────────────────────────

pub async fn list_event_ratings(
    State(state): State<AppState>,
    PathParam(event_id): PathParam<Uuid>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paged<RatingResponse>>, ApiError> {
    let request = query.request();
    let usecase = ListEventRatingsUseCase {
        ratings: state.rating_repo(),
        events: state.event_repo(),
    };
    let page = usecase.execute(event_id, request).await?;
    Ok(Json(Paged::from_page(page, request, RatingResponse::from)))
}

// ── POST /events/{event_id}/ratings ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateRatingRequest {
    pub rating: i16,
    pub comment: Option<String>,
}

pub async fn create_rating(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    PathParam(event_id): PathParam<Uuid>,
    JsonBody(body): JsonBody<CreateRatingRequest>,
) -> Result<(StatusCode, Json<RatingResponse>), ApiError> {
    let usecase = CreateRatingUseCase {
        ratings: state.rating_repo(),
        events: state.event_repo(),
    };
    let rating = usecase
        .execute(&user, event_id, body.rating, body.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(rating.into())))
}

// ── PUT /ratings/{id} ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRatingRequest {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

pub async fn update_rating(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateRatingRequest>,
) -> Result<Json<RatingResponse>, ApiError> {
    let usecase = UpdateRatingUseCase {
        ratings: state.rating_repo(),
    };
    let rating = usecase.execute(&user, id, body.rating, body.comment).await?;
    Ok(Json(rating.into()))
}

// ── DELETE /ratings/{id} ─────────────────────────────────────────────────────

pub async fn delete_rating(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteRatingUseCase {
        ratings: state.rating_repo(),
    };
    usecase.execute(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /ratings/all ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AllRatingsQuery {
    pub event: Option<Uuid>,
    pub user: Option<Uuid>,
    pub min_rating: Option<i16>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_all_ratings(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<AllRatingsQuery>,
) -> Result<Json<Paged<RatingResponse>>, ApiError> {
    auth.require_admin()?;
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .request();
    let usecase = ListAllRatingsUseCase {
        ratings: state.rating_repo(),
    };
    let page = usecase
        .execute(
            RatingFilter {
                event_id: query.event,
                user_id: query.user,
                min_rating: query.min_rating,
            },
            request,
        )
        .await?;
    Ok(Json(Paged::from_page(page, request, RatingResponse::from)))
}
