use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marquee_domain::user::{UserRole, UserStatus};

use crate::domain::types::User;
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody, PathParam, QueryParams};
use crate::handlers::{PageQuery, Paged};
use crate::state::AppState;
use crate::usecase::user::{
    CreateUserUseCase, DeleteUserUseCase, GetUserUseCase, ListUsersUseCase, NewUser,
    SetupAdminUseCase, UpdateUserInput, UpdateUserUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub qr_code: String,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms_opt")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            role: user.role,
            status: user.status,
            email_verified: user.email_verified,
            qr_code: user.qr_code,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── POST /users/setup-admin ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetupAdminRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone_number: Option<String>,
}

pub async fn setup_admin(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SetupAdminRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let usecase = SetupAdminUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(NewUser {
            name: body.name,
            email: body.email,
            password: body.password,
            phone_number: body.phone_number,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users/profile ───────────────────────────────────────────────────────

pub async fn get_profile(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

// ── GET /users ───────────────────────────────────────────────────────────────

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

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone_number: Option<String>,
    pub role: Option<UserRole>,
}

pub async fn create_user(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    auth.require_admin()?;
    let usecase = CreateUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(
            NewUser {
                name: body.name,
                email: body.email,
                password: body.password,
                phone_number: body.phone_number,
            },
            body.role,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

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

// ── PUT /users/{id} ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = UpdateUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(
            auth.id(),
            id,
            UpdateUserInput {
                name: body.name,
                email: body.email,
                phone_number: body.phone_number,
                role: body.role,
                status: body.status,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

// ── DELETE /users/{id} ───────────────────────────────────────────────────────

pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    let usecase = DeleteUserUseCase {
        repo: state.user_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
