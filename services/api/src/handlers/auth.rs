use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody, PathParam};
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::auth::{
    ForgotPasswordUseCase, LoginUseCase, RegisterInput, RegisterUseCase, ResendVerificationUseCase,
    ResetPasswordUseCase, UpdateDetailsInput, UpdateDetailsUseCase, UpdatePasswordUseCase,
    VerifyEmailUseCase,
};

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    fn ok(message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone_number: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let usecase = RegisterUseCase {
        repo: state.user_repo(),
        public_base_url: state.public_base_url.clone(),
    };
    let user = usecase
        .execute(RegisterInput {
            name: body.name,
            email: body.email,
            password: body.password,
            phone_number: body.phone_number,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Seconds since epoch.
    pub expires_at: u64,
    pub user: UserResponse,
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let usecase = LoginUseCase {
        repo: state.user_repo(),
        jwt_secret: state.jwt_secret.0.clone(),
        jwt_expires_secs: state.jwt_expires_secs,
    };
    let output = usecase.execute(&body.email, &body.password).await?;
    Ok(Json(LoginResponse {
        token: output.token,
        expires_at: output.expires_at,
        user: output.user.into(),
    }))
}

// ── GET /auth/me ─────────────────────────────────────────────────────────────

pub async fn get_me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

// ── PUT /auth/updatedetails ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateDetailsRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

pub async fn update_details(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UpdateDetailsRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = UpdateDetailsUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(
            user,
            UpdateDetailsInput {
                name: body.name,
                email: body.email,
                phone_number: body.phone_number,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

// ── PUT /auth/updatepassword ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

pub async fn update_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UpdatePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = UpdatePasswordUseCase {
        repo: state.user_repo(),
    };
    usecase
        .execute(user, &body.current_password, &body.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/forgotpassword ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let usecase = ForgotPasswordUseCase {
        repo: state.user_repo(),
        public_base_url: state.public_base_url.clone(),
    };
    usecase.execute(&body.email).await?;
    Ok(MessageResponse::ok("Password reset email sent"))
}

// ── PUT /auth/resetpassword/{token} ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    PathParam(token): PathParam<String>,
    JsonBody(body): JsonBody<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let usecase = ResetPasswordUseCase {
        repo: state.user_repo(),
    };
    usecase.execute(&token, &body.password).await?;
    Ok(MessageResponse::ok("Password has been reset"))
}

// ── GET /auth/verify-email/{token} ───────────────────────────────────────────

pub async fn verify_email(
    State(state): State<AppState>,
    PathParam(token): PathParam<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let usecase = VerifyEmailUseCase {
        repo: state.user_repo(),
    };
    usecase.execute(&token).await?;
    Ok(MessageResponse::ok("Email verified"))
}

// ── POST /auth/resend-verification ───────────────────────────────────────────

pub async fn resend_verification(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let usecase = ResendVerificationUseCase {
        repo: state.user_repo(),
        public_base_url: state.public_base_url.clone(),
    };
    usecase.execute(&body.email).await?;
    Ok(MessageResponse::ok("Verification email sent"))
}
