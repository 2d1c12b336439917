use std::sync::Arc;

use anyhow::Context as _;
use chrono::{Duration, Utc};
use serde_json::json;

use marquee_auth::password::{hash_password, verify_password};
use marquee_auth::secret::{random_token, sha256_hex};
use marquee_auth::token::issue_access_token;
use marquee_domain::user::UserRole;

use crate::domain::repository::UserRepository;
use crate::domain::types::{
    EMAIL_VERIFICATION_TTL_HOURS, MAIL_TOKEN_LEN, OutboxEvent, RESET_PASSWORD_TTL_MINUTES, User,
    outbox_kind,
};
use crate::domain::validation::{Validator, normalize_email};
use crate::error::ApiError;
use crate::usecase::user::{NewUser, build_user};

/// A raw mail token and the digest stored in its place.
struct MailToken {
    raw: String,
    hash: String,
}

impl MailToken {
    fn generate() -> Self {
        let raw = random_token(MAIL_TOKEN_LEN);
        let hash = sha256_hex(&raw);
        Self { raw, hash }
    }
}

/// Attach a fresh verification token to `user` and build the mail event for it.
fn issue_verification(user: &mut User, public_base_url: &str) -> OutboxEvent {
    let token = MailToken::generate();
    let event = OutboxEvent::new(
        outbox_kind::EMAIL_VERIFICATION_REQUESTED,
        &token.hash,
        json!({
            "user_id": user.id,
            "email": user.email,
            "name": user.name,
            "verification_url": format!("{public_base_url}/verify-email/{}", token.raw),
        }),
    );
    user.email_verification_token_hash = Some(token.hash);
    user.email_verification_expires_at =
        Some(Utc::now() + Duration::hours(EMAIL_VERIFICATION_TTL_HOURS));
    event
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

pub struct RegisterUseCase<R: UserRepository> {
    pub repo: R,
    pub public_base_url: Arc<str>,
}

impl<R: UserRepository> RegisterUseCase<R> {
    pub async fn execute(&self, input: RegisterInput) -> Result<User, ApiError> {
        let mut user = build_user(
            NewUser {
                name: input.name,
                email: input.email,
                password: input.password,
                phone_number: input.phone_number,
            },
            UserRole::Customer,
            false,
        )?;
        if self.repo.find_by_email(&user.email).await?.is_some() {
            return Err(ApiError::UserAlreadyExists);
        }
        let outbox = issue_verification(&mut user, &self.public_base_url);
        self.repo.create(&user, Some(&outbox)).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginOutput {
    pub token: String,
    pub expires_at: u64,
    pub user: User,
}

pub struct LoginUseCase<R: UserRepository> {
    pub repo: R,
    pub jwt_secret: Arc<str>,
    pub jwt_expires_secs: u64,
}

impl<R: UserRepository> LoginUseCase<R> {
    pub async fn execute(&self, email: &str, password: &str) -> Result<LoginOutput, ApiError> {
        Validator::new()
            .email("email", email)
            .check(!password.is_empty(), "password is required")
            .finish()?;

        let mut user = self
            .repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(ApiError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }
        if !user.is_active() {
            return Err(ApiError::AccountInactive);
        }

        let now = Utc::now();
        user.last_login_at = Some(now);
        user.updated_at = now;
        self.repo.update(&user, None).await?;

        let (token, expires_at) = issue_access_token(
            user.id,
            user.role.as_u8(),
            &self.jwt_secret,
            self.jwt_expires_secs,
        )
        .context("issue access token")?;
        Ok(LoginOutput {
            token,
            expires_at,
            user,
        })
    }
}

// ── UpdateDetails ────────────────────────────────────────────────────────────

pub struct UpdateDetailsInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

pub struct UpdateDetailsUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> UpdateDetailsUseCase<R> {
    pub async fn execute(
        &self,
        mut user: User,
        input: UpdateDetailsInput,
    ) -> Result<User, ApiError> {
        if input.name.is_none() && input.email.is_none() && input.phone_number.is_none() {
            return Err(ApiError::MissingData);
        }
        let mut v = Validator::new();
        v.optional_text("name", input.name.as_deref(), 100);
        if let Some(ref email) = input.email {
            v.email("email", email);
        }
        v.max_len("phone_number", input.phone_number.as_deref(), 20);
        v.finish()?;

        if let Some(name) = input.name {
            user.name = name.trim().to_owned();
        }
        if let Some(email) = input.email {
            let email = normalize_email(&email);
            if email != user.email {
                if self.repo.find_by_email(&email).await?.is_some() {
                    return Err(ApiError::UserAlreadyExists);
                }
                user.email = email;
            }
        }
        if let Some(phone_number) = input.phone_number {
            user.phone_number = Some(phone_number);
        }
        user.updated_at = Utc::now();
        self.repo.update(&user, None).await?;
        Ok(user)
    }
}

// ── UpdatePassword ───────────────────────────────────────────────────────────

pub struct UpdatePasswordUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> UpdatePasswordUseCase<R> {
    pub async fn execute(
        &self,
        mut user: User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        Validator::new()
            .password("new_password", new_password)
            .finish()?;
        if !verify_password(current_password, &user.password_hash) {
            return Err(ApiError::InvalidPassword);
        }
        user.password_hash = hash_password(new_password).context("hash password")?;
        user.updated_at = Utc::now();
        self.repo.update(&user, None).await
    }
}

// ── ForgotPassword ───────────────────────────────────────────────────────────

pub struct ForgotPasswordUseCase<R: UserRepository> {
    pub repo: R,
    pub public_base_url: Arc<str>,
}

impl<R: UserRepository> ForgotPasswordUseCase<R> {
    pub async fn execute(&self, email: &str) -> Result<(), ApiError> {
        Validator::new().email("email", email).finish()?;
        let mut user = self
            .repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let token = MailToken::generate();
        let now = Utc::now();
        let outbox = OutboxEvent::new(
            outbox_kind::PASSWORD_RESET_REQUESTED,
            &token.hash,
            json!({
                "user_id": user.id,
                "email": user.email,
                "name": user.name,
                "reset_url": format!("{}/reset-password/{}", self.public_base_url, token.raw),
            }),
        );
        user.reset_password_token_hash = Some(token.hash);
        user.reset_password_expires_at = Some(now + Duration::minutes(RESET_PASSWORD_TTL_MINUTES));
        user.updated_at = now;
        self.repo.update(&user, Some(&outbox)).await
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ResetPasswordUseCase<R> {
    pub async fn execute(&self, token: &str, password: &str) -> Result<(), ApiError> {
        Validator::new().password("password", password).finish()?;
        let now = Utc::now();
        let mut user = self
            .repo
            .find_by_reset_token(&sha256_hex(token))
            .await?
            .filter(|u| u.reset_password_expires_at.is_some_and(|exp| exp > now))
            .ok_or(ApiError::InvalidToken)?;

        user.password_hash = hash_password(password).context("hash password")?;
        user.reset_password_token_hash = None;
        user.reset_password_expires_at = None;
        user.updated_at = now;
        self.repo.update(&user, None).await
    }
}

// ── VerifyEmail ──────────────────────────────────────────────────────────────

pub struct VerifyEmailUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> VerifyEmailUseCase<R> {
    pub async fn execute(&self, token: &str) -> Result<(), ApiError> {
        let now = Utc::now();
        let mut user = self
            .repo
            .find_by_verification_token(&sha256_hex(token))
            .await?
            .filter(|u| u.email_verification_expires_at.is_some_and(|exp| exp > now))
            .ok_or(ApiError::InvalidToken)?;

        user.email_verified = true;
        user.email_verification_token_hash = None;
        user.email_verification_expires_at = None;
        user.updated_at = now;
        self.repo.update(&user, None).await
    }
}

// ── ResendVerification ───────────────────────────────────────────────────────

pub struct ResendVerificationUseCase<R: UserRepository> {
    pub repo: R,
    pub public_base_url: Arc<str>,
}

impl<R: UserRepository> ResendVerificationUseCase<R> {
    pub async fn execute(&self, email: &str) -> Result<(), ApiError> {
        Validator::new().email("email", email).finish()?;
        let mut user = self
            .repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if user.email_verified {
            return Err(ApiError::AlreadyVerified);
        }
        let outbox = issue_verification(&mut user, &self.public_base_url);
        user.updated_at = Utc::now();
        self.repo.update(&user, Some(&outbox)).await
    }
}
