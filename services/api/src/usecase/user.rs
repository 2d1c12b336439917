use anyhow::Context as _;
use chrono::Utc;
use uuid::Uuid;

use marquee_auth::password::hash_password;
use marquee_auth::secret::random_hex;
use marquee_domain::pagination::{Page, PageRequest};
use marquee_domain::user::{UserRole, UserStatus};

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::domain::validation::{Validator, normalize_email};
use crate::error::ApiError;

const USER_QR_HEX_LEN: usize = 20;

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

/// Validate and assemble a new `active` account with a hashed password.
pub(crate) fn build_user(
    input: NewUser,
    role: UserRole,
    email_verified: bool,
) -> Result<User, ApiError> {
    Validator::new()
        .text("name", &input.name, 100)
        .email("email", &input.email)
        .password("password", &input.password)
        .max_len("phone_number", input.phone_number.as_deref(), 20)
        .finish()?;

    let now = Utc::now();
    Ok(User {
        id: Uuid::now_v7(),
        name: input.name.trim().to_owned(),
        email: normalize_email(&input.email),
        phone_number: input.phone_number,
        password_hash: hash_password(&input.password).context("hash password")?,
        role,
        status: UserStatus::Active,
        email_verified,
        email_verification_token_hash: None,
        email_verification_expires_at: None,
        reset_password_token_hash: None,
        reset_password_expires_at: None,
        qr_code: format!("USER-{}", random_hex(USER_QR_HEX_LEN)),
        last_login_at: None,
        created_at: now,
        updated_at: now,
    })
}

// ── SetupAdmin ───────────────────────────────────────────────────────────────

pub struct SetupAdminUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> SetupAdminUseCase<R> {
    pub async fn execute(&self, input: NewUser) -> Result<User, ApiError> {
        if self.repo.admin_exists().await? {
            return Err(ApiError::AdminAlreadyExists);
        }
        let user = build_user(input, UserRole::Admin, true)?;
        self.repo.create(&user, None).await?;
        tracing::info!(user_id = %user.id, "initial admin created");
        Ok(user)
    }
}

// ── CreateUser ───────────────────────────────────────────────────────────────

pub struct CreateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> CreateUserUseCase<R> {
    /// Admin-created accounts skip email verification.
    pub async fn execute(&self, input: NewUser, role: Option<UserRole>) -> Result<User, ApiError> {
        let user = build_user(input, role.unwrap_or(UserRole::Customer), true)?;
        if self.repo.find_by_email(&user.email).await?.is_some() {
            return Err(ApiError::UserAlreadyExists);
        }
        self.repo.create(&user, None).await?;
        Ok(user)
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<User, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<User>, ApiError> {
        self.repo.list(page.clamped()).await
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

impl UpdateUserInput {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.role.is_none()
            && self.status.is_none()
    }
}

pub struct UpdateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> UpdateUserUseCase<R> {
    /// Apply an admin edit. `actor_id` may not deactivate its own account.
    pub async fn execute(
        &self,
        actor_id: Uuid,
        id: Uuid,
        input: UpdateUserInput,
    ) -> Result<User, ApiError> {
        if input.is_empty() {
            return Err(ApiError::MissingData);
        }
        let mut v = Validator::new();
        v.optional_text("name", input.name.as_deref(), 100);
        if let Some(ref email) = input.email {
            v.email("email", email);
        }
        v.max_len("phone_number", input.phone_number.as_deref(), 20);
        v.finish()?;

        if actor_id == id && input.status.is_some_and(|s| s != UserStatus::Active) {
            return Err(ApiError::CannotDeactivateSelf);
        }

        let mut user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if let Some(name) = input.name {
            user.name = name.trim().to_owned();
        }
        if let Some(email) = input.email {
            let email = normalize_email(&email);
            if email != user.email && self.repo.find_by_email(&email).await?.is_some() {
                return Err(ApiError::UserAlreadyExists);
            }
            user.email = email;
        }
        if let Some(phone_number) = input.phone_number {
            user.phone_number = Some(phone_number);
        }
        if let Some(role) = input.role {
            user.role = role;
        }
        if let Some(status) = input.status {
            user.status = status;
        }
        user.updated_at = Utc::now();
        self.repo.update(&user, None).await?;
        Ok(user)
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> DeleteUserUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), ApiError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::UserNotFound);
        }
        if self.repo.has_records(id).await? {
            return Err(ApiError::UserHasRecords);
        }
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::UserNotFound)
        }
    }
}
