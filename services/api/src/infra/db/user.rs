use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use marquee_api_schema::{events, payments, tickets, users};
use marquee_domain::pagination::{Page, PageRequest};
use marquee_domain::user::UserRole;

use crate::domain::repository::UserRepository;
use crate::domain::types::{OutboxEvent, User};
use crate::error::ApiError;

use super::{fetch_page, insert_outbox_event, parse_column};

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_verification_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::EmailVerificationTokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .context("find user by verification token")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::ResetPasswordTokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .context("find user by reset token")?;
        model.map(user_from_model).transpose()
    }

    async fn admin_exists(&self) -> Result<bool, ApiError> {
        let count = users::Entity::find()
            .filter(users::Column::Role.eq(i16::from(UserRole::Admin.as_u8())))
            .count(&self.db)
            .await
            .context("count admins")?;
        Ok(count > 0)
    }

    async fn has_records(&self, id: Uuid) -> Result<bool, ApiError> {
        let tickets = tickets::Entity::find()
            .filter(tickets::Column::PurchasedBy.eq(id))
            .count(&self.db)
            .await
            .context("count user tickets")?;
        let payments = payments::Entity::find()
            .filter(payments::Column::UserId.eq(id))
            .count(&self.db)
            .await
            .context("count user payments")?;
        let events = events::Entity::find()
            .filter(events::Column::OrganizerId.eq(id))
            .count(&self.db)
            .await
            .context("count organized events")?;
        Ok(tickets + payments + events > 0)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, ApiError> {
        let select = users::Entity::find().order_by_desc(users::Column::CreatedAt);
        let page = fetch_page(select, &self.db, page, "list users").await?;
        let total = page.total;
        let items = page
            .items
            .into_iter()
            .map(user_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn create(&self, user: &User, outbox: Option<&OutboxEvent>) -> Result<(), ApiError> {
        let txn = self.db.begin().await.context("begin create user")?;
        active_model(user)
            .insert(&txn)
            .await
            .map_err(|e| ApiError::from_db(e, ApiError::UserAlreadyExists, "insert user"))?;
        if let Some(event) = outbox {
            insert_outbox_event(&txn, event)
                .await
                .context("insert user outbox event")?;
        }
        txn.commit().await.context("commit create user")?;
        Ok(())
    }

    async fn update(&self, user: &User, outbox: Option<&OutboxEvent>) -> Result<(), ApiError> {
        let txn = self.db.begin().await.context("begin update user")?;
        let mut am = active_model(user);
        am.created_at = sea_orm::ActiveValue::NotSet;
        am.update(&txn)
            .await
            .map_err(|e| ApiError::from_db(e, ApiError::UserAlreadyExists, "update user"))?;
        if let Some(event) = outbox {
            insert_outbox_event(&txn, event)
                .await
                .context("insert user outbox event")?;
        }
        txn.commit().await.context("commit update user")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| ApiError::from_delete(e, ApiError::UserHasRecords, "delete user"))?;
        Ok(result.rows_affected > 0)
    }
}

fn active_model(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
        phone_number: Set(user.phone_number.clone()),
        password_hash: Set(user.password_hash.clone()),
        role: Set(i16::from(user.role.as_u8())),
        status: Set(user.status.as_str().to_owned()),
        email_verified: Set(user.email_verified),
        email_verification_token_hash: Set(user.email_verification_token_hash.clone()),
        email_verification_expires_at: Set(user.email_verification_expires_at),
        reset_password_token_hash: Set(user.reset_password_token_hash.clone()),
        reset_password_expires_at: Set(user.reset_password_expires_at),
        qr_code: Set(user.qr_code.clone()),
        last_login_at: Set(user.last_login_at),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
}

fn user_from_model(model: users::Model) -> Result<User, ApiError> {
    let role = u8::try_from(model.role)
        .ok()
        .and_then(UserRole::from_u8)
        .with_context(|| format!("decode users.role {}", model.role))?;
    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        phone_number: model.phone_number,
        password_hash: model.password_hash,
        role,
        status: parse_column(&model.status, "users.status")?,
        email_verified: model.email_verified,
        email_verification_token_hash: model.email_verification_token_hash,
        email_verification_expires_at: model.email_verification_expires_at,
        reset_password_token_hash: model.reset_password_token_hash,
        reset_password_expires_at: model.reset_password_expires_at,
        qr_code: model.qr_code,
        last_login_at: model.last_login_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
