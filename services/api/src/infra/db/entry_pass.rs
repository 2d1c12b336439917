use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use marquee_api_schema::entry_passes;
use marquee_domain::entry_pass::EntryPassStatus;

use crate::domain::repository::EntryPassRepository;
use crate::domain::types::EntryPass;
use crate::error::ApiError;

use super::parse_column;

#[derive(Clone)]
pub struct DbEntryPassRepository {
    pub db: DatabaseConnection,
}

impl EntryPassRepository for DbEntryPassRepository {
    async fn find_usable(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<EntryPass>, ApiError> {
        let model = entry_passes::Entity::find()
            .filter(entry_passes::Column::UserId.eq(user_id))
            .filter(entry_passes::Column::Status.eq(EntryPassStatus::Active.as_str()))
            .filter(entry_passes::Column::ExpiresAt.gt(now))
            .order_by_desc(entry_passes::Column::ExpiresAt)
            .one(&self.db)
            .await
            .context("find usable entry pass")?;
        model.map(entry_pass_from_model).transpose()
    }

    async fn create(&self, pass: &EntryPass) -> Result<(), ApiError> {
        active_model(pass)
            .insert(&self.db)
            .await
            .context("insert entry pass")?;
        Ok(())
    }

    async fn update(&self, pass: &EntryPass) -> Result<(), ApiError> {
        let mut am = active_model(pass);
        am.created_at = NotSet;
        am.purchased_at = NotSet;
        am.update(&self.db).await.context("update entry pass")?;
        Ok(())
    }
}

fn active_model(pass: &EntryPass) -> entry_passes::ActiveModel {
    entry_passes::ActiveModel {
        id: Set(pass.id),
        user_id: Set(pass.user_id),
        head_count: Set(pass.head_count),
        amount: Set(pass.amount),
        payment_id: Set(pass.payment_id.clone()),
        transaction_info: Set(pass.transaction_info.clone()),
        purchased_at: Set(pass.purchased_at),
        expires_at: Set(pass.expires_at),
        status: Set(pass.status.as_str().to_owned()),
        created_at: Set(pass.created_at),
        updated_at: Set(pass.updated_at),
    }
}

fn entry_pass_from_model(model: entry_passes::Model) -> Result<EntryPass, ApiError> {
    Ok(EntryPass {
        id: model.id,
        user_id: model.user_id,
        head_count: model.head_count,
        amount: model.amount,
        payment_id: model.payment_id,
        transaction_info: model.transaction_info,
        purchased_at: model.purchased_at,
        expires_at: model.expires_at,
        status: parse_column(&model.status, "entry_passes.status")?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
