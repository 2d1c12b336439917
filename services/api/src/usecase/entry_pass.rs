use chrono::Utc;
use uuid::Uuid;

use marquee_domain::entry_pass::EntryPassStatus;

use crate::domain::repository::{EntryPassRepository, SettingsRepository};
use crate::domain::types::EntryPass;
use crate::domain::validation::Validator;
use crate::error::ApiError;

// ── PurchaseEntryPass ────────────────────────────────────────────────────────

pub struct PurchaseEntryPassInput {
    pub head_count: i32,
    pub amount: i64,
    pub payment_id: String,
    pub transaction_info: serde_json::Value,
}

pub struct PurchaseEntryPassUseCase<P: EntryPassRepository, S: SettingsRepository> {
    pub passes: P,
    pub settings: S,
}

impl<P: EntryPassRepository, S: SettingsRepository> PurchaseEntryPassUseCase<P, S> {
    /// Top up the caller's usable pass, or open a new one.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: PurchaseEntryPassInput,
    ) -> Result<EntryPass, ApiError> {
        Validator::new()
            .check(input.head_count >= 1, "head_count must be at least 1")
            .check(input.amount > 0, "amount must be greater than 0")
            .text("payment_id", &input.payment_id, 128)
            .finish()?;

        let settings = self.settings.get().await?.unwrap_or_default();
        let now = Utc::now();
        let expires_at = now + settings.entry_pass_ttl();

        if let Some(mut pass) = self.passes.find_usable(user_id, now).await? {
            pass.head_count = pass
                .head_count
                .checked_add(input.head_count)
                .ok_or_else(|| ApiError::invalid("head_count is too large"))?;
            pass.amount = pass
                .amount
                .checked_add(input.amount)
                .ok_or_else(|| ApiError::invalid("amount is too large"))?;
            pass.payment_id = input.payment_id;
            pass.transaction_info = input.transaction_info;
            pass.expires_at = pass.expires_at.max(expires_at);
            pass.updated_at = now;
            self.passes.update(&pass).await?;
            tracing::info!(
                pass_id = %pass.id,
                head_count = pass.head_count,
                "entry pass topped up"
            );
            return Ok(pass);
        }

        let pass = EntryPass {
            id: Uuid::now_v7(),
            user_id,
            head_count: input.head_count,
            amount: input.amount,
            payment_id: input.payment_id,
            transaction_info: input.transaction_info,
            purchased_at: now,
            expires_at,
            status: EntryPassStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.passes.create(&pass).await?;
        tracing::info!(pass_id = %pass.id, head_count = pass.head_count, "entry pass purchased");
        Ok(pass)
    }
}

// ── GetMyEntryPass ───────────────────────────────────────────────────────────

pub struct GetMyEntryPassUseCase<P: EntryPassRepository> {
    pub passes: P,
}

impl<P: EntryPassRepository> GetMyEntryPassUseCase<P> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Option<EntryPass>, ApiError> {
        self.passes.find_usable(user_id, Utc::now()).await
    }
}
