use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use marquee_auth::identity::JwtSecret;
use marquee_core::middleware::SecurityHeaders;
use marquee_core::rate_limit::RateLimiter;

use crate::infra::db::{
    DbCategoryRepository, DbEntryPassRepository, DbEventRepository, DbExhibitionRepository,
    DbPaymentRepository, DbRatingRepository, DbSettingsRepository, DbStatsRepository,
    DbTicketRepository, DbUserRepository,
};
use crate::infra::gateway::MockPaymentGateway;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: JwtSecret,
    pub jwt_expires_secs: u64,
    pub gateway: MockPaymentGateway,
    pub rate_limiter: RateLimiter,
    pub public_base_url: Arc<str>,
    pub security_headers: SecurityHeaders,
    pub cors_allowed_origins: Option<Arc<str>>,
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn event_repo(&self) -> DbEventRepository {
        DbEventRepository {
            db: self.db.clone(),
        }
    }

    pub fn rating_repo(&self) -> DbRatingRepository {
        DbRatingRepository {
            db: self.db.clone(),
        }
    }

    pub fn exhibition_repo(&self) -> DbExhibitionRepository {
        DbExhibitionRepository {
            db: self.db.clone(),
        }
    }

    pub fn ticket_repo(&self) -> DbTicketRepository {
        DbTicketRepository {
            db: self.db.clone(),
        }
    }

    pub fn payment_repo(&self) -> DbPaymentRepository {
        DbPaymentRepository {
            db: self.db.clone(),
        }
    }

    pub fn entry_pass_repo(&self) -> DbEntryPassRepository {
        DbEntryPassRepository {
            db: self.db.clone(),
        }
    }

    pub fn settings_repo(&self) -> DbSettingsRepository {
        DbSettingsRepository {
            db: self.db.clone(),
        }
    }

    pub fn stats_repo(&self) -> DbStatsRepository {
        DbStatsRepository {
            db: self.db.clone(),
        }
    }
}
