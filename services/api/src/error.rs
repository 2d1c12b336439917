use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sea_orm::{DbErr, SqlErr};

use marquee_core::error::AppError;
use marquee_domain::ticket::InvalidTransition;

/// API error variants. Each maps to one status code and a stable `kind`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 400
    #[error("validation failed")]
    Validation(Vec<String>),
    #[error("missing data")]
    MissingData,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("email already verified")]
    AlreadyVerified,
    #[error("an admin account already exists")]
    AdminAlreadyExists,
    #[error("invalid QR code")]
    InvalidQr,
    #[error("invalid payment signature")]
    InvalidSignature,
    #[error("cannot deactivate your own account")]
    CannotDeactivateSelf,

    // 401
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is not active")]
    AccountInactive,
    #[error("current password is incorrect")]
    InvalidPassword,

    // 403
    #[error("forbidden")]
    Forbidden,
    #[error("only attendees can rate this event")]
    NotAttended,

    // 404
    #[error("user not found")]
    UserNotFound,
    #[error("event not found")]
    EventNotFound,
    #[error("show not found")]
    ShowNotFound,
    #[error("ticket not found")]
    TicketNotFound,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("rating not found")]
    RatingNotFound,
    #[error("exhibition not found")]
    ExhibitionNotFound,

    // 409
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("category already exists")]
    CategoryAlreadyExists,
    #[error("event already rated")]
    AlreadyRated,
    #[error("user still owns tickets or events")]
    UserHasRecords,
    #[error("event has tickets")]
    EventHasTickets,
    #[error("event is not open for booking")]
    EventNotBookable,
    #[error("sold out")]
    SoldOut,
    #[error("insufficient entry pass credit")]
    InsufficientPassCredit,
    #[error("ticket already paid")]
    AlreadyPaid,
    #[error("ticket cannot be used: {0}")]
    TicketNotUsable(String),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("ticket was changed by another request")]
    TicketChanged,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::MissingData => "MISSING_DATA",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::AlreadyVerified => "ALREADY_VERIFIED",
            Self::AdminAlreadyExists => "ADMIN_ALREADY_EXISTS",
            Self::InvalidQr => "INVALID_QR",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::CannotDeactivateSelf => "CANNOT_DEACTIVATE_SELF",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::Forbidden => "FORBIDDEN",
            Self::NotAttended => "NOT_ATTENDED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::EventNotFound => "EVENT_NOT_FOUND",
            Self::ShowNotFound => "SHOW_NOT_FOUND",
            Self::TicketNotFound => "TICKET_NOT_FOUND",
            Self::PaymentNotFound => "PAYMENT_NOT_FOUND",
            Self::RatingNotFound => "RATING_NOT_FOUND",
            Self::ExhibitionNotFound => "EXHIBITION_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::CategoryAlreadyExists => "CATEGORY_ALREADY_EXISTS",
            Self::AlreadyRated => "ALREADY_RATED",
            Self::UserHasRecords => "USER_HAS_RECORDS",
            Self::EventHasTickets => "EVENT_HAS_TICKETS",
            Self::EventNotBookable => "EVENT_NOT_BOOKABLE",
            Self::SoldOut => "SOLD_OUT",
            Self::InsufficientPassCredit => "INSUFFICIENT_PASS_CREDIT",
            Self::AlreadyPaid => "ALREADY_PAID",
            Self::TicketNotUsable(_) => "TICKET_NOT_USABLE",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::TicketChanged => "TICKET_CHANGED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::MissingData
            | Self::InvalidToken
            | Self::AlreadyVerified
            | Self::AdminAlreadyExists
            | Self::InvalidQr
            | Self::InvalidSignature
            | Self::CannotDeactivateSelf => StatusCode::BAD_REQUEST,
            Self::Unauthorized
            | Self::InvalidCredentials
            | Self::AccountInactive
            | Self::InvalidPassword => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotAttended => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::EventNotFound
            | Self::ShowNotFound
            | Self::TicketNotFound
            | Self::PaymentNotFound
            | Self::RatingNotFound
            | Self::ExhibitionNotFound => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists
            | Self::CategoryAlreadyExists
            | Self::AlreadyRated
            | Self::UserHasRecords
            | Self::EventHasTickets
            | Self::EventNotBookable
            | Self::SoldOut
            | Self::InsufficientPassCredit
            | Self::AlreadyPaid
            | Self::TicketNotUsable(_)
            | Self::InvalidTransition(_)
            | Self::TicketChanged => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Single-message validation failure.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Map a driver error, turning a unique-key violation into `on_conflict`.
    pub fn from_db(err: DbErr, on_conflict: ApiError, context: &'static str) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return on_conflict;
        }
        Self::Internal(anyhow::Error::new(err).context(context))
    }

    /// Map a failed delete, turning a foreign-key violation into `on_referenced`.
    pub fn from_delete(err: DbErr, on_referenced: ApiError, context: &'static str) -> Self {
        let sql = err.sql_err();
        Self::referenced_or_internal(sql, err, on_referenced, context)
    }

    fn referenced_or_internal(
        sql: Option<SqlErr>,
        err: DbErr,
        on_referenced: ApiError,
        context: &'static str,
    ) -> Self {
        match sql {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => on_referenced,
            _ => Self::Internal(anyhow::Error::new(err).context(context)),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Unauthorized => Self::Unauthorized,
            AppError::Forbidden => Self::Forbidden,
            AppError::Internal(e) => Self::Internal(e),
            other => Self::Internal(anyhow::anyhow!("unexpected shared error: {other}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Validation(errors) = self {
            body["errors"] = serde_json::json!(errors);
        }
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = error.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn should_list_validation_errors() {
        let (status, json) = body_of(ApiError::Validation(vec![
            "name is required".to_owned(),
            "password must be at least 6 characters".to_owned(),
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "VALIDATION_FAILED");
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_return_invalid_credentials() {
        let (status, json) = body_of(ApiError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["kind"], "INVALID_CREDENTIALS");
        assert_eq!(json["message"], "invalid credentials");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn should_return_not_attended() {
        let (status, json) = body_of(ApiError::NotAttended).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["kind"], "NOT_ATTENDED");
    }

    #[tokio::test]
    async fn should_return_event_not_found() {
        let (status, json) = body_of(ApiError::EventNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["kind"], "EVENT_NOT_FOUND");
    }

    #[tokio::test]
    async fn should_return_sold_out_as_conflict() {
        let (status, json) = body_of(ApiError::SoldOut).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["kind"], "SOLD_OUT");
    }

    #[tokio::test]
    async fn should_describe_invalid_transition() {
        let err: ApiError = marquee_domain::ticket::TicketStatus::Refunded
            .transition(marquee_domain::ticket::TicketStatus::Active)
            .unwrap_err()
            .into();
        let (status, json) = body_of(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["kind"], "INVALID_TRANSITION");
        assert_eq!(
            json["message"],
            "cannot move ticket from refunded to active"
        );
    }

    #[tokio::test]
    async fn should_hide_internal_details() {
        let (status, json) = body_of(ApiError::Internal(anyhow::anyhow!("db down"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["kind"], "INTERNAL");
        assert_eq!(json["message"], "internal error");
    }

    #[test]
    fn should_keep_non_unique_db_errors_internal() {
        let err = ApiError::from_db(
            DbErr::Custom("boom".to_owned()),
            ApiError::UserAlreadyExists,
            "insert user",
        );
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn should_map_referenced_row_to_conflict() {
        let err = ApiError::referenced_or_internal(
            Some(SqlErr::ForeignKeyConstraintViolation(
                "tickets_purchased_by_fkey".to_owned(),
            )),
            DbErr::Custom("fk".to_owned()),
            ApiError::UserHasRecords,
            "delete user",
        );
        assert!(matches!(err, ApiError::UserHasRecords));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let other = ApiError::from_delete(
            DbErr::Custom("boom".to_owned()),
            ApiError::UserHasRecords,
            "delete user",
        );
        assert!(matches!(other, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn should_return_ticket_changed_as_conflict() {
        let (status, json) = body_of(ApiError::TicketChanged).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["kind"], "TICKET_CHANGED");
    }
}
