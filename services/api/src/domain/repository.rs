#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use marquee_domain::event::ExhibitionStatus;
use marquee_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    Category, DashboardStats, DateRange, EntryPass, Event, EventFilter, Exhibition, OutboxEvent,
    Payment, PaymentFilter, Rating, RatingFilter, Settings, Show, Ticket, TicketFilter,
    TicketState, User,
};
use crate::error::ApiError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_verification_token(&self, token_hash: &str)
    -> Result<Option<User>, ApiError>;
    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, ApiError>;
    async fn admin_exists(&self) -> Result<bool, ApiError>;
    async fn list(&self, page: PageRequest) -> Result<Page<User>, ApiError>;

    /// Insert a user. A duplicate email yields `UserAlreadyExists`.
    async fn create(&self, user: &User, outbox: Option<&OutboxEvent>) -> Result<(), ApiError>;

    /// Overwrite every mutable column. A duplicate email yields `UserAlreadyExists`.
    async fn update(&self, user: &User, outbox: Option<&OutboxEvent>) -> Result<(), ApiError>;

    /// Whether any ticket, payment or organized event still points at the user.
    async fn has_records(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Delete a user. Returns `true` if a row was deleted. A user still
    /// referenced by other rows yields `UserHasRecords`.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, ApiError>;
    async fn find_by_title(&self, title: &str) -> Result<Option<Category>, ApiError>;
    async fn create(&self, category: &Category) -> Result<(), ApiError>;
}

/// Repository for events and their shows.
pub trait EventRepository: Send + Sync {
    async fn list(&self, filter: EventFilter, page: PageRequest) -> Result<Page<Event>, ApiError>;
    async fn list_by_exhibition(&self, exhibition_id: Uuid) -> Result<Vec<Event>, ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ApiError>;
    async fn create(&self, event: &Event) -> Result<(), ApiError>;
    async fn update(&self, event: &Event) -> Result<(), ApiError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
    async fn count_tickets(&self, event_id: Uuid) -> Result<u64, ApiError>;
    /// Head count held by tickets that still occupy capacity.
    async fn seats_taken(&self, event_id: Uuid) -> Result<i64, ApiError>;
    async fn list_shows(&self, event_id: Uuid) -> Result<Vec<Show>, ApiError>;
    async fn find_show(&self, show_id: Uuid) -> Result<Option<Show>, ApiError>;
    async fn create_show(&self, show: &Show) -> Result<(), ApiError>;
}

pub trait RatingRepository: Send + Sync {
    async fn list(&self, filter: RatingFilter, page: PageRequest)
    -> Result<Page<Rating>, ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, ApiError>;
    async fn find_by_user_and_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Rating>, ApiError>;
    /// A duplicate `(user, event)` yields `AlreadyRated`.
    async fn create(&self, rating: &Rating) -> Result<(), ApiError>;
    async fn update(&self, rating: &Rating) -> Result<(), ApiError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
    /// Recompute and store the event's average rating, rounded to one decimal.
    async fn refresh_average(&self, event_id: Uuid) -> Result<f64, ApiError>;
    /// Whether the user holds a verified, admitted ticket for the event.
    async fn has_attended(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, ApiError>;
}

pub trait ExhibitionRepository: Send + Sync {
    async fn list(
        &self,
        status: Option<ExhibitionStatus>,
        page: PageRequest,
    ) -> Result<Page<Exhibition>, ApiError>;
    async fn list_starting_after(&self, now: DateTime<Utc>) -> Result<Vec<Exhibition>, ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Exhibition>, ApiError>;
    async fn create(&self, exhibition: &Exhibition) -> Result<(), ApiError>;
    async fn update(&self, exhibition: &Exhibition) -> Result<(), ApiError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for tickets. Seat and credit bookkeeping happen in the same
/// transaction as the ticket write.
pub trait TicketRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, ApiError>;
    async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<Ticket>, ApiError>;
    async fn list(&self, filter: TicketFilter, page: PageRequest)
    -> Result<Page<Ticket>, ApiError>;

    /// Reserve seats (show counter or event capacity), debit the entry pass when
    /// `ticket.entry_pass_id` is set, then insert the ticket.
    ///
    /// Fails with `SoldOut` or `InsufficientPassCredit` without writing anything.
    async fn book(&self, ticket: &Ticket, outbox: Option<&OutboxEvent>) -> Result<(), ApiError>;

    /// Write the ticket if the stored row is still in `expected`. Returns
    /// `false` and writes nothing when another request changed it first.
    async fn update(&self, ticket: &Ticket, expected: TicketState) -> Result<bool, ApiError>;

    /// Guarded like `update`. Show seats are handed back only when the write lands.
    async fn update_releasing_seats(
        &self,
        ticket: &Ticket,
        expected: TicketState,
    ) -> Result<bool, ApiError>;
}

pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> Result<(), ApiError>;
    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>, ApiError>;
    async fn find_completed_for_ticket(&self, ticket_id: Uuid)
    -> Result<Option<Payment>, ApiError>;
    async fn list(
        &self,
        filter: PaymentFilter,
        page: PageRequest,
    ) -> Result<Page<Payment>, ApiError>;
    async fn list_all(&self) -> Result<Vec<Payment>, ApiError>;

    // The writes below touch the ticket only if it is still in `expected`.
    // When it is not they roll back and return `false`.

    /// Store a failed verification on both records.
    async fn record_failure(
        &self,
        payment: &Payment,
        ticket: &Ticket,
        expected: TicketState,
    ) -> Result<bool, ApiError>;

    /// Store a verified payment, the paid ticket and its confirmation event atomically.
    async fn complete(
        &self,
        payment: &Payment,
        ticket: &Ticket,
        expected: TicketState,
        outbox: &OutboxEvent,
    ) -> Result<bool, ApiError>;

    /// Store the refund on both records and queue the notice atomically. Show
    /// seats are handed back when `release_seats` is set.
    async fn refund(
        &self,
        payment: &Payment,
        ticket: &Ticket,
        expected: TicketState,
        outbox: &OutboxEvent,
        release_seats: bool,
    ) -> Result<bool, ApiError>;
}

pub trait EntryPassRepository: Send + Sync {
    /// The user's active pass that has not expired at `now`.
    async fn find_usable(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<EntryPass>, ApiError>;
    async fn create(&self, pass: &EntryPass) -> Result<(), ApiError>;
    async fn update(&self, pass: &EntryPass) -> Result<(), ApiError>;
}

pub trait SettingsRepository: Send + Sync {
    async fn get(&self) -> Result<Option<Settings>, ApiError>;
    async fn upsert(&self, settings: &Settings) -> Result<(), ApiError>;
}

pub trait StatsRepository: Send + Sync {
    async fn dashboard(
        &self,
        range: DateRange,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, ApiError>;
}

// ── Payment gateway ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    pub order_id: String,
    /// Credentials a client would receive from the checkout widget.
    pub payment_id: String,
    pub signature: String,
}

/// Port for the external payment processor.
pub trait PaymentGateway: Send + Sync {
    fn create_order(&self, amount: i64, currency: &str) -> GatewayOrder;
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
    fn refund(&self, gateway_payment_id: &str, amount: i64) -> String;
}
