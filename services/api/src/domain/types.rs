use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marquee_domain::entry_pass::EntryPassStatus;
use marquee_domain::event::{EventStatus, ExhibitionStatus};
use marquee_domain::payment::{PaymentMethod, PaymentStatus};
use marquee_domain::settings::{EmailProvider, SmsProvider};
use marquee_domain::ticket::{TicketPaymentStatus, TicketStatus};
use marquee_domain::user::{UserRole, UserStatus};

/// Email verification link lifetime.
pub const EMAIL_VERIFICATION_TTL_HOURS: i64 = 24;

/// Password reset link lifetime.
pub const RESET_PASSWORD_TTL_MINUTES: i64 = 10;

/// Length of the random tokens mailed for verification and reset.
pub const MAIL_TOKEN_LEN: usize = 40;

pub const MIN_PASSWORD_LEN: usize = 6;

pub const CURRENCY: &str = "INR";

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub email_verification_token_hash: Option<String>,
    pub email_verification_expires_at: Option<DateTime<Utc>>,
    pub reset_password_token_hash: Option<String>,
    pub reset_password_expires_at: Option<DateTime<Utc>>,
    pub qr_code: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub venue: String,
    pub category_id: Option<Uuid>,
    pub exhibition_id: Option<Uuid>,
    /// Minor currency units.
    pub price: i64,
    pub capacity: i32,
    pub status: EventStatus,
    pub image: Option<String>,
    pub gallery: Vec<String>,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub terms: Option<String>,
    pub organizer_id: Uuid,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scheduled occurrence of an event with its own seat counter.
#[derive(Debug, Clone)]
pub struct Show {
    pub id: Uuid,
    pub event_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub seat_capacity: i32,
    pub seats_booked: i32,
    pub created_at: DateTime<Utc>,
}

impl Show {
    pub fn seats_left(&self) -> i32 {
        (self.seat_capacity - self.seats_booked).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: Uuid,
    pub ticket_number: String,
    pub qr_code: Option<String>,
    pub purchased_by: Uuid,
    pub issued_by: Uuid,
    pub event_id: Uuid,
    pub show_id: Option<Uuid>,
    pub head_count: i32,
    pub attendees: Vec<Attendee>,
    pub total_amount: i64,
    pub payment_status: TicketPaymentStatus,
    pub payment_id: Option<Uuid>,
    pub entry_pass_id: Option<Uuid>,
    pub status: TicketStatus,
    pub purchase_date: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
    pub attended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Status pair a guarded ticket write expects to find on the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketState {
    pub status: TicketStatus,
    pub payment_status: TicketPaymentStatus,
}

impl Ticket {
    pub fn state(&self) -> TicketState {
        TicketState {
            status: self.status,
            payment_status: self.payment_status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ticket_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub refund_amount: Option<i64>,
    pub refund_id: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pre-paid head-count credit spent when booking.
#[derive(Debug, Clone)]
pub struct EntryPass {
    pub id: Uuid,
    pub user_id: Uuid,
    pub head_count: i32,
    pub amount: i64,
    pub payment_id: String,
    pub transaction_info: serde_json::Value,
    pub purchased_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: EntryPassStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntryPass {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.status == EntryPassStatus::Active && self.expires_at > now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Exhibition {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub venue: Venue,
    pub map_layout: Option<String>,
    pub organizer_id: Option<Uuid>,
    pub status: ExhibitionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Runtime-mutable site settings (singleton row).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub site_name: String,
    pub contact_email: String,
    pub description: Option<String>,
    pub enable_qr_scanning: bool,
    pub require_email_verification: bool,
    pub allow_ticket_transfers: bool,
    pub enable_email_notifications: bool,
    pub enable_sms_notifications: bool,
    pub sms_provider: SmsProvider,
    pub email_provider: EmailProvider,
    pub email_from: Option<String>,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
    pub entry_pass_expiration_days: i32,
    pub updated_at: DateTime<Utc>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_name: "Event Management System".to_owned(),
            contact_email: "admin@example.com".to_owned(),
            description: Some("Event management and ticket booking system".to_owned()),
            enable_qr_scanning: true,
            require_email_verification: true,
            allow_ticket_transfers: true,
            enable_email_notifications: true,
            enable_sms_notifications: false,
            sms_provider: SmsProvider::None,
            email_provider: EmailProvider::Smtp,
            email_from: None,
            maintenance_mode: false,
            maintenance_message: "System is under maintenance. Please try again later.".to_owned(),
            entry_pass_expiration_days: 30,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl Settings {
    pub fn entry_pass_ttl(&self) -> Duration {
        Duration::days(i64::from(self.entry_pass_expiration_days.max(1)))
    }
}

/// Outbox event for async delivery (verification mail, ticket confirmation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

impl OutboxEvent {
    /// Build an event keyed by `<kind>:<subject>`. The subject must identify
    /// one delivery, so a replayed write hits the unique key instead of
    /// queueing a second message.
    pub fn new(kind: &str, subject: impl std::fmt::Display, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind: kind.to_owned(),
            payload,
            idempotency_key: format!("{kind}:{subject}"),
        }
    }
}

pub mod outbox_kind {
    pub const EMAIL_VERIFICATION_REQUESTED: &str = "email_verification_requested";
    pub const PASSWORD_RESET_REQUESTED: &str = "password_reset_requested";
    pub const TICKET_CONFIRMED: &str = "ticket_confirmed";
    pub const REFUND_PROCESSED: &str = "refund_processed";
}

// ── List filters ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub exhibition_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicketFilter {
    pub purchased_by: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub status: Option<TicketStatus>,
    pub payment_status: Option<TicketPaymentStatus>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RatingFilter {
    pub event_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub min_rating: Option<i16>,
}

// ── Admin statistics ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_users: u64,
    pub new_users: u64,
    pub total_events: u64,
    pub upcoming_events: u64,
    pub total_tickets: u64,
    pub active_tickets: u64,
    /// `(status, count)` for every ticket status present.
    pub tickets_by_status: Vec<(String, u64)>,
    pub total_revenue: i64,
    pub period_revenue: i64,
}
