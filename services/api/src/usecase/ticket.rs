use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use marquee_auth::secret::{random_hex, sha256_hex};
use marquee_domain::pagination::{Page, PageRequest};
use marquee_domain::ticket::{
    QrPayload, TicketPaymentStatus, TicketStatus, qr_seed, ticket_number, unusable_reason,
};

use crate::domain::repository::{EntryPassRepository, EventRepository, TicketRepository};
use crate::domain::types::{Attendee, OutboxEvent, Ticket, TicketFilter, User, outbox_kind};
use crate::domain::validation::Validator;
use crate::error::ApiError;

const TICKET_SUFFIX_HEX_LEN: usize = 6;

/// A ticket together with the QR payload issued in the same operation, if any.
#[derive(Debug, Clone)]
pub struct IssuedTicket {
    pub ticket: Ticket,
    pub qr_payload: Option<QrPayload>,
}

/// Stamp a fresh QR code on `ticket` and return the payload the client encodes.
pub(crate) fn issue_qr(ticket: &mut Ticket, now: DateTime<Utc>) -> QrPayload {
    let timestamp = now.timestamp_millis();
    let qr_code = sha256_hex(&qr_seed(&ticket.ticket_number, &ticket.id, timestamp));
    ticket.qr_code = Some(qr_code.clone());
    QrPayload {
        ticket_id: ticket.id.to_string(),
        ticket_number: ticket.ticket_number.clone(),
        qr_code,
        timestamp,
    }
}

pub(crate) fn confirmation_event(ticket: &Ticket, user_email: &str) -> OutboxEvent {
    OutboxEvent::new(
        outbox_kind::TICKET_CONFIRMED,
        ticket.id,
        json!({
            "ticket_id": ticket.id,
            "ticket_number": ticket.ticket_number,
            "user_id": ticket.purchased_by,
            "email": user_email,
            "event_id": ticket.event_id,
            "show_id": ticket.show_id,
            "head_count": ticket.head_count,
        }),
    )
}

// ── BookTicket ───────────────────────────────────────────────────────────────

pub struct BookTicketInput {
    pub event_id: Uuid,
    pub show_id: Option<Uuid>,
    pub head_count: i32,
    pub attendees: Vec<Attendee>,
    pub use_entry_pass: bool,
}

pub struct BookTicketUseCase<T: TicketRepository, E: EventRepository, P: EntryPassRepository> {
    pub tickets: T,
    pub events: E,
    pub passes: P,
}

impl<T, E, P> BookTicketUseCase<T, E, P>
where
    T: TicketRepository,
    E: EventRepository,
    P: EntryPassRepository,
{
    pub async fn execute(
        &self,
        user: &User,
        input: BookTicketInput,
    ) -> Result<IssuedTicket, ApiError> {
        let mut v = Validator::new();
        v.check(input.head_count >= 1, "head_count must be at least 1");
        if !input.attendees.is_empty() {
            v.check(
                i32::try_from(input.attendees.len()).is_ok_and(|n| n == input.head_count),
                "attendees must list exactly head_count people",
            );
            for (i, attendee) in input.attendees.iter().enumerate() {
                v.text(&format!("attendees[{i}].name"), &attendee.name, 100);
            }
        }
        v.finish()?;

        let event = self
            .events
            .find_by_id(input.event_id)
            .await?
            .ok_or(ApiError::EventNotFound)?;
        if !event.status.is_bookable() {
            return Err(ApiError::EventNotBookable);
        }
        if let Some(show_id) = input.show_id {
            let show = self.events.find_show(show_id).await?;
            if show.is_none_or(|s| s.event_id != event.id) {
                return Err(ApiError::ShowNotFound);
            }
        }

        let now = Utc::now();
        let entry_pass_id = if input.use_entry_pass {
            let pass = self
                .passes
                .find_usable(user.id, now)
                .await?
                .filter(|p| p.head_count >= input.head_count)
                .ok_or(ApiError::InsufficientPassCredit)?;
            Some(pass.id)
        } else {
            None
        };

        let total_amount = if entry_pass_id.is_some() {
            0
        } else {
            event
                .price
                .checked_mul(i64::from(input.head_count))
                .ok_or_else(|| ApiError::invalid("total amount is too large"))?
        };

        let mut ticket = Ticket {
            id: Uuid::now_v7(),
            ticket_number: ticket_number(
                now.timestamp_millis(),
                &random_hex(TICKET_SUFFIX_HEX_LEN),
            ),
            qr_code: None,
            purchased_by: user.id,
            issued_by: user.id,
            event_id: event.id,
            show_id: input.show_id,
            head_count: input.head_count,
            attendees: input.attendees,
            total_amount,
            payment_status: TicketPaymentStatus::Pending,
            payment_id: None,
            entry_pass_id,
            status: TicketStatus::Active,
            purchase_date: now,
            verified_at: None,
            verified_by: None,
            attended_at: None,
            created_at: now,
            updated_at: now,
        };

        // Pass credit is the payment, so the ticket is admissible right away.
        let (qr_payload, outbox) = if entry_pass_id.is_some() {
            ticket.payment_status = TicketPaymentStatus::Completed;
            let payload = issue_qr(&mut ticket, now);
            let outbox = confirmation_event(&ticket, &user.email);
            (Some(payload), Some(outbox))
        } else {
            (None, None)
        };

        self.tickets.book(&ticket, outbox.as_ref()).await?;
        tracing::info!(
            ticket_id = %ticket.id,
            event_id = %ticket.event_id,
            head_count = ticket.head_count,
            entry_pass = entry_pass_id.is_some(),
            "ticket booked"
        );
        Ok(IssuedTicket { ticket, qr_payload })
    }
}

// ── ListTickets ──────────────────────────────────────────────────────────────

pub struct ListTicketsUseCase<T: TicketRepository> {
    pub tickets: T,
}

impl<T: TicketRepository> ListTicketsUseCase<T> {
    pub async fn execute(
        &self,
        filter: TicketFilter,
        page: PageRequest,
    ) -> Result<Page<Ticket>, ApiError> {
        self.tickets.list(filter, page.clamped()).await
    }
}

// ── GetTicket ────────────────────────────────────────────────────────────────

pub struct GetTicketUseCase<T: TicketRepository> {
    pub tickets: T,
}

impl<T: TicketRepository> GetTicketUseCase<T> {
    /// The owner, staff and admins may read a ticket.
    pub async fn execute(&self, user: &User, id: Uuid) -> Result<Ticket, ApiError> {
        let ticket = self
            .tickets
            .find_by_id(id)
            .await?
            .ok_or(ApiError::TicketNotFound)?;
        if ticket.purchased_by != user.id && !user.role.is_staff() {
            return Err(ApiError::Forbidden);
        }
        Ok(ticket)
    }
}

// ── VerifyTicket ─────────────────────────────────────────────────────────────

/// How scanned QR data identifies a ticket.
#[derive(Debug, PartialEq, Eq)]
enum QrLookup {
    /// JSON payload: ticket id plus the code it claims to carry.
    Payload { ticket_id: Uuid, qr_code: String },
    /// A bare stored QR code.
    Code(String),
}

fn parse_qr_data(qr_data: &str) -> Result<QrLookup, ApiError> {
    let qr_data = qr_data.trim();
    if qr_data.is_empty() {
        return Err(ApiError::InvalidQr);
    }
    if qr_data.starts_with('{') {
        let payload: QrPayload = serde_json::from_str(qr_data).map_err(|_| ApiError::InvalidQr)?;
        let ticket_id = payload
            .ticket_id
            .parse::<Uuid>()
            .map_err(|_| ApiError::InvalidQr)?;
        let qr_code = payload.qr_code.trim();
        if qr_code.is_empty() {
            return Err(ApiError::InvalidQr);
        }
        return Ok(QrLookup::Payload {
            ticket_id,
            qr_code: qr_code.to_owned(),
        });
    }
    Ok(QrLookup::Code(qr_data.to_owned()))
}

#[derive(Debug)]
pub struct TicketVerification {
    pub ticket: Ticket,
    pub can_be_used: bool,
    pub status_message: String,
}

pub struct VerifyTicketUseCase<T: TicketRepository> {
    pub tickets: T,
}

impl<T: TicketRepository> VerifyTicketUseCase<T> {
    /// Look up a scanned ticket and report whether it admits. Writes nothing.
    pub async fn execute(&self, qr_data: &str) -> Result<TicketVerification, ApiError> {
        let ticket = match parse_qr_data(qr_data)? {
            QrLookup::Payload { ticket_id, qr_code } => {
                let ticket = self
                    .tickets
                    .find_by_id(ticket_id)
                    .await?
                    .ok_or(ApiError::InvalidQr)?;
                if ticket.qr_code.as_deref() != Some(qr_code.as_str()) {
                    tracing::warn!(ticket_id = %ticket_id, "QR payload code does not match ticket");
                    return Err(ApiError::InvalidQr);
                }
                ticket
            }
            QrLookup::Code(code) => self
                .tickets
                .find_by_qr_code(&code)
                .await?
                .ok_or(ApiError::InvalidQr)?,
        };
        let reason = unusable_reason(ticket.status, ticket.payment_status);
        Ok(TicketVerification {
            can_be_used: reason.is_none(),
            status_message: reason.unwrap_or_else(|| "Ticket is valid".to_owned()),
            ticket,
        })
    }
}

// ── VerifyQrCode ─────────────────────────────────────────────────────────────

pub struct VerifyQrCodeUseCase<T: TicketRepository> {
    pub tickets: T,
}

impl<T: TicketRepository> VerifyQrCodeUseCase<T> {
    pub async fn execute(&self, qr_code: &str) -> Result<Ticket, ApiError> {
        Validator::new().text("qr_code", qr_code, 128).finish()?;
        self.tickets
            .find_by_qr_code(qr_code.trim())
            .await?
            .ok_or(ApiError::TicketNotFound)
    }
}

// ── MarkAttended ─────────────────────────────────────────────────────────────

pub struct MarkAttendedUseCase<T: TicketRepository> {
    pub tickets: T,
}

impl<T: TicketRepository> MarkAttendedUseCase<T> {
    pub async fn execute(&self, staff_id: Uuid, ticket_id: Uuid) -> Result<Ticket, ApiError> {
        let mut ticket = self
            .tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or(ApiError::TicketNotFound)?;
        if let Some(reason) = unusable_reason(ticket.status, ticket.payment_status) {
            return Err(ApiError::TicketNotUsable(reason));
        }
        let expected = ticket.state();
        let now = Utc::now();
        ticket.status = ticket.status.transition(TicketStatus::Used)?;
        ticket.verified_at = Some(now);
        ticket.verified_by = Some(staff_id);
        ticket.attended_at = Some(now);
        ticket.updated_at = now;
        if !self.tickets.update(&ticket, expected).await? {
            tracing::warn!(
                ticket_id = %ticket.id,
                staff_id = %staff_id,
                "ticket changed during admission"
            );
            let current = self
                .tickets
                .find_by_id(ticket.id)
                .await?
                .ok_or(ApiError::TicketNotFound)?;
            return Err(unusable_reason(current.status, current.payment_status)
                .map_or(ApiError::TicketChanged, ApiError::TicketNotUsable));
        }
        tracing::info!(ticket_id = %ticket.id, staff_id = %staff_id, "ticket attended");
        Ok(ticket)
    }
}

// ── SetTicketStatus ──────────────────────────────────────────────────────────

/// Explain a guarded write that lost to another request by re-reading what
/// the ticket turned into.
pub(crate) async fn lost_write<T: TicketRepository>(
    tickets: &T,
    id: Uuid,
    to: TicketStatus,
) -> ApiError {
    match tickets.find_by_id(id).await {
        Ok(Some(current)) => match current.status.transition(to) {
            Err(e) => e.into(),
            Ok(_) => ApiError::TicketChanged,
        },
        Ok(None) => ApiError::TicketNotFound,
        Err(e) => e,
    }
}

/// Apply a status change and persist it, releasing show seats when the ticket
/// stops holding them.
async fn change_status<T: TicketRepository>(
    tickets: &T,
    id: Uuid,
    to: TicketStatus,
) -> Result<Ticket, ApiError> {
    let mut ticket = tickets
        .find_by_id(id)
        .await?
        .ok_or(ApiError::TicketNotFound)?;
    let expected = ticket.state();
    let from = ticket.status;
    ticket.status = from.transition(to)?;
    ticket.updated_at = Utc::now();
    let written = if from.holds_seats() && !to.holds_seats() {
        tickets.update_releasing_seats(&ticket, expected).await?
    } else {
        tickets.update(&ticket, expected).await?
    };
    if !written {
        return Err(lost_write(tickets, id, to).await);
    }
    tracing::info!(ticket_id = %id, from = %from, to = %to, "ticket status changed");
    Ok(ticket)
}

pub struct SetTicketStatusUseCase<T: TicketRepository> {
    pub tickets: T,
}

impl<T: TicketRepository> SetTicketStatusUseCase<T> {
    pub async fn execute(&self, id: Uuid, status: TicketStatus) -> Result<Ticket, ApiError> {
        change_status(&self.tickets, id, status).await
    }
}

// ── CancelTicket ─────────────────────────────────────────────────────────────

pub struct CancelTicketUseCase<T: TicketRepository> {
    pub tickets: T,
}

impl<T: TicketRepository> CancelTicketUseCase<T> {
    pub async fn execute(&self, id: Uuid) -> Result<Ticket, ApiError> {
        change_status(&self.tickets, id, TicketStatus::Cancelled).await
    }
}
