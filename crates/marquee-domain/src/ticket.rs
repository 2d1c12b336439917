//! Ticket lifecycle types and the status transition table.
//!
//! Every status write in the system goes through [`TicketStatus::transition`] or
//! [`TicketPaymentStatus::transition`] so the allowed moves live in one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::UnknownVariant;

/// Admission state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Active,
    Used,
    Expired,
    Cancelled,
    Refunded,
}

/// Payment state of a ticket, mirrored from its payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Rejected status change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot move ticket from {from} to {to}")]
pub struct InvalidTransition {
    pub from: String,
    pub to: String,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Used => "used",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Whether `self → to` is an allowed move.
    ///
    /// | from \ to | used | expired | cancelled | refunded |
    /// |-----------|------|---------|-----------|----------|
    /// | active    | ✓    | ✓       | ✓         | ✓        |
    /// | used      |      |         |           | ✓        |
    /// | expired   |      |         |           | ✓        |
    /// | cancelled |      |         |           | ✓        |
    /// | refunded  |      |         |           |          |
    pub fn can_transition_to(self, to: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, to),
            (Active, Used | Expired | Cancelled | Refunded)
                | (Used | Expired | Cancelled, Refunded)
        )
    }

    pub fn transition(self, to: TicketStatus) -> Result<TicketStatus, InvalidTransition> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Statuses whose head count still occupies event capacity.
    pub fn holds_seats(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Refunded)
    }
}

impl TicketPaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// `pending → completed | failed`, `failed → completed`, `completed → refunded`.
    pub fn can_transition_to(self, to: TicketPaymentStatus) -> bool {
        use TicketPaymentStatus::*;
        matches!(
            (self, to),
            (Pending, Completed | Failed) | (Failed, Completed) | (Completed, Refunded)
        )
    }

    pub fn transition(
        self,
        to: TicketPaymentStatus,
    ) -> Result<TicketPaymentStatus, InvalidTransition> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

/// Explain why a ticket cannot be admitted, or `None` if it can.
///
/// An unpaid ticket is reported before its admission status.
pub fn unusable_reason(status: TicketStatus, payment: TicketPaymentStatus) -> Option<String> {
    if payment != TicketPaymentStatus::Completed {
        return Some(format!("Payment status: {payment}"));
    }
    if status != TicketStatus::Active {
        return Some(format!("Ticket status: {status}"));
    }
    None
}

/// `TIX-<last 6 digits of unix_ms>-<suffix upper-cased>`.
pub fn ticket_number(unix_ms: i64, suffix: &str) -> String {
    format!(
        "TIX-{:06}-{}",
        unix_ms.rem_euclid(1_000_000),
        suffix.to_ascii_uppercase()
    )
}

/// Input whose SHA-256 becomes a ticket's QR code.
pub fn qr_seed(ticket_number: &str, ticket_id: &impl fmt::Display, unix_ms: i64) -> String {
    format!("{ticket_number}-{ticket_id}-{unix_ms}")
}

/// Verification payload encoded into a ticket's QR image by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub ticket_id: String,
    #[serde(default)]
    pub ticket_number: String,
    #[serde(default)]
    pub qr_code: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "used" => Ok(Self::Used),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownVariant::new("ticket status", other)),
        }
    }
}

impl fmt::Display for TicketPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketPaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownVariant::new("payment status", other)),
        }
    }
}
