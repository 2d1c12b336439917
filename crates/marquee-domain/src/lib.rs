//! Domain types shared across Marquee crates.
//!
//! Pure types with no framework dependencies: roles, statuses, the ticket
//! transition table and pagination. Stored as strings and parsed back with `FromStr`.

use thiserror::Error;

pub mod entry_pass;
pub mod event;
pub mod pagination;
pub mod payment;
pub mod settings;
pub mod ticket;
pub mod user;

/// Error returned when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
