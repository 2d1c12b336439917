//! sea-orm entities for the Marquee API database.

pub mod categories;
pub mod entry_passes;
pub mod events;
pub mod exhibitions;
pub mod outbox_events;
pub mod payments;
pub mod ratings;
pub mod settings;
pub mod shows;
pub mod tickets;
pub mod users;
