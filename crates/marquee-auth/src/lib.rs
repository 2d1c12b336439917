//! Authentication building blocks shared by Marquee services.
//!
//! Provides JWT issue/validation, password hashing, opaque token helpers,
//! the bearer-token `Identity` extractor and role guards.

pub mod guard;
pub mod identity;
pub mod password;
pub mod secret;
pub mod token;
