//! Cross-cutting HTTP plumbing shared by Marquee services.
//!
//! Error envelope, health probes, request-id and security-header layers,
//! CORS, rate limiting, tracing setup and serde helpers.

pub mod cors;
pub mod error;
pub mod health;
pub mod middleware;
pub mod rate_limit;
pub mod serde;
pub mod tracing;
