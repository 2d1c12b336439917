pub mod admin;
pub mod auth;
pub mod category;
pub mod entry_pass;
pub mod event;
pub mod exhibition;
pub mod payment;
pub mod rating;
pub mod settings;
pub mod ticket;
pub mod user;
