pub mod admin;
pub mod auth;
pub mod category;
pub mod entry_pass;
pub mod event;
pub mod exhibition;
pub mod health;
pub mod payment;
pub mod rating;
pub mod settings;
pub mod ticket;
pub mod user;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use marquee_domain::pagination::{Page, PageMeta, PageRequest};

use crate::error::ApiError;

/// `?page=&limit=` for list endpoints without extra filters.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Envelope for paged lists: `{ data, pagination }`.
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Paged<T> {
    pub fn from_page<U>(page: Page<U>, request: PageRequest, f: impl FnMut(U) -> T) -> Self {
        let page = page.map(f);
        Self {
            pagination: PageMeta::new(request, page.total),
            data: page.items,
        }
    }
}

/// Envelope for unpaged lists: `{ data, count }`.
#[derive(Debug, Serialize)]
pub struct Listed<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> Listed<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Parse an optional enum query parameter. An unknown value is a 400.
pub(crate) fn parse_param<T: FromStr>(
    field: &str,
    value: Option<&str>,
) -> Result<Option<T>, ApiError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::invalid(format!("invalid {field}: {raw}"))),
    }
}
