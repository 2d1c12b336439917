//! Request validation helpers.
//!
//! Rules run to completion and collect every failure, so one 400 response lists
//! all problems with the submitted body.

use chrono::{DateTime, Utc};

use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(message.into());
        }
        self
    }

    /// Non-blank and at most `max` characters.
    pub fn text(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if len == 0 {
            self.errors.push(format!("{field} is required"));
        } else if len > max {
            self.errors
                .push(format!("{field} must be at most {max} characters"));
        }
        self
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            self.text(field, value, max);
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.errors
                .push(format!("{field} must be at most {max} characters"));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(
            is_valid_email(value),
            format!("{field} must be a valid email"),
        )
    }

    pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(
            value.chars().count() >= crate::domain::types::MIN_PASSWORD_LEN,
            format!(
                "{field} must be at least {} characters",
                crate::domain::types::MIN_PASSWORD_LEN
            ),
        )
    }

    pub fn date_order(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        message: &str,
    ) -> &mut Self {
        self.check(end >= start, message)
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

/// Lower-cased, trimmed email used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain.tld` with a conservative character set.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.len() < 3 || email.len() > 255 {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'));
    let domain_ok = domain
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-'));
    local_ok && domain_ok
}
