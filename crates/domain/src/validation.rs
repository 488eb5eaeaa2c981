//! Field-level input validation shared by the services.

use common::{Bilingual, Money};
use serde::Serialize;

use crate::error::DomainError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Most units of one product a single order line may carry.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field errors found in one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn finish(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }

    pub fn require_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
    }

    /// Both languages must be present.
    pub fn require_bilingual(&mut self, field: &str, value: &Bilingual) {
        if value.en.trim().is_empty() {
            self.add(format!("{field}.en"), "is required");
        }
        if value.ar.trim().is_empty() {
            self.add(format!("{field}.ar"), "is required");
        }
    }

    /// A price must be above zero and fit the stored precision.
    pub fn require_price(&mut self, field: &str, value: Money) {
        if !value.is_positive() {
            self.add(field, "must be greater than 0");
        } else if value.exceeds_limit() {
            self.add(field, format!("must not exceed {}", Money::upper_limit()));
        }
    }

    pub fn require_quantity(&mut self, field: &str, value: u32) {
        if value == 0 {
            self.add(field, "must be greater than 0");
        } else if value > MAX_LINE_QUANTITY {
            self.add(field, format!("must not exceed {MAX_LINE_QUANTITY}"));
        }
    }

    pub fn require_email(&mut self, field: &str, value: &str) {
        if !is_valid_email(value) {
            self.add(field, "must be a valid email address");
        }
    }

    pub fn require_slug(&mut self, field: &str, value: &str) {
        if !is_valid_slug(value) {
            self.add(
                field,
                "may only contain lowercase letters, numbers and hyphens",
            );
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{} {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Matches `^[a-z0-9-]+$`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// A pragmatic shape check: one `@`, non-empty local part, a dot in the
/// domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !domain.ends_with('.')
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
