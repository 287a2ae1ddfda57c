//! Record validation.
//!
//! Validation collects every violation instead of stopping at the first one,
//! so clients get the full field → messages map in a single response.

use std::collections::BTreeMap;
use std::fmt;

use bilemo_core::Email;
use serde::Serialize;

/// Maximum length of a `VARCHAR(255)` column.
pub const MAX_STRING_LENGTH: usize = 255;

pub const NOT_BLANK: &str = "This value should not be blank.";
pub const POSITIVE: &str = "This value should be positive.";
pub const INVALID_EMAIL: &str = "This value is not a valid email address.";

/// Violations keyed by field name.
///
/// Empty means the record is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one violation for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field, if any.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Fold `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one violation was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    // Rule helpers. Each records its message and returns `&mut Self` so
    // several rules read as one chain per field.

    pub fn not_blank(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.add(field, NOT_BLANK);
        }
        self
    }

    pub fn max_length(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.add(
                field,
                format!("This value is too long. It should have {max} characters or less."),
            );
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: i64) -> &mut Self {
        if value <= 0 {
            self.add(field, POSITIVE);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if Email::parse(value).is_err() {
            self.add(field, INVALID_EMAIL);
        }
        self
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Something that can check its own invariants.
pub trait Validate {
    /// Collect every violation. An empty result means valid.
    fn validate(&self) -> ValidationErrors;
}
