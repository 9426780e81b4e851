//! Validation Support
//!
//! Create and update payloads implement [`Validatable`]. Handlers call
//! `validate()` before touching the database and turn the collected
//! [`ValidationErrors`] into a 400 response.
//!
//! ```rust,ignore
//! impl Validatable for SpeciesCreate {
//!     fn validate(&self) -> Result<(), ValidationErrors> {
//!         let mut errors = ValidationErrors::new();
//!         errors.require_text("name", self.name.as_deref(), None);
//!         errors.require_text("desc", self.desc.as_deref(), None);
//!         errors.result()
//!     }
//! }
//! ```

use serde::Serialize;
use std::fmt;

use crate::errors::ApiError;

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn required(field: &str) -> Self {
        Self::new(field, format!("Path `{field}` is required."))
    }

    #[must_use]
    pub fn too_long(field: &str, max: usize) -> Self {
        Self::new(
            field,
            format!("Path `{field}` is longer than the maximum allowed length ({max})."),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// A required value must be present.
    pub fn require<T>(&mut self, field: &str, value: Option<&T>) {
        if value.is_none() {
            self.add(ValidationError::required(field));
        }
    }

    /// A required string must be present and non-blank after trimming.
    pub fn require_text(&mut self, field: &str, value: Option<&str>, max: Option<usize>) {
        match value.map(str::trim) {
            None | Some("") => self.add(ValidationError::required(field)),
            Some(text) => self.max_length(field, text, max),
        }
    }

    /// For partial updates: a provided required string may not be blanked.
    pub fn update_text(&mut self, field: &str, value: Option<&str>, max: Option<usize>) {
        if value.is_some() {
            self.require_text(field, value, max);
        }
    }

    /// Check an optional string's trimmed length, counted in characters.
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: Option<usize>) {
        if let Some(text) = value {
            self.max_length(field, text.trim(), max);
        }
    }

    fn max_length(&mut self, field: &str, text: &str, max: Option<usize>) {
        if let Some(max) = max.filter(|max| text.chars().count() > *max) {
            self.add(ValidationError::too_long(field, max));
        }
    }

    /// Convert to Result
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation_failed(errors.errors.into_iter().map(|e| e.message).collect())
    }
}

/// Implemented by create and update payloads.
pub trait Validatable {
    /// # Errors
    ///
    /// Every rule the payload breaks.
    fn validate(&self) -> Result<(), ValidationErrors>;
}
