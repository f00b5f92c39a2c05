//! Field-keyed validation errors.
//!
//! Metadata schema validation reports every failing field at once so the
//! caller can render a precise "please configure X" message per field,
//! rather than discovering problems one request at a time.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// An aggregated, field-keyed validation failure.
///
/// Keys are field names (`"port"`, `"endpoint_address"`, ...); the
/// reserved key `"non_field_errors"` carries failures that span fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    errors: BTreeMap<String, Vec<String>>,
}

/// Key used for errors that are not attributable to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

impl ValidationError {
    /// Create an empty error to accumulate into.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error for a single field.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add(field, message);
        err
    }

    /// Create a cross-field error under [`NON_FIELD_ERRORS`].
    #[must_use]
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::single(NON_FIELD_ERRORS, message)
    }

    /// Create a "Not configured" error for each named missing field.
    #[must_use]
    pub fn missing_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut err = Self::new();
        for field in fields {
            err.add(field, "Not configured");
        }
        err
    }

    /// Record a failure against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Merge another error's entries into this one.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// True when no failures have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when the given field has at least one recorded failure.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Consume the accumulator: `Err(self)` if anything was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Iterate over `(field, messages)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl From<crate::EndpointError> for ValidationError {
    fn from(err: crate::EndpointError) -> Self {
        Self::single("endpoint_address", err.to_string())
    }
}
