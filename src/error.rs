//! Error types for entity-metrics.

use std::fmt;

/// Result type alias for entity-metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can occur while registering or recording business metrics.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// A declared label attribute is outside the supported set.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A metric declaration has a shape that cannot be interpreted.
    #[error("Malformed metric declaration on {context}: {reason}")]
    Declaration {
        /// The declaration site (entity or action) the annotation was read from.
        context: String,
        /// Why the annotation value could not be interpreted.
        reason: String,
    },

    /// The host framework rejected a hook registration.
    #[error("Failed to register hook for event '{event}': {reason}")]
    HookRegistration {
        /// Event name the hook was registered for.
        event: String,
        /// The host framework's failure message.
        reason: String,
    },

    /// The metrics backend failed to create an instrument.
    #[error("Failed to create instrument '{name}': {reason}")]
    Instrument {
        /// Metric name of the instrument.
        name: String,
        /// The backend's failure message.
        reason: String,
    },

    /// An attribute name reached label resolution without prior validation.
    #[error("Unsupported attribute: {0}")]
    UnsupportedAttribute(String),

    /// The transactional data-access layer reported a failure.
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// The metrics backend rejected a recording.
    #[error("Metrics backend error: {0}")]
    Backend(String),

    /// Generic error for other cases.
    #[error("Metrics error: {0}")]
    Other(String),
}

/// Validation error for label-attribute declarations.
///
/// Carries the offending attribute name, the declaration site it was read
/// from, and the full supported set, so the log line names everything an
/// operator needs to fix the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The attribute name that is not supported.
    pub attribute: String,
    /// The declaration site the attribute was found on.
    pub context: String,
    /// The set of attribute names that are supported.
    pub supported: &'static [&'static str],
}

impl ValidationError {
    /// Create a validation error for an unsupported attribute name.
    pub fn unsupported(
        attribute: impl Into<String>,
        context: impl Into<String>,
        supported: &'static [&'static str],
    ) -> Self {
        Self {
            attribute: attribute.into(),
            context: context.into(),
            supported,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid attribute '{}' in {}. Valid attributes are: {}",
            self.attribute,
            self.context,
            self.supported.join(", ")
        )
    }
}

impl std::error::Error for ValidationError {}
