//! Error types for schema inference and report export.
//!
//! Export failures never escape the coordinator: every variant here is
//! eventually rendered into an `ExportResult` error string. The `Display`
//! text of each variant is therefore what the user sees in notifications.

use thiserror::Error;

/// Main error type for report operations.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The requested export kind is not one of the supported formats
    #[error("unsupported export kind: {kind}")]
    UnsupportedKind { kind: String },

    /// No encoder is registered for a supported kind
    #[error("no encoder registered for {kind} exports")]
    MissingEncoder { kind: String },

    /// An encoder reported a failure; the message is surfaced verbatim
    #[error("{message}")]
    Encoder { message: String },

    /// The export was cancelled before the encoder finished
    #[error("cancelled")]
    Cancelled,

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Report template rendering failed
    #[error("Template rendering failed: {context}")]
    Template {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with ReportError
pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    /// Creates an unsupported kind error
    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedKind { kind: kind.into() }
    }

    /// Creates a missing encoder error
    pub fn missing_encoder(kind: impl Into<String>) -> Self {
        Self::MissingEncoder { kind: kind.into() }
    }

    /// Creates an encoder failure carrying the encoder's own message.
    ///
    /// External encoders should use this so that the message reaches the
    /// caller unchanged, e.g. `ReportError::encoder("disk full")`.
    pub fn encoder(message: impl Into<String>) -> Self {
        Self::Encoder {
            message: message.into(),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a template rendering error
    pub fn template<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Template {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// True when this error represents a cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_message_is_verbatim() {
        let error = ReportError::encoder("disk full");
        assert_eq!(error.to_string(), "disk full");
    }

    #[test]
    fn test_cancelled_message() {
        assert_eq!(ReportError::Cancelled.to_string(), "cancelled");
        assert!(ReportError::Cancelled.is_cancelled());
        assert!(!ReportError::encoder("x").is_cancelled());
    }

    #[test]
    fn test_error_creation() {
        let error = ReportError::unsupported_kind("xml");
        assert!(error.to_string().starts_with("unsupported export kind"));
        assert!(error.to_string().contains("xml"));

        let error = ReportError::configuration("placeholder must not be empty");
        assert!(error.to_string().contains("placeholder must not be empty"));

        let error = ReportError::io(
            "Failed to write report.csv",
            std::io::Error::other("denied"),
        );
        assert!(error.to_string().contains("report.csv"));
    }
}
