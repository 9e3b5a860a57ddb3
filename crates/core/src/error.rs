//! Error types shared across the workspace.
//!
//! [`StoreError`], [`CacheError`] and [`NotifyError`] are what the
//! collaborator traits return. Each wraps the underlying library error as a
//! boxed source so the core crate stays free of driver dependencies.

/// Boxed error from a collaborator's underlying library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Failure reported by a [`MetricStore`](crate::MetricStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached (pool exhausted, I/O, TLS).
    #[error("Metric store unavailable: {0}")]
    Connection(#[source] BoxError),

    /// The store was reached but the statement failed.
    #[error("Metric store query failed: {0}")]
    Query(#[source] BoxError),
}

/// Failure reported by an [`AlertCache`](crate::AlertCache).
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Alert cache unavailable: {0}")]
    Connection(#[source] BoxError),

    #[error("Alert cache command failed: {0}")]
    Command(#[source] BoxError),
}

/// Failure reported by a [`Notifier`](crate::Notifier).
///
/// Transient and permanent failures are not distinguished; the caller's
/// retry policy treats them the same.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid recipient {recipient}: {source}")]
    Recipient {
        recipient: String,
        #[source]
        source: BoxError,
    },

    #[error("Notification delivery failed: {0}")]
    Delivery(#[source] BoxError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(msg: &str) -> BoxError {
        Box::new(std::io::Error::other(msg.to_string()))
    }

    #[test]
    fn store_error_display_includes_source() {
        let err = StoreError::Query(boxed("relation does not exist"));
        assert_eq!(
            err.to_string(),
            "Metric store query failed: relation does not exist"
        );
    }

    #[test]
    fn cache_error_exposes_source() {
        let err = CacheError::Connection(boxed("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn notify_error_display_recipient() {
        let err = NotifyError::Recipient {
            recipient: "not-an-email".to_string(),
            source: boxed("missing domain"),
        };
        assert_eq!(
            err.to_string(),
            "Invalid recipient not-an-email: missing domain"
        );
    }
}
