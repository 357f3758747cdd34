//! Repository trait and error types.
//!
//! Provides the core [`PageRepository`] trait for abstracting page lookups and
//! persistence, along with [`StoreError`] for unified error handling across
//! backends.
//!
//! Singular lookups return `Ok(None)` for zero matches. Errors are reserved
//! for infrastructure failures and are passed through to callers unchanged.

use crate::criteria::Criteria;
use crate::page::Page;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// A page referenced by id does not exist.
    NotFound,
    /// Unknown field name or value of the wrong type in criteria.
    InvalidField,
    /// Constraint violation (unique, foreign key, not null).
    Constraint,
    /// Backend is unreachable or the pool timed out.
    Unavailable,
    /// Other/unknown error category.
    Other,
}

/// Repository error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Human-readable context (e.g., offending field name).
    pub message: Option<String>,
    /// Backend identifier (e.g., "Sqlite", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            message: None,
            backend: None,
            source: None,
        }
    }

    /// Attach a context message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create an invalid field error.
    #[must_use]
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::InvalidField).with_message(message)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message: source"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::InvalidField => "Invalid field",
            StoreErrorKind::Constraint => "Constraint violation",
            StoreErrorKind::Unavailable => "Unavailable",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Storage abstraction for page records.
///
/// All methods are blocking. Result sets are ordered by `position`
/// ascending, ties broken by id.
pub trait PageRepository: Send + Sync {
    /// Return every page matching all equality filters in `criteria`.
    ///
    /// Empty criteria match every page.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn find_by(&self, criteria: &Criteria) -> Result<Vec<Page>, StoreError>;

    /// Return the first page matching `criteria`, `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn find_one_by(&self, criteria: &Criteria) -> Result<Option<Page>, StoreError> {
        Ok(self.find_by(criteria)?.into_iter().next())
    }

    /// Return pages whose route name is set and differs from `route_name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn find_route_name_not(&self, route_name: &str) -> Result<Vec<Page>, StoreError>;

    /// Load every page ordered by position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn load_all(&self) -> Result<Vec<Page>, StoreError>;

    /// Insert or update `pages` in a single transaction.
    ///
    /// Pages without an id are inserted and receive their new id. Pages with
    /// an id are updated in place. Nothing is written if any page fails.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] with kind `NotFound` if an updated page no
    /// longer exists, or the backend error if the write fails.
    fn persist(&self, pages: &mut [Page]) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_new() {
        let err = StoreError::new(StoreErrorKind::NotFound);

        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert!(err.message.is_none());
        assert!(err.backend.is_none());
    }

    #[test]
    fn test_store_error_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = StoreError::new(StoreErrorKind::Unavailable).with_source(io_err);

        assert!(err.downcast_source::<std::io::Error>().is_some());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_store_error_display_simple() {
        let err = StoreError::new(StoreErrorKind::Constraint);

        assert_eq!(err.to_string(), "Constraint violation");
    }

    #[test]
    fn test_store_error_display_full() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = StoreError::new(StoreErrorKind::Unavailable)
            .with_backend("Sqlite")
            .with_message("connect")
            .with_source(io_err);

        assert_eq!(err.to_string(), "[Sqlite] Unavailable: connect: pipe closed");
    }

    #[test]
    fn test_invalid_field() {
        let err = StoreError::invalid_field("unknown field: colour");

        assert_eq!(err.kind, StoreErrorKind::InvalidField);
        assert_eq!(err.to_string(), "Invalid field: unknown field: colour");
    }

    #[test]
    fn test_store_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
    }
}
