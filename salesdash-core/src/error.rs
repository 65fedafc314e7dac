//! Error types for Salesdash operations

use thiserror::Error;

/// Result type alias for Salesdash operations
pub type SalesdashResult<T> = Result<T, SalesdashError>;

/// Closed set of error kinds surfaced by the engine and its service layer
///
/// Soft degradations (unknown breakdown column, unparsable individual cell
/// values) are documented coercion behavior, not errors, and never appear
/// here.
#[derive(Error, Debug)]
pub enum SalesdashError {
    /// Column addition named a column that already exists in the schema
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    /// An aggregation or row materialization failed; bundles are
    /// all-or-nothing, so nothing was partially applied
    #[error("Computation error: {0}")]
    Computation(String),

    /// Input text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credentials or token rejected; the message is the client-facing
    /// challenge text
    #[error("{0}")]
    Unauthorized(String),

    /// CSV ingestion failure
    #[error("CSV error: {0}")]
    Csv(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SalesdashError {
    /// Create a duplicate column error
    pub fn duplicate_column<S: Into<String>>(name: S) -> Self {
        Self::DuplicateColumn(name.into())
    }

    /// Create a computation error
    pub fn computation<S: Into<String>>(message: S) -> Self {
        Self::Computation(message.into())
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a CSV error
    pub fn csv<S: Into<String>>(message: S) -> Self {
        Self::Csv(message.into())
    }

    /// Error category, used by the transport layer to pick a status code
    pub fn category(&self) -> &'static str {
        match self {
            SalesdashError::DuplicateColumn(_) => "duplicate_column",
            SalesdashError::Computation(_) => "computation",
            SalesdashError::Parse(_) => "parse",
            SalesdashError::Validation(_) => "validation",
            SalesdashError::Unauthorized(_) => "unauthorized",
            SalesdashError::Csv(_) => "csv",
            SalesdashError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_column_message_names_the_column() {
        let err = SalesdashError::duplicate_column("Notes");
        assert_eq!(err.to_string(), "Column 'Notes' already exists");
        assert_eq!(err.category(), "duplicate_column");
    }

    #[test]
    fn test_categories_are_stable() {
        assert_eq!(SalesdashError::computation("x").category(), "computation");
        assert_eq!(SalesdashError::parse("x").category(), "parse");
        assert_eq!(SalesdashError::validation("x").category(), "validation");
        assert_eq!(SalesdashError::unauthorized("x").category(), "unauthorized");
        assert_eq!(SalesdashError::csv("x").category(), "csv");
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SalesdashError = io.into();
        assert_eq!(err.category(), "io");
    }
}
