//! Error types for sqlgate operations.
//!
//! Every failure is delivered to the caller through the `Outcome` of the
//! operation that triggered it; nothing in this crate throws synchronously
//! or swallows an error.

use std::fmt;

/// The primary error type for all sqlgate operations.
#[derive(Debug)]
pub enum Error {
    /// Statement execution failed inside the driver (syntax, constraint,
    /// connectivity, transaction state).
    Driver(DriverError),
    /// Bind parameters did not match the statement's placeholders.
    Parameter(ParameterError),
    /// Operation attempted after the connection was closed.
    ClosedConnection,
    /// Operation attempted while another was in flight on the same connection.
    ConcurrentUse,
    /// Value extraction/conversion failure.
    Type(TypeError),
}

/// Error raised by the underlying driver while executing a statement.
#[derive(Debug)]
pub struct DriverError {
    pub kind: DriverErrorKind,
    /// The SQL text that triggered the error, when known.
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// Syntax error in SQL
    Syntax,
    /// Constraint violation (unique, foreign key, etc.)
    Constraint,
    /// Table or column not found
    NotFound,
    /// Permission denied
    Permission,
    /// Connection to the database was lost or refused
    Connectivity,
    /// Transaction state error (commit/rollback with nothing to terminate)
    Transaction,
    /// Other database error
    Database,
}

/// Parameter arity or bind failure.
#[derive(Debug)]
pub struct ParameterError {
    pub kind: ParameterErrorKind,
    /// Number of placeholders the statement declares.
    pub expected: usize,
    /// Number of parameters the caller supplied.
    pub supplied: usize,
    pub sql: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterErrorKind {
    /// Supplied parameter count does not match the placeholder count
    CountMismatch,
    /// The driver rejected a bind (index out of range, type mismatch)
    Bind,
}

/// Failed conversion between a `Value` and a Rust type.
#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

impl DriverError {
    /// Build a driver error with a kind and message, no SQL context.
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            sql: None,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the offending SQL text.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }
}

impl ParameterError {
    /// Arity mismatch between placeholders and supplied parameters.
    pub fn count_mismatch(expected: usize, supplied: usize, sql: impl Into<String>) -> Self {
        Self {
            kind: ParameterErrorKind::CountMismatch,
            expected,
            supplied,
            sql: Some(sql.into()),
        }
    }
}

impl Error {
    /// Is this an error that likely requires reconnecting?
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Error::Driver(DriverError {
                kind: DriverErrorKind::Connectivity,
                ..
            })
        )
    }

    /// Is this a constraint violation?
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            Error::Driver(DriverError {
                kind: DriverErrorKind::Constraint,
                ..
            })
        )
    }

    /// Get the SQL that caused this error, if available.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Driver(e) => e.sql.as_deref(),
            Error::Parameter(e) => e.sql.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Driver(e) => write!(f, "Driver error: {}", e),
            Error::Parameter(e) => write!(f, "Parameter error: {}", e),
            Error::ClosedConnection => write!(f, "Connection is closed"),
            Error::ConcurrentUse => {
                write!(f, "Connection is busy with another operation")
            }
            Error::Type(e) => write!(f, "Type error: {}", e),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParameterErrorKind::CountMismatch => write!(
                f,
                "statement expects {} parameter(s), {} supplied",
                self.expected, self.supplied
            ),
            ParameterErrorKind::Bind => write!(
                f,
                "failed to bind parameter {} of {}",
                self.supplied, self.expected
            ),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Driver(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<DriverError> for Error {
    fn from(err: DriverError) -> Self {
        Error::Driver(err)
    }
}

impl From<ParameterError> for Error {
    fn from(err: ParameterError) -> Self {
        Error::Parameter(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

/// Result type alias for sqlgate operations.
pub type Result<T> = std::result::Result<T, Error>;
