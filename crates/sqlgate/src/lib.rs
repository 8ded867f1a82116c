//! Asynchronous SQL connection facade.
//!
//! One [`SqlConnection`] wraps one driver-level database session and adds
//! the connection-level protocol on top: a forward-only lifecycle state
//! machine, serialization of in-flight statements, auto-commit handling,
//! and positional-parameter validation. Statement execution itself lives
//! behind the [`Driver`] seam.
//!
//! Every operation resolves to an [`Outcome`] delivered exactly once:
//! either a success value or a descriptive failure, never a synchronous
//! throw.

pub mod connection;

pub use connection::SqlConnection;

// Re-export the core surface so embedders need only one dependency.
pub use sqlgate_core::{
    ColumnInfo, Cx, Driver, DriverError, DriverErrorKind, Error, FromValue, Outcome,
    ParameterError, ParameterErrorKind, ResultSet, Row, Statement, TypeError, UpdateResult, Value,
};
