//! Core types and the driver trait for the sqlgate connection facade.
//!
//! This crate provides the foundational abstractions:
//!
//! - `Value` tagged union for positional parameters and result cells
//! - `Row`/`ResultSet` for query results, `UpdateResult` for DML
//! - `Statement` with positional-placeholder validation
//! - `Driver` trait, the seam behind which an actual database session lives
//! - `Outcome` re-export from asupersync for exactly-once completion
//! - `Cx` context for structured concurrency

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub mod driver;
pub mod error;
pub mod result;
pub mod row;
pub mod statement;
pub mod value;

pub use driver::Driver;
pub use error::{
    DriverError, DriverErrorKind, Error, ParameterError, ParameterErrorKind, Result, TypeError,
};
pub use result::{ResultSet, UpdateResult};
pub use row::{ColumnInfo, FromValue, Row};
pub use statement::{Statement, count_placeholders};
pub use value::Value;
