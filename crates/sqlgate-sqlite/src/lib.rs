//! SQLite driver for the sqlgate connection facade.
//!
// FFI bindings require unsafe code - this is expected for database drivers
#![allow(unsafe_code)]
//!
//! This crate provides an embedded SQLite session using FFI bindings to
//! libsqlite3. It implements the `Driver` trait from sqlgate-core, so a
//! [`SqliteDriver`] can sit behind a `sqlgate::SqlConnection`.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlgate::SqlConnection;
//! use sqlgate_sqlite::SqliteDriver;
//! use sqlgate_core::{Cx, Outcome, Value};
//!
//! let conn = SqlConnection::new(SqliteDriver::open_memory().unwrap());
//! let cx = Cx::for_testing();
//! match conn.update_with_params(&cx, "INSERT INTO users (name) VALUES (?)",
//!     &[Value::Text("Alice".into())]).await
//! {
//!     Outcome::Ok(res) => println!("inserted {} row(s)", res.rows_affected),
//!     Outcome::Err(e) => eprintln!("error: {}", e),
//!     _ => {}
//! }
//! ```
//!
//! # Type mapping
//!
//! | sqlgate `Value` | SQLite storage |
//! |-----------------|----------------|
//! | `Bool`          | INTEGER (0/1)  |
//! | `Int`           | INTEGER        |
//! | `Float`         | REAL           |
//! | `Text`          | TEXT           |
//! | `Bytes`         | BLOB           |
//! | `Timestamp`     | TEXT (ISO-8601)|
//! | `Null`          | NULL           |
//!
//! # Thread safety
//!
//! `SqliteDriver` is `Send` and `Sync`, using internal mutex
//! synchronization to protect the underlying SQLite handle.

pub mod driver;
pub mod ffi;
pub mod types;

pub use driver::{OpenFlags, SqliteConfig, SqliteDriver};

/// The SQLite library version.
pub fn sqlite_version() -> &'static str {
    ffi::version()
}

/// The SQLite library version number.
pub fn sqlite_version_number() -> i32 {
    ffi::version_number()
}
