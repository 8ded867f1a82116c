//! The driver seam.
//!
//! A [`Driver`] is the external collaborator that actually talks to the
//! database: the facade validates, serializes and dispatches; the driver
//! executes. Implementations must be `Send + Sync` for use across async
//! boundaries, and every operation resolves to an `Outcome` delivered
//! exactly once.

use crate::error::Error;
use crate::result::{ResultSet, UpdateResult};
use crate::value::Value;
use asupersync::{Cx, Outcome};
use std::future::Future;

/// One driver-level database session.
///
/// The split between `query`/`update` and their `_with_params` variants is
/// part of the contract: an absent or empty parameter sequence must reach
/// the driver through the unparameterized entry points, never as an empty
/// bind array.
///
/// Drivers report failures through the returned `Outcome`; they never panic
/// on malformed input. Arity is pre-checked by the facade, so a
/// `_with_params` call always carries at least one value, but drivers still
/// map their own bind failures to `Error::Parameter` rather than crashing.
pub trait Driver: Send + Sync {
    /// Toggle implicit commit after each statement.
    fn set_auto_commit(
        &self,
        cx: &Cx,
        enabled: bool,
    ) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Run a non-query statement (DDL or generic).
    fn execute(&self, cx: &Cx, sql: &str) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Run a read statement with no parameters.
    fn query(&self, cx: &Cx, sql: &str) -> impl Future<Output = Outcome<ResultSet, Error>> + Send;

    /// Run a read statement with positional parameters.
    fn query_with_params(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<ResultSet, Error>> + Send;

    /// Run an INSERT/UPDATE/DELETE without parameters.
    fn update(
        &self,
        cx: &Cx,
        sql: &str,
    ) -> impl Future<Output = Outcome<UpdateResult, Error>> + Send;

    /// Run an INSERT/UPDATE/DELETE with positional parameters.
    fn update_with_params(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<UpdateResult, Error>> + Send;

    /// Commit pending work since the last commit/rollback.
    fn commit(&self, cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Revert pending work since the last commit/rollback.
    fn rollback(&self, cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Release the underlying session.
    fn close(&self, cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send;
}
