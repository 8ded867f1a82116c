//! The connection facade.
//!
//! [`SqlConnection`] presents a uniform, asynchronous API over one logical
//! database connection and forwards statement execution to a [`Driver`].
//! The facade owns what the driver does not: the lifecycle state machine,
//! serialization of in-flight statements, positional-parameter validation,
//! and the auto-commit flag.
//!
//! # Sequencing
//!
//! All operations take `&self` and resolve to an `Outcome`; dependent
//! operations are sequenced by awaiting each outcome before issuing the
//! next. No implicit queueing is offered; issuing a second operation while
//! one is in flight resolves to [`Error::ConcurrentUse`].
//!
//! ```rust,ignore
//! conn.execute(&cx, "CREATE TABLE t (id INT)").await;
//! conn.update(&cx, "INSERT INTO t VALUES (1)").await;
//! let rows = conn.query(&cx, "SELECT * FROM t").await;
//! conn.close(&cx).await;
//! ```

use sqlgate_core::{
    Cx, Driver, Error, Outcome, ResultSet, Row, Statement, UpdateResult, Value,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Lifecycle of one connection. Transitions move only forward:
/// `Idle ↔ Busy` while open, then `Closed` forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Busy,
    Closed,
}

/// Resets `Busy` back to `Idle` when the in-flight operation delivers its
/// outcome, on success and failure alike. A sticky `Closed` state is left
/// untouched.
struct OpGuard<'a> {
    state: &'a Mutex<State>,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == State::Busy {
            *state = State::Idle;
        }
    }
}

/// A facade over one logical database connection.
///
/// Owns the driver session exclusively. Completion may run on a different
/// thread than issuance, so the shared state is guarded by a mutex rather
/// than assumed single-threaded.
pub struct SqlConnection<D> {
    driver: D,
    state: Mutex<State>,
    auto_commit: AtomicBool,
}

impl<D: Driver> SqlConnection<D> {
    /// Wrap a driver session. Connections start open, idle, and in
    /// auto-commit mode.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            state: Mutex::new(State::Idle),
            auto_commit: AtomicBool::new(true),
        }
    }

    /// Whether `close` has completed (or begun) on this connection.
    pub fn is_closed(&self) -> bool {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) == State::Closed
    }

    /// The connection-scoped auto-commit flag as last acknowledged by the
    /// driver.
    pub fn auto_commit(&self) -> bool {
        self.auto_commit.load(Ordering::Acquire)
    }

    /// Consume the facade, returning the driver session.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Move `Idle → Busy`, rejecting operations on busy or closed
    /// connections. The returned guard restores `Idle` when dropped.
    fn begin_op(&self, op: &'static str) -> Result<OpGuard<'_>, Error> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match *state {
            State::Closed => {
                warn!(op, "operation on closed connection");
                Err(Error::ClosedConnection)
            }
            State::Busy => {
                warn!(op, "operation while another is in flight");
                Err(Error::ConcurrentUse)
            }
            State::Idle => {
                *state = State::Busy;
                debug!(op, "dispatching");
                Ok(OpGuard { state: &self.state })
            }
        }
    }

    /// Toggle implicit commit after each statement.
    ///
    /// Must not be called while a statement is in flight on the same
    /// connection; such calls resolve to [`Error::ConcurrentUse`].
    pub async fn set_auto_commit(&self, cx: &Cx, enabled: bool) -> Outcome<(), Error> {
        let guard = match self.begin_op("set_auto_commit") {
            Ok(g) => g,
            Err(e) => return Outcome::Err(e),
        };
        let out = self.driver.set_auto_commit(cx, enabled).await;
        if matches!(out, Outcome::Ok(())) {
            self.auto_commit.store(enabled, Ordering::Release);
        }
        drop(guard);
        out
    }

    /// Run a non-query statement (DDL or generic).
    pub async fn execute(&self, cx: &Cx, sql: &str) -> Outcome<(), Error> {
        let guard = match self.begin_op("execute") {
            Ok(g) => g,
            Err(e) => return Outcome::Err(e),
        };
        if let Err(e) = Statement::new(sql).validate() {
            return Outcome::Err(e);
        }
        let out = self.driver.execute(cx, sql).await;
        drop(guard);
        out
    }

    /// Run a read statement with no parameters.
    pub async fn query(&self, cx: &Cx, sql: &str) -> Outcome<ResultSet, Error> {
        let guard = match self.begin_op("query") {
            Ok(g) => g,
            Err(e) => return Outcome::Err(e),
        };
        if let Err(e) = Statement::new(sql).validate() {
            return Outcome::Err(e);
        }
        let out = self.driver.query(cx, sql).await;
        drop(guard);
        out
    }

    /// Run a read statement with positional parameters.
    ///
    /// The parameter count is checked against the statement's placeholders
    /// before dispatch; a mismatch resolves to [`Error::Parameter`] without
    /// reaching the driver. An empty `params` behaves as unparameterized.
    pub async fn query_with_params(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> Outcome<ResultSet, Error> {
        let guard = match self.begin_op("query_with_params") {
            Ok(g) => g,
            Err(e) => return Outcome::Err(e),
        };
        let stmt = Statement::with_params(sql, params.to_vec());
        if let Err(e) = stmt.validate() {
            return Outcome::Err(e);
        }
        let out = if stmt.has_params() {
            self.driver.query_with_params(cx, sql, params).await
        } else {
            self.driver.query(cx, sql).await
        };
        drop(guard);
        out
    }

    /// Run a read statement and return its first row, if any.
    pub async fn query_one(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> Outcome<Option<Row>, Error> {
        match self.query_with_params(cx, sql, params).await {
            Outcome::Ok(rs) => Outcome::Ok(rs.into_first()),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(c) => Outcome::Cancelled(c),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Run an INSERT/UPDATE/DELETE without parameters.
    pub async fn update(&self, cx: &Cx, sql: &str) -> Outcome<UpdateResult, Error> {
        let guard = match self.begin_op("update") {
            Ok(g) => g,
            Err(e) => return Outcome::Err(e),
        };
        if let Err(e) = Statement::new(sql).validate() {
            return Outcome::Err(e);
        }
        let out = self.driver.update(cx, sql).await;
        drop(guard);
        out
    }

    /// Run an INSERT/UPDATE/DELETE with positional parameters.
    ///
    /// Arity rules match [`query_with_params`](Self::query_with_params).
    pub async fn update_with_params(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> Outcome<UpdateResult, Error> {
        let guard = match self.begin_op("update_with_params") {
            Ok(g) => g,
            Err(e) => return Outcome::Err(e),
        };
        let stmt = Statement::with_params(sql, params.to_vec());
        if let Err(e) = stmt.validate() {
            return Outcome::Err(e);
        }
        let out = if stmt.has_params() {
            self.driver.update_with_params(cx, sql, params).await
        } else {
            self.driver.update(cx, sql).await
        };
        drop(guard);
        out
    }

    /// Commit pending work since the last commit/rollback.
    pub async fn commit(&self, cx: &Cx) -> Outcome<(), Error> {
        let guard = match self.begin_op("commit") {
            Ok(g) => g,
            Err(e) => return Outcome::Err(e),
        };
        let out = self.driver.commit(cx).await;
        drop(guard);
        out
    }

    /// Revert pending work since the last commit/rollback.
    pub async fn rollback(&self, cx: &Cx) -> Outcome<(), Error> {
        let guard = match self.begin_op("rollback") {
            Ok(g) => g,
            Err(e) => return Outcome::Err(e),
        };
        let out = self.driver.rollback(cx).await;
        drop(guard);
        out
    }

    /// Release the connection.
    ///
    /// The state moves to `Closed` before the driver is awaited, so no new
    /// operation can start during teardown. Every subsequent operation,
    /// including a second `close`, resolves to [`Error::ClosedConnection`].
    /// A close issued while an operation is in flight is refused with
    /// [`Error::ConcurrentUse`]; in-flight work is never failed from
    /// underneath.
    pub async fn close(&self, cx: &Cx) -> Outcome<(), Error> {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            match *state {
                State::Closed => {
                    warn!("close on already-closed connection");
                    return Outcome::Err(Error::ClosedConnection);
                }
                State::Busy => {
                    warn!("close while an operation is in flight");
                    return Outcome::Err(Error::ConcurrentUse);
                }
                State::Idle => {
                    debug!("closing connection");
                    *state = State::Closed;
                }
            }
        }
        self.driver.close(cx).await
    }
}
