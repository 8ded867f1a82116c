//! SQLite driver implementation.
//!
//! Wraps a raw sqlite3 handle behind a mutex and implements the `Driver`
//! trait from sqlgate-core. All database work runs synchronously under the
//! lock; the async surface resolves through ready futures, matching the
//! embedded nature of the engine.
//!
//! # Transactions
//!
//! With auto-commit disabled, a transaction is opened lazily (`BEGIN`)
//! before the first statement and ended by `commit`/`rollback`; the next
//! statement opens a fresh one. Re-enabling auto-commit commits pending
//! work first.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::borrow_as_ptr)]

use crate::ffi;
use crate::types;
use sqlgate_core::{
    ColumnInfo, Cx, Driver, Error, Outcome, ResultSet, Row, UpdateResult, Value,
    error::{DriverError, DriverErrorKind, ParameterError, ParameterErrorKind},
};
use std::ffi::{CStr, CString, c_int};
use std::future::Future;
use std::ptr;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Configuration for opening SQLite sessions.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file, or ":memory:" for an in-memory database.
    pub path: String,
    /// Open flags (read-only, read-write, create, etc.)
    pub flags: OpenFlags,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

/// Flags controlling how the database is opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFlags {
    /// Open for reading only.
    pub read_only: bool,
    /// Open for reading and writing.
    pub read_write: bool,
    /// Create the database if it doesn't exist.
    pub create: bool,
    /// Enable URI filename interpretation.
    pub uri: bool,
}

impl OpenFlags {
    /// Create flags for read-only access.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Default::default()
        }
    }

    /// Create flags for read-write access with creation if needed.
    pub fn create_read_write() -> Self {
        Self {
            read_write: true,
            create: true,
            ..Default::default()
        }
    }

    fn to_sqlite_flags(self) -> c_int {
        let mut flags = 0;

        if self.read_only {
            flags |= ffi::SQLITE_OPEN_READONLY;
        }
        if self.read_write {
            flags |= ffi::SQLITE_OPEN_READWRITE;
        }
        if self.create {
            flags |= ffi::SQLITE_OPEN_CREATE;
        }
        if self.uri {
            flags |= ffi::SQLITE_OPEN_URI;
        }

        // Default to read-write if no mode specified
        if flags & (ffi::SQLITE_OPEN_READONLY | ffi::SQLITE_OPEN_READWRITE) == 0 {
            flags |= ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE;
        }

        flags
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
            flags: OpenFlags::create_read_write(),
            busy_timeout_ms: 5000,
        }
    }
}

impl SqliteConfig {
    /// Create a new config for a file-based database.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Create a new config for an in-memory database.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Set open flags.
    pub fn flags(mut self, flags: OpenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set busy timeout.
    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }
}

/// Inner state, protected by a mutex for thread safety.
struct SqliteInner {
    db: *mut ffi::sqlite3,
    auto_commit: bool,
    in_transaction: bool,
}

// SAFETY: the handle is only touched under the mutex, which serializes all
// access across threads.
unsafe impl Send for SqliteInner {}

/// One SQLite session implementing the sqlgate `Driver` trait.
pub struct SqliteDriver {
    inner: Mutex<SqliteInner>,
    path: String,
}

// SAFETY: all access goes through the mutex.
unsafe impl Send for SqliteDriver {}
unsafe impl Sync for SqliteDriver {}

impl SqliteDriver {
    /// Open a new session with the given configuration.
    pub fn open(config: &SqliteConfig) -> Result<Self, Error> {
        let c_path = CString::new(config.path.as_str()).map_err(|_| {
            Error::Driver(DriverError::new(
                DriverErrorKind::Connectivity,
                "invalid path: contains null byte",
            ))
        })?;

        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        let flags = config.flags.to_sqlite_flags();

        // SAFETY: we pass valid pointers and check the return value
        let rc = unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, ptr::null()) };

        if rc != ffi::SQLITE_OK {
            let msg = if db.is_null() {
                ffi::error_string(rc).to_string()
            } else {
                // SAFETY: db is valid, errmsg returns a valid C string
                unsafe {
                    let err_ptr = ffi::sqlite3_errmsg(db);
                    let msg = CStr::from_ptr(err_ptr).to_string_lossy().into_owned();
                    ffi::sqlite3_close(db);
                    msg
                }
            };

            return Err(Error::Driver(DriverError::new(
                DriverErrorKind::Connectivity,
                format!("failed to open database: {}", msg),
            )));
        }

        if config.busy_timeout_ms > 0 {
            // SAFETY: db is valid
            unsafe {
                ffi::sqlite3_busy_timeout(db, config.busy_timeout_ms as c_int);
            }
        }

        Ok(Self {
            inner: Mutex::new(SqliteInner {
                db,
                auto_commit: true,
                in_transaction: false,
            }),
            path: config.path.clone(),
        })
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, Error> {
        Self::open(&SqliteConfig::memory())
    }

    /// Open a file-based database.
    pub fn open_file(path: impl Into<String>) -> Result<Self, Error> {
        Self::open(&SqliteConfig::file(path))
    }

    /// Get the database path.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SqliteInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run SQL with no bind parameters through sqlite3_exec.
    fn exec_raw(inner: &SqliteInner, sql: &str) -> Result<(), Error> {
        let c_sql = CString::new(sql).map_err(|_| null_byte_error(sql))?;
        let mut errmsg: *mut std::ffi::c_char = ptr::null_mut();

        // SAFETY: all pointers are valid
        let rc = unsafe {
            ffi::sqlite3_exec(inner.db, c_sql.as_ptr(), None, ptr::null_mut(), &mut errmsg)
        };

        if rc != ffi::SQLITE_OK {
            let msg = if errmsg.is_null() {
                ffi::error_string(rc).to_string()
            } else {
                // SAFETY: errmsg is valid and owned by sqlite until freed
                let msg = unsafe { CStr::from_ptr(errmsg).to_string_lossy().into_owned() };
                unsafe { ffi::sqlite3_free(errmsg.cast()) };
                msg
            };

            return Err(Error::Driver(
                DriverError::new(error_code_to_kind(rc), msg).with_sql(sql),
            ));
        }

        Ok(())
    }

    /// Open the lazy transaction if auto-commit is off and none is active.
    fn begin_if_needed(inner: &mut SqliteInner) -> Result<(), Error> {
        if !inner.auto_commit && !inner.in_transaction {
            Self::exec_raw(inner, "BEGIN")?;
            inner.in_transaction = true;
            debug!("implicit transaction opened");
        }
        Ok(())
    }

    fn ensure_open(inner: &SqliteInner) -> Result<(), Error> {
        if inner.db.is_null() {
            Err(Error::ClosedConnection)
        } else {
            Ok(())
        }
    }

    fn execute_sync(&self, sql: &str) -> Result<(), Error> {
        let mut inner = self.lock();
        Self::ensure_open(&inner)?;
        Self::begin_if_needed(&mut inner)?;
        Self::exec_raw(&inner, sql)
    }

    fn query_sync(&self, sql: &str, params: &[Value]) -> Result<ResultSet, Error> {
        let mut inner = self.lock();
        Self::ensure_open(&inner)?;
        Self::begin_if_needed(&mut inner)?;

        let stmt = prepare_stmt(inner.db, sql)?;
        bind_params(inner.db, stmt, sql, params)?;

        // SAFETY: stmt is valid
        let col_count = unsafe { ffi::sqlite3_column_count(stmt) };
        let mut col_names = Vec::with_capacity(col_count as usize);
        for i in 0..col_count {
            // SAFETY: stmt is valid, i is in range
            let name =
                unsafe { types::column_name(stmt, i) }.unwrap_or_else(|| format!("col{}", i));
            col_names.push(name);
        }
        let columns = Arc::new(ColumnInfo::new(col_names));

        let mut rows = Vec::new();
        loop {
            // SAFETY: stmt is valid
            let rc = unsafe { ffi::sqlite3_step(stmt) };
            match rc {
                ffi::SQLITE_ROW => {
                    let mut values = Vec::with_capacity(col_count as usize);
                    for i in 0..col_count {
                        // SAFETY: stmt is valid, we just got SQLITE_ROW
                        values.push(unsafe { types::read_column(stmt, i) });
                    }
                    rows.push(Row::with_columns(Arc::clone(&columns), values));
                }
                ffi::SQLITE_DONE => break,
                _ => {
                    // SAFETY: stmt is valid
                    unsafe { ffi::sqlite3_finalize(stmt) };
                    return Err(step_error(inner.db, sql));
                }
            }
        }

        // SAFETY: stmt is valid
        unsafe { ffi::sqlite3_finalize(stmt) };

        Ok(ResultSet::new(columns, rows))
    }

    fn update_sync(&self, sql: &str, params: &[Value]) -> Result<UpdateResult, Error> {
        let mut inner = self.lock();
        Self::ensure_open(&inner)?;
        Self::begin_if_needed(&mut inner)?;

        let stmt = prepare_stmt(inner.db, sql)?;
        bind_params(inner.db, stmt, sql, params)?;

        // SAFETY: stmt is valid
        let rc = unsafe { ffi::sqlite3_step(stmt) };
        // SAFETY: stmt is valid
        unsafe { ffi::sqlite3_finalize(stmt) };

        match rc {
            ffi::SQLITE_DONE | ffi::SQLITE_ROW => {
                // SAFETY: db is valid
                let changes = unsafe { ffi::sqlite3_changes(inner.db) };
                let mut result = UpdateResult::new(changes as u64);
                if is_insert_sql(sql) {
                    // SAFETY: db is valid
                    let rowid = unsafe { ffi::sqlite3_last_insert_rowid(inner.db) };
                    result = result.with_keys(vec![Value::Int(rowid)]);
                }
                Ok(result)
            }
            _ => Err(step_error(inner.db, sql)),
        }
    }

    fn set_auto_commit_sync(&self, enabled: bool) -> Result<(), Error> {
        let mut inner = self.lock();
        Self::ensure_open(&inner)?;

        if enabled && inner.in_transaction {
            // Re-enabling auto-commit commits the pending work first
            Self::exec_raw(&inner, "COMMIT")?;
            inner.in_transaction = false;
            debug!("pending transaction committed on auto-commit re-enable");
        }
        inner.auto_commit = enabled;
        Ok(())
    }

    fn commit_sync(&self) -> Result<(), Error> {
        let mut inner = self.lock();
        Self::ensure_open(&inner)?;

        if inner.auto_commit {
            return Err(Error::Driver(DriverError::new(
                DriverErrorKind::Transaction,
                "no transaction is open (auto-commit is enabled)",
            )));
        }
        if inner.in_transaction {
            Self::exec_raw(&inner, "COMMIT")?;
            inner.in_transaction = false;
            debug!("transaction committed");
        }
        // Nothing pending: the lazy BEGIN never ran, so this is a no-op
        Ok(())
    }

    fn rollback_sync(&self) -> Result<(), Error> {
        let mut inner = self.lock();
        Self::ensure_open(&inner)?;

        if inner.auto_commit {
            return Err(Error::Driver(DriverError::new(
                DriverErrorKind::Transaction,
                "no transaction is open (auto-commit is enabled)",
            )));
        }
        if inner.in_transaction {
            Self::exec_raw(&inner, "ROLLBACK")?;
            inner.in_transaction = false;
            debug!("transaction rolled back");
        }
        Ok(())
    }

    fn close_sync(&self) -> Result<(), Error> {
        let mut inner = self.lock();
        if inner.db.is_null() {
            return Err(Error::ClosedConnection);
        }

        // An open transaction is rolled back by SQLite on close.
        // SAFETY: db is valid; close_v2 defers teardown until outstanding
        // statements are finalized.
        let rc = unsafe { ffi::sqlite3_close_v2(inner.db) };
        inner.db = ptr::null_mut();
        inner.in_transaction = false;

        if rc != ffi::SQLITE_OK {
            return Err(Error::Driver(DriverError::new(
                DriverErrorKind::Database,
                format!("failed to close database: {}", ffi::error_string(rc)),
            )));
        }
        debug!("session closed");
        Ok(())
    }

    /// Whether SQLite itself reports auto-commit mode (no open transaction).
    pub fn sqlite_auto_commit(&self) -> bool {
        let inner = self.lock();
        if inner.db.is_null() {
            return false;
        }
        // SAFETY: db is valid
        unsafe { ffi::sqlite3_get_autocommit(inner.db) != 0 }
    }
}

impl Drop for SqliteDriver {
    fn drop(&mut self) {
        let inner = self.lock();
        if !inner.db.is_null() {
            // SAFETY: db is valid and will not be used again
            unsafe {
                ffi::sqlite3_close_v2(inner.db);
            }
        }
    }
}

impl Driver for SqliteDriver {
    fn set_auto_commit(
        &self,
        _cx: &Cx,
        enabled: bool,
    ) -> impl Future<Output = Outcome<(), Error>> + Send {
        let result = self.set_auto_commit_sync(enabled);
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn execute(&self, _cx: &Cx, sql: &str) -> impl Future<Output = Outcome<(), Error>> + Send {
        let result = self.execute_sync(sql);
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn query(
        &self,
        _cx: &Cx,
        sql: &str,
    ) -> impl Future<Output = Outcome<ResultSet, Error>> + Send {
        let result = self.query_sync(sql, &[]);
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn query_with_params(
        &self,
        _cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<ResultSet, Error>> + Send {
        let result = self.query_sync(sql, params);
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn update(
        &self,
        _cx: &Cx,
        sql: &str,
    ) -> impl Future<Output = Outcome<UpdateResult, Error>> + Send {
        let result = self.update_sync(sql, &[]);
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn update_with_params(
        &self,
        _cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<UpdateResult, Error>> + Send {
        let result = self.update_sync(sql, params);
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn commit(&self, _cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send {
        let result = self.commit_sync();
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn rollback(&self, _cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send {
        let result = self.rollback_sync();
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn close(&self, _cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send {
        let result = self.close_sync();
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }
}

// Helper functions

fn null_byte_error(sql: &str) -> Error {
    Error::Driver(
        DriverError::new(DriverErrorKind::Syntax, "SQL contains null byte").with_sql(sql),
    )
}

fn prepare_stmt(db: *mut ffi::sqlite3, sql: &str) -> Result<*mut ffi::sqlite3_stmt, Error> {
    let c_sql = CString::new(sql).map_err(|_| null_byte_error(sql))?;

    let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();

    // SAFETY: all pointers are valid
    let rc = unsafe {
        ffi::sqlite3_prepare_v2(
            db,
            c_sql.as_ptr(),
            c_sql.as_bytes().len() as c_int,
            &mut stmt,
            ptr::null_mut(),
        )
    };

    if rc != ffi::SQLITE_OK {
        return Err(prepare_error(db, sql));
    }

    Ok(stmt)
}

fn bind_params(
    db: *mut ffi::sqlite3,
    stmt: *mut ffi::sqlite3_stmt,
    sql: &str,
    params: &[Value],
) -> Result<(), Error> {
    // SAFETY: stmt is valid
    let expected = unsafe { ffi::sqlite3_bind_parameter_count(stmt) } as usize;

    for (i, param) in params.iter().enumerate() {
        // SAFETY: stmt is valid, index is 1-based
        let rc = unsafe { types::bind_value(stmt, (i + 1) as c_int, param) };
        if rc != ffi::SQLITE_OK {
            // SAFETY: stmt is valid
            unsafe { ffi::sqlite3_finalize(stmt) };
            return Err(bind_error(db, rc, sql, expected, params.len()));
        }
    }

    Ok(())
}

fn prepare_error(db: *mut ffi::sqlite3, sql: &str) -> Error {
    // SAFETY: db is valid
    let msg = unsafe {
        let ptr = ffi::sqlite3_errmsg(db);
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    };
    // SAFETY: db is valid
    let code = unsafe { ffi::sqlite3_errcode(db) };

    // Prepare-time SQLITE_ERROR is almost always malformed SQL
    let kind = if code == ffi::SQLITE_ERROR {
        DriverErrorKind::Syntax
    } else {
        error_code_to_kind(code)
    };

    Error::Driver(DriverError::new(kind, msg).with_sql(sql))
}

fn bind_error(
    db: *mut ffi::sqlite3,
    rc: c_int,
    sql: &str,
    expected: usize,
    supplied: usize,
) -> Error {
    if rc == ffi::SQLITE_RANGE || rc == ffi::SQLITE_MISMATCH {
        return Error::Parameter(ParameterError {
            kind: ParameterErrorKind::Bind,
            expected,
            supplied,
            sql: Some(sql.to_string()),
        });
    }

    // SAFETY: db is valid
    let msg = unsafe {
        let ptr = ffi::sqlite3_errmsg(db);
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    };

    Error::Driver(
        DriverError::new(
            error_code_to_kind(rc),
            format!("failed to bind parameter: {}", msg),
        )
        .with_sql(sql),
    )
}

fn step_error(db: *mut ffi::sqlite3, sql: &str) -> Error {
    // SAFETY: db is valid
    let msg = unsafe {
        let ptr = ffi::sqlite3_errmsg(db);
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    };
    // SAFETY: db is valid
    let code = unsafe { ffi::sqlite3_errcode(db) };

    Error::Driver(DriverError::new(error_code_to_kind(code), msg).with_sql(sql))
}

fn error_code_to_kind(code: c_int) -> DriverErrorKind {
    match code {
        ffi::SQLITE_CONSTRAINT => DriverErrorKind::Constraint,
        ffi::SQLITE_PERM | ffi::SQLITE_AUTH | ffi::SQLITE_READONLY => DriverErrorKind::Permission,
        ffi::SQLITE_NOTFOUND => DriverErrorKind::NotFound,
        ffi::SQLITE_IOERR | ffi::SQLITE_CORRUPT | ffi::SQLITE_CANTOPEN | ffi::SQLITE_NOTADB
        | ffi::SQLITE_FULL => DriverErrorKind::Connectivity,
        _ => DriverErrorKind::Database,
    }
}

/// Whether the statement's leading keyword is INSERT.
fn is_insert_sql(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("insert"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory() {
        let driver = SqliteDriver::open_memory().unwrap();
        assert_eq!(driver.path(), ":memory:");
        assert!(driver.sqlite_auto_commit());
    }

    #[test]
    fn test_execute_and_query() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver
            .execute_sync("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        driver
            .execute_sync("INSERT INTO test (name) VALUES ('Alice'), ('Bob')")
            .unwrap();

        let rs = driver
            .query_sync("SELECT * FROM test ORDER BY id", &[])
            .unwrap();
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.columns().names(), &["id", "name"]);
        assert_eq!(rs.get(0).unwrap().get_named::<i64>("id").unwrap(), 1);
        assert_eq!(
            rs.get(0).unwrap().get_named::<String>("name").unwrap(),
            "Alice"
        );
        assert_eq!(
            rs.get(1).unwrap().get_named::<String>("name").unwrap(),
            "Bob"
        );
    }

    #[test]
    fn test_parameterized_query() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver
            .execute_sync("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")
            .unwrap();

        driver
            .update_sync(
                "INSERT INTO test (name, age) VALUES (?, ?)",
                &[Value::Text("Alice".to_string()), Value::Int(30)],
            )
            .unwrap();

        let rs = driver
            .query_sync(
                "SELECT * FROM test WHERE name = ?",
                &[Value::Text("Alice".to_string())],
            )
            .unwrap();

        assert_eq!(rs.len(), 1);
        assert_eq!(rs.get(0).unwrap().get_named::<i64>("age").unwrap(), 30);
    }

    #[test]
    fn test_update_reports_changes_and_keys() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver
            .execute_sync("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();

        let res = driver
            .update_sync(
                "INSERT INTO test (name) VALUES (?)",
                &[Value::Text("Alice".to_string())],
            )
            .unwrap();
        assert_eq!(res.rows_affected, 1);
        assert_eq!(res.first_key(), Some(&Value::Int(1)));

        let res = driver
            .update_sync(
                "INSERT INTO test (name) VALUES (?)",
                &[Value::Text("Bob".to_string())],
            )
            .unwrap();
        assert_eq!(res.first_key(), Some(&Value::Int(2)));

        // Non-INSERT statements carry no generated keys
        let res = driver.update_sync("DELETE FROM test", &[]).unwrap();
        assert_eq!(res.rows_affected, 2);
        assert!(res.generated_keys.is_none());
    }

    #[test]
    fn test_null_handling() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver
            .execute_sync("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        driver
            .update_sync("INSERT INTO test (name) VALUES (?)", &[Value::Null])
            .unwrap();

        let rs = driver.query_sync("SELECT name FROM test", &[]).unwrap();
        assert_eq!(
            rs.get(0)
                .unwrap()
                .get_named::<Option<String>>("name")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_type_round_trip() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver
            .execute_sync("CREATE TABLE types (b BOOLEAN, i INTEGER, f REAL, t TEXT, bl BLOB)")
            .unwrap();

        driver
            .update_sync(
                "INSERT INTO types VALUES (?, ?, ?, ?, ?)",
                &[
                    Value::Bool(true),
                    Value::Int(42),
                    Value::Float(1.5),
                    Value::Text("hello".to_string()),
                    Value::Bytes(vec![1, 2, 3]),
                ],
            )
            .unwrap();

        let rs = driver.query_sync("SELECT * FROM types", &[]).unwrap();
        let row = rs.get(0).unwrap();
        // Booleans come back as INTEGER
        assert_eq!(row.get_named::<i64>("b").unwrap(), 1);
        assert_eq!(row.get_named::<i64>("i").unwrap(), 42);
        assert!((row.get_named::<f64>("f").unwrap() - 1.5).abs() < f64::EPSILON);
        assert_eq!(row.get_named::<String>("t").unwrap(), "hello");
        assert_eq!(row.get_named::<Vec<u8>>("bl").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_timestamp_binds_as_iso8601() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver.execute_sync("CREATE TABLE ts (at TEXT)").unwrap();
        driver
            .update_sync("INSERT INTO ts VALUES (?)", &[Value::Timestamp(0)])
            .unwrap();

        let rs = driver.query_sync("SELECT at FROM ts", &[]).unwrap();
        assert_eq!(
            rs.get(0).unwrap().get_named::<String>("at").unwrap(),
            "1970-01-01T00:00:00"
        );
    }

    #[test]
    fn test_syntax_error_kind() {
        let driver = SqliteDriver::open_memory().unwrap();
        let err = driver.execute_sync("SELEC 1").unwrap_err();
        match err {
            Error::Driver(e) => assert_eq!(e.kind, DriverErrorKind::Syntax),
            other => panic!("expected driver error, got {other:?}"),
        }
    }

    #[test]
    fn test_constraint_error_kind() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver
            .execute_sync("CREATE TABLE u (id INTEGER PRIMARY KEY, name TEXT UNIQUE)")
            .unwrap();
        driver
            .update_sync(
                "INSERT INTO u (name) VALUES (?)",
                &[Value::Text("x".to_string())],
            )
            .unwrap();

        let err = driver
            .update_sync(
                "INSERT INTO u (name) VALUES (?)",
                &[Value::Text("x".to_string())],
            )
            .unwrap_err();
        assert!(err.is_constraint(), "got {err:?}");
    }

    #[test]
    fn test_oversupplied_params_is_parameter_error() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver.execute_sync("CREATE TABLE t (a INTEGER)").unwrap();

        // Two values against one placeholder: the second bind is out of range
        let err = driver
            .update_sync(
                "INSERT INTO t VALUES (?)",
                &[Value::Int(1), Value::Int(2)],
            )
            .unwrap_err();
        match err {
            Error::Parameter(p) => {
                assert_eq!(p.kind, ParameterErrorKind::Bind);
                assert_eq!(p.expected, 1);
            }
            other => panic!("expected parameter error, got {other:?}"),
        }
    }

    #[test]
    fn test_lazy_transaction_commit_and_rollback() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver.execute_sync("CREATE TABLE t (a INTEGER)").unwrap();

        driver.set_auto_commit_sync(false).unwrap();
        // No statement yet: no transaction open
        assert!(driver.sqlite_auto_commit());

        driver
            .update_sync("INSERT INTO t VALUES (?)", &[Value::Int(1)])
            .unwrap();
        // The lazy BEGIN ran
        assert!(!driver.sqlite_auto_commit());

        driver.rollback_sync().unwrap();
        assert!(driver.sqlite_auto_commit());
        let rs = driver.query_sync("SELECT * FROM t", &[]).unwrap();
        assert!(rs.is_empty());

        driver
            .update_sync("INSERT INTO t VALUES (?)", &[Value::Int(2)])
            .unwrap();
        driver.commit_sync().unwrap();
        let rs = driver.query_sync("SELECT * FROM t", &[]).unwrap();
        assert_eq!(rs.len(), 1);
    }

    #[test]
    fn test_commit_without_transaction() {
        let driver = SqliteDriver::open_memory().unwrap();

        // Auto-commit on: commit has nothing to terminate
        let err = driver.commit_sync().unwrap_err();
        match err {
            Error::Driver(e) => assert_eq!(e.kind, DriverErrorKind::Transaction),
            other => panic!("expected transaction error, got {other:?}"),
        }

        // Auto-commit off but no statement yet: a silent no-op
        driver.set_auto_commit_sync(false).unwrap();
        driver.commit_sync().unwrap();
        driver.rollback_sync().unwrap();
    }

    #[test]
    fn test_reenabling_auto_commit_commits_pending_work() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver.execute_sync("CREATE TABLE t (a INTEGER)").unwrap();

        driver.set_auto_commit_sync(false).unwrap();
        driver
            .update_sync("INSERT INTO t VALUES (?)", &[Value::Int(1)])
            .unwrap();
        driver.set_auto_commit_sync(true).unwrap();

        assert!(driver.sqlite_auto_commit());
        let rs = driver.query_sync("SELECT * FROM t", &[]).unwrap();
        assert_eq!(rs.len(), 1);
    }

    #[test]
    fn test_close_then_use() {
        let driver = SqliteDriver::open_memory().unwrap();
        driver.close_sync().unwrap();

        assert!(matches!(
            driver.execute_sync("SELECT 1").unwrap_err(),
            Error::ClosedConnection
        ));
        assert!(matches!(
            driver.close_sync().unwrap_err(),
            Error::ClosedConnection
        ));
    }

    #[test]
    fn test_is_insert_sql() {
        assert!(is_insert_sql("INSERT INTO t VALUES (1)"));
        assert!(is_insert_sql("  insert into t values (1)"));
        assert!(!is_insert_sql("UPDATE t SET a = 1"));
        assert!(!is_insert_sql("ins"));
    }
}
