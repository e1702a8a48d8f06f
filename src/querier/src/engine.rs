//! Boundary contracts toward the SQL engine.
//!
//! Connection setup, TLS, retries, and cancellation live with the caller;
//! this crate only consumes a cursor over an executed statement and an
//! executor that can run `(sql, args)` pairs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Failure raised by the SQL engine or while reading its result set.
///
/// Cloneable so a cursor's terminal error slot can be observed repeatedly.
#[derive(Clone, Debug, thiserror::Error)]
pub enum EngineError {
    #[error("query execution failed: {0}")]
    Execution(String),
    #[error("failed to scan row: {0}")]
    Scan(String),
}

/// One undecoded row of the wide log table.
#[derive(Clone, Debug)]
pub struct RawLogRow {
    pub timestamp: DateTime<Utc>,
    pub body: String,
    /// Raw store-side label map; keys are still in dotted form
    pub labels: HashMap<String, String>,
}

/// A forward-only, single-pass result cursor over log rows.
///
/// The cursor is exclusively owned by its reader for the reader's lifetime.
pub trait LogRowCursor: Send {
    /// Position the cursor on the next row. Returns false once no rows
    /// remain; `error` distinguishes exhaustion from failure.
    fn advance(&mut self) -> bool;

    /// Decode the row the cursor is positioned on.
    fn scan(&mut self) -> Result<RawLogRow, EngineError>;

    /// The cursor's terminal error slot, if set.
    fn error(&self) -> Option<EngineError>;

    /// Release the underlying result set.
    fn close(&mut self) -> Result<(), EngineError>;
}

impl<C: LogRowCursor + ?Sized> LogRowCursor for Box<C> {
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn scan(&mut self) -> Result<RawLogRow, EngineError> {
        (**self).scan()
    }

    fn error(&self) -> Option<EngineError> {
        (**self).error()
    }

    fn close(&mut self) -> Result<(), EngineError> {
        (**self).close()
    }
}

/// Executes translated statements against the SQL engine.
///
/// Implemented by the connection layer; statements arrive as SQL text plus
/// positional arguments, never as an interpolated string.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute a log selection statement and hand back its live cursor.
    async fn query_log_rows(
        &self,
        sql: &str,
        args: &[String],
    ) -> Result<Box<dyn LogRowCursor>, EngineError>;

    /// Execute a statement whose result is a single string column.
    async fn query_strings(&self, sql: &str, args: &[String]) -> Result<Vec<String>, EngineError>;

    /// Execute a statement whose result is a single map column.
    async fn query_label_maps(
        &self,
        sql: &str,
        args: &[String],
    ) -> Result<Vec<HashMap<String, String>>, EngineError>;
}
