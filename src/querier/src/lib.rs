//! Translation of log-query expressions into parameterized SQL against a
//! wide log table, and streaming of the resulting rows back as log entries.
//!
//! The serving layer hands this crate an already-parsed selector plus a time
//! range; the crate hands back either SQL to execute or, through
//! [`SqlLogQuerier`], fully adapted results read off a live cursor.

pub mod engine;
pub mod query;
pub mod read;

pub use engine::{EngineError, LogRowCursor, QueryExecutor, RawLogRow};
pub use query::logql::{ClickhouseDialect, QueryEnvironment, SqlDialect, SqlFragment};
pub use query::table::LogsTableRef;
pub use query::{
    LabelQueryParams, LogQuerier, QuerierError, SelectLogsParams, SeriesQueryParams, SqlLogQuerier,
};
pub use read::LogEntryIterator;
