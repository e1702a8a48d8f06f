//! Query construction and dispatch against the wide log table.

use std::convert::Infallible;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::model::{Direction, LabelMatcher, LabelSet, LogSelectorExpr};

use crate::engine::LogRowCursor;
use crate::read::LogEntryIterator;

pub mod error;
pub mod logql;
pub mod store;
pub mod table;

pub use error::QuerierError;
pub use store::SqlLogQuerier;

/// Parameters for a log selection query.
#[derive(Debug, Clone)]
pub struct SelectLogsParams {
    pub selector: LogSelectorExpr,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub limit: u32,
    pub direction: Direction,
}

/// Parameters for a label enumeration query.
#[derive(Debug, Clone)]
pub struct LabelQueryParams {
    /// Label name; ignored when enumerating key names
    pub name: String,
    /// true: distinct values of `name`; false: distinct label key names
    pub values: bool,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Parameters for a series identity query.
#[derive(Debug, Clone)]
pub struct SeriesQueryParams {
    /// Matcher groups; each group is AND-ed internally
    pub groups: Vec<Vec<LabelMatcher>>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The query operations the serving layer dispatches to.
///
/// The shapes this store does not serve fail with
/// [`QuerierError::Unimplemented`] rather than returning an empty success.
#[async_trait]
pub trait LogQuerier: Send + Sync {
    /// Select log entries, streamed back through a pull-based reader.
    async fn select_logs(
        &self,
        params: SelectLogsParams,
    ) -> Result<LogEntryIterator<Box<dyn LogRowCursor>>, QuerierError>;

    /// Enumerate label values or label key names.
    async fn labels(&self, params: LabelQueryParams) -> Result<Vec<String>, QuerierError>;

    /// Enumerate the label-set identities matching the given groups.
    async fn series(&self, params: SeriesQueryParams) -> Result<Vec<LabelSet>, QuerierError>;

    /// Live tailing of new log data.
    async fn tail(&self, _params: SelectLogsParams) -> Result<Infallible, QuerierError> {
        log::info!("tail: not implemented");
        Err(QuerierError::Unimplemented("tail"))
    }

    /// Metric sample selection.
    async fn select_samples(&self, _params: SelectLogsParams) -> Result<Infallible, QuerierError> {
        log::info!("select_samples: not implemented");
        Err(QuerierError::Unimplemented("select_samples"))
    }

    /// Index statistics over the selected streams.
    async fn index_stats(&self, _params: SeriesQueryParams) -> Result<Infallible, QuerierError> {
        log::info!("index_stats: not implemented");
        Err(QuerierError::Unimplemented("index_stats"))
    }

    /// Ingest volume statistics over the selected streams.
    async fn series_volume(&self, _params: SeriesQueryParams) -> Result<Infallible, QuerierError> {
        log::info!("series_volume: not implemented");
        Err(QuerierError::Unimplemented("series_volume"))
    }
}
