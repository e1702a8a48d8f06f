//! The querier facade: translate, execute, adapt results.

use async_trait::async_trait;

use common::model::{LabelSet, normalize_label};

use crate::engine::{LogRowCursor, QueryExecutor};
use crate::read::LogEntryIterator;

use super::logql::{ClickhouseDialect, QueryEnvironment, SqlDialect};
use super::{LabelQueryParams, LogQuerier, QuerierError, SelectLogsParams, SeriesQueryParams};

/// Log querier over a wide map-typed table behind a SQL engine.
///
/// Holds the translation environment and an executor supplied by the
/// connection layer; every operation builds a fresh statement, runs it, and
/// adapts the result shape the serving layer expects.
pub struct SqlLogQuerier<E, D: SqlDialect = ClickhouseDialect> {
    executor: E,
    env: QueryEnvironment<D>,
}

impl<E: QueryExecutor, D: SqlDialect> SqlLogQuerier<E, D> {
    pub fn new(executor: E, env: QueryEnvironment<D>) -> Self {
        Self { executor, env }
    }
}

#[async_trait]
impl<E: QueryExecutor, D: SqlDialect> LogQuerier for SqlLogQuerier<E, D> {
    async fn select_logs(
        &self,
        params: SelectLogsParams,
    ) -> Result<LogEntryIterator<Box<dyn LogRowCursor>>, QuerierError> {
        let query = self.env.select_logs_query(
            &params.selector,
            params.start,
            params.end,
            params.limit,
            params.direction,
        )?;

        let cursor = self.executor.query_log_rows(&query.sql, &query.args).await?;

        Ok(LogEntryIterator::new(cursor))
    }

    async fn labels(&self, params: LabelQueryParams) -> Result<Vec<String>, QuerierError> {
        let query = self
            .env
            .label_query(&params.name, params.values, params.start, params.end);

        let values = self.executor.query_strings(&query.sql, &query.args).await?;

        // Key names and label values both travel through the same
        // normalization the reader applies at decode time.
        Ok(values.into_iter().map(|v| normalize_label(&v)).collect())
    }

    async fn series(&self, params: SeriesQueryParams) -> Result<Vec<LabelSet>, QuerierError> {
        let query = self.env.series_query(&params.groups, params.start, params.end)?;

        let maps = self
            .executor
            .query_label_maps(&query.sql, &query.args)
            .await?;

        Ok(maps.into_iter().map(LabelSet::from_raw).collect())
    }
}
