//! Log-query expression to SQL translation.
//!
//! Three query shapes are built here: log selection, label enumeration, and
//! series identity. All predicates over labels go through the map-typed
//! label column; label names are denormalized into the store's dotted key
//! form before they are bound.

use chrono::{DateTime, Utc};

use common::model::{
    Direction, LabelMatcher, LineFilter, LogSelectorExpr, MatchOp, SelectorNode, denormalize_label,
};

use super::error::TranslateError;
use super::sql::{ClickhouseDialect, SelectBuilder, SqlDialect, SqlFragment};
use crate::query::table::LogsTableRef;

/// Column names of the wide log table (OTel exporter schema).
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const BODY_COLUMN: &str = "Body";
pub const LABELS_COLUMN: &str = "ResourceAttributes";

/// Translation environment: an injected dialect plus the target table.
///
/// Purely functional per call; safe to share across concurrent readers.
pub struct QueryEnvironment<D: SqlDialect = ClickhouseDialect> {
    dialect: D,
    table: LogsTableRef,
}

impl QueryEnvironment<ClickhouseDialect> {
    pub fn clickhouse(table: LogsTableRef) -> Self {
        Self::new(ClickhouseDialect, table)
    }
}

impl<D: SqlDialect> QueryEnvironment<D> {
    pub fn new(dialect: D, table: LogsTableRef) -> Self {
        Self { dialect, table }
    }

    /// Build a log selection statement for `expr` over `[start, end]`.
    ///
    /// The selector is traversed once; every recognized node contributes its
    /// predicates to one AND chain. Unrecognized node kinds are logged and
    /// skipped so translation stays total as the expression tree evolves.
    pub fn select_logs_query(
        &self,
        expr: &LogSelectorExpr,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
        direction: Direction,
    ) -> Result<SqlFragment, TranslateError> {
        let mut sb = SelectBuilder::new(&self.dialect);
        sb.select(self.dialect.quote_ident(TIMESTAMP_COLUMN));
        sb.select(self.dialect.quote_ident(BODY_COLUMN));
        sb.select(self.dialect.quote_ident(LABELS_COLUMN));
        sb.from_table(self.table.qualified(&self.dialect));

        self.push_time_bound(&mut sb, ">=", start);
        self.push_time_bound(&mut sb, "<=", end);
        sb.limit(limit);

        let timestamp = self.dialect.quote_ident(TIMESTAMP_COLUMN);
        let order_by = match direction {
            Direction::Backward => format!("{timestamp} DESC"),
            Direction::Forward => format!("{timestamp} ASC"),
            other => {
                log::warn!("select_logs_query: unrecognized direction: {other:?}");
                timestamp
            }
        };
        sb.order_by(order_by);

        for node in expr.walk() {
            match node {
                SelectorNode::Matchers(matchers) => {
                    for matcher in matchers {
                        self.push_matcher(&mut sb, matcher)?;
                    }
                }
                SelectorNode::LineFilter(filter) => self.push_line_filter(&mut sb, filter),
                node => {
                    log::warn!("select_logs_query: skipping unrecognized selector node: {node:?}")
                }
            }
        }

        Ok(sb.build())
    }

    /// Build a label enumeration statement: distinct values of one label, or
    /// distinct key names across all rows. Each present bound contributes
    /// its own range predicate; absent bounds contribute none.
    pub fn label_query(
        &self,
        name: &str,
        values: bool,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> SqlFragment {
        let mut sb = SelectBuilder::new(&self.dialect);
        sb.from_table(self.table.qualified(&self.dialect));
        sb.distinct();

        let labels = self.dialect.quote_ident(LABELS_COLUMN);
        if values {
            let key = sb.bind(denormalize_label(name));
            let lookup = self.dialect.map_value(&labels, &key);
            sb.select(lookup);
        } else {
            sb.select(self.dialect.map_keys(&labels));
        }

        if let Some(start) = start {
            self.push_time_bound(&mut sb, ">=", start);
        }
        if let Some(end) = end {
            self.push_time_bound(&mut sb, "<=", end);
        }

        sb.build()
    }

    /// Build a series identity statement over matcher groups.
    ///
    /// Every matcher of every group lands in the same AND chain; group
    /// boundaries are not composed into OR. This keeps the store's
    /// historical predicate accumulation for multi-group requests.
    pub fn series_query(
        &self,
        groups: &[Vec<LabelMatcher>],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SqlFragment, TranslateError> {
        let mut sb = SelectBuilder::new(&self.dialect);
        sb.select(self.dialect.quote_ident(LABELS_COLUMN));
        sb.from_table(self.table.qualified(&self.dialect));
        sb.distinct();

        self.push_time_bound(&mut sb, ">=", start);
        self.push_time_bound(&mut sb, "<=", end);

        for group in groups {
            for matcher in group {
                self.push_matcher(&mut sb, matcher)?;
            }
        }

        Ok(sb.build())
    }

    fn push_time_bound(&self, sb: &mut SelectBuilder<'_>, op: &str, at: DateTime<Utc>) {
        let timestamp = self.dialect.quote_ident(TIMESTAMP_COLUMN);
        let literal = self.dialect.timestamp_from_millis(at.timestamp_millis());
        sb.and_where(format!("{timestamp} {op} {literal}"));
    }

    /// Translate one label matcher into a predicate over the label map.
    ///
    /// An unrecognized operator here is fatal: silently dropping a matcher
    /// would select rows the query excluded.
    fn push_matcher(
        &self,
        sb: &mut SelectBuilder<'_>,
        matcher: &LabelMatcher,
    ) -> Result<(), TranslateError> {
        if matcher.is_noop() {
            return Ok(());
        }

        let key = sb.bind(denormalize_label(&matcher.name));
        let lookup = self
            .dialect
            .map_value(&self.dialect.quote_ident(LABELS_COLUMN), &key);

        match matcher.op {
            MatchOp::Equal => {
                let value = sb.bind(matcher.value.clone());
                sb.and_where(format!("{lookup} = {value}"));
            }
            MatchOp::NotEqual => {
                let value = sb.bind(matcher.value.clone());
                sb.and_where(format!("{lookup} <> {value}"));
            }
            MatchOp::RegexMatch => {
                let pattern = sb.bind(matcher.value.clone());
                sb.and_where(self.dialect.regex_match(&lookup, &pattern));
            }
            MatchOp::RegexNotMatch => {
                let pattern = sb.bind(matcher.value.clone());
                sb.and_where(format!("NOT {}", self.dialect.regex_match(&lookup, &pattern)));
            }
            op => return Err(TranslateError::UnsupportedMatcherOp(op)),
        }

        Ok(())
    }

    /// Translate one line filter into a predicate over the log body.
    ///
    /// Line filters are best-effort: an unrecognized operator is logged and
    /// the predicate skipped, leaving a less constrained statement.
    fn push_line_filter(&self, sb: &mut SelectBuilder<'_>, filter: &LineFilter) {
        if filter.is_noop() {
            return;
        }

        let body = self.dialect.quote_ident(BODY_COLUMN);
        match filter.op {
            MatchOp::Equal => {
                let pattern = sb.bind(format!("%{}%", filter.pattern));
                sb.and_where(format!("{body} LIKE {pattern}"));
            }
            MatchOp::NotEqual => {
                let pattern = sb.bind(format!("%{}%", filter.pattern));
                sb.and_where(format!("{body} NOT LIKE {pattern}"));
            }
            MatchOp::RegexMatch => {
                let pattern = sb.bind(filter.pattern.clone());
                sb.and_where(self.dialect.regex_match(&body, &pattern));
            }
            MatchOp::RegexNotMatch => {
                let pattern = sb.bind(filter.pattern.clone());
                sb.and_where(format!("NOT {}", self.dialect.regex_match(&body, &pattern)));
            }
            op => log::warn!("push_line_filter: skipping unrecognized line filter operator: {op}"),
        }
    }
}
