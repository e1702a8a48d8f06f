//! Minimal SELECT construction over an injected SQL dialect.

/// Rendering rules of a concrete SQL engine.
///
/// Injected into the translator rather than referenced as ambient state, so
/// alternative engines and test doubles plug in without touching the
/// translation itself.
pub trait SqlDialect: Send + Sync {
    /// Quote an identifier for use in statement text.
    fn quote_ident(&self, ident: &str) -> String;

    /// Placeholder text for the positional argument at `position` (0-based).
    fn placeholder(&self, position: usize) -> String;

    /// Native high-resolution timestamp literal from epoch milliseconds.
    fn timestamp_from_millis(&self, millis: i64) -> String;

    /// Element access into the map-typed label column. `key` is an already
    /// rendered placeholder or fragment, never a raw value.
    fn map_value(&self, column: &str, key: &str) -> String;

    /// Explode the key set of the map-typed label column.
    fn map_keys(&self, column: &str) -> String;

    /// Regex-match predicate over `target`. `pattern` is an already rendered
    /// placeholder.
    fn regex_match(&self, target: &str, pattern: &str) -> String;
}

/// Dialect of the ClickHouse SQL engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClickhouseDialect;

impl SqlDialect for ClickhouseDialect {
    fn quote_ident(&self, ident: &str) -> String {
        format!("`{ident}`")
    }

    fn placeholder(&self, _position: usize) -> String {
        String::from("?")
    }

    fn timestamp_from_millis(&self, millis: i64) -> String {
        format!("fromUnixTimestamp64Milli({millis})")
    }

    fn map_value(&self, column: &str, key: &str) -> String {
        format!("arrayElement({column}, {key})")
    }

    fn map_keys(&self, column: &str) -> String {
        format!("arrayJoin(mapKeys({column}))")
    }

    fn regex_match(&self, target: &str, pattern: &str) -> String {
        format!("match({target}, {pattern})")
    }
}

/// A finished statement: SQL text plus its positional arguments, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFragment {
    pub sql: String,
    pub args: Vec<String>,
}

/// Accumulates one SELECT statement and its positional arguments.
pub struct SelectBuilder<'a> {
    dialect: &'a dyn SqlDialect,
    columns: Vec<String>,
    table: String,
    conjuncts: Vec<String>,
    order_by: Option<String>,
    limit: Option<u32>,
    distinct: bool,
    args: Vec<String>,
}

impl<'a> SelectBuilder<'a> {
    pub fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self {
            dialect,
            columns: Vec::new(),
            table: String::new(),
            conjuncts: Vec::new(),
            order_by: None,
            limit: None,
            distinct: false,
            args: Vec::new(),
        }
    }

    pub fn select(&mut self, column: impl Into<String>) -> &mut Self {
        self.columns.push(column.into());
        self
    }

    pub fn from_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// AND another predicate onto the WHERE clause.
    pub fn and_where(&mut self, predicate: impl Into<String>) -> &mut Self {
        self.conjuncts.push(predicate.into());
        self
    }

    pub fn order_by(&mut self, clause: impl Into<String>) -> &mut Self {
        self.order_by = Some(clause.into());
        self
    }

    pub fn limit(&mut self, limit: u32) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Register `value` as the next positional argument and return the
    /// placeholder text to splice into a predicate.
    pub fn bind(&mut self, value: impl Into<String>) -> String {
        let placeholder = self.dialect.placeholder(self.args.len());
        self.args.push(value.into());
        placeholder
    }

    pub fn build(self) -> SqlFragment {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.columns.join(", "));
        sql.push_str(" FROM ");
        sql.push_str(&self.table);
        if !self.conjuncts.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conjuncts.join(" AND "));
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        SqlFragment {
            sql,
            args: self.args,
        }
    }
}
