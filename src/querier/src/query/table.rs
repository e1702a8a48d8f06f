//! Validated reference to the wide log table.
//!
//! Identifiers land in the statement text (they cannot travel as positional
//! arguments), so both parts are validated up front.

use thiserror::Error;

use super::logql::SqlDialect;

/// Errors that can occur when building a log table reference.
#[derive(Error, Debug)]
pub enum TableRefError {
    /// Identifier contains characters unsafe for statement text.
    #[error(
        "invalid identifier '{0}': must contain only alphanumeric, underscore, or hyphen characters"
    )]
    InvalidIdentifier(String),
    /// Empty identifier not allowed.
    #[error("empty identifier not allowed")]
    EmptyIdentifier,
}

fn validate_identifier(ident: &str) -> Result<(), TableRefError> {
    if ident.is_empty() {
        return Err(TableRefError::EmptyIdentifier);
    }
    if !ident
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(TableRefError::InvalidIdentifier(ident.to_string()));
    }
    Ok(())
}

/// A `database.table` pair naming the wide log table.
#[derive(Debug, Clone)]
pub struct LogsTableRef {
    database: String,
    table: String,
}

impl LogsTableRef {
    pub fn new(database: &str, table: &str) -> Result<Self, TableRefError> {
        validate_identifier(database)?;
        validate_identifier(table)?;

        Ok(Self {
            database: database.to_string(),
            table: table.to_string(),
        })
    }

    /// Fully qualified, dialect-quoted table name.
    pub fn qualified(&self, dialect: &dyn SqlDialect) -> String {
        format!(
            "{}.{}",
            dialect.quote_ident(&self.database),
            dialect.quote_ident(&self.table)
        )
    }
}
