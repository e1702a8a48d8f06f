use crate::engine::EngineError;
use crate::query::logql::TranslateError;
use crate::query::table::TableRefError;

#[derive(Debug, thiserror::Error)]
pub enum QuerierError {
    #[error("failed to build query: {0}")]
    Translate(#[from] TranslateError),
    #[error("invalid table reference: {0}")]
    Table(#[from] TableRefError),
    #[error("query failed: {0}")]
    Engine(#[from] EngineError),
    #[error("{0}: not implemented")]
    Unimplemented(&'static str),
}
