use common::model::MatchOp;

/// Errors that abort translation of a query expression.
///
/// Only label matchers gate the correctness of selection; a bad matcher
/// operator therefore fails the whole query before execution. Line-filter
/// problems are handled inside the translator as logged warnings instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TranslateError {
    #[error("unsupported label matcher operator: {0:?}")]
    UnsupportedMatcherOp(MatchOp),
}
