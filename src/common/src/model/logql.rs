//! The parsed log-query expression handed to translation.
//!
//! The serving layer parses the textual query language; this module only
//! defines the tree it produces. The node enums are `non_exhaustive` so
//! translation downstream keeps a catch-all arm for kinds added later.

use serde::{Deserialize, Serialize};

/// Match operation of a label matcher or line filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MatchOp {
    /// Exact string match (=)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Regex match (=~)
    RegexMatch,
    /// Regex not match (!~)
    RegexNotMatch,
}

impl std::fmt::Display for MatchOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::NotEqual => write!(f, "!="),
            Self::RegexMatch => write!(f, "=~"),
            Self::RegexNotMatch => write!(f, "!~"),
        }
    }
}

/// A single label matcher, constraining one label's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMatcher {
    /// Query-side label name
    pub name: String,
    /// Match operation
    pub op: MatchOp,
    /// Literal value or regex pattern to match against
    pub value: String,
}

impl LabelMatcher {
    /// Create a new equality matcher
    pub fn equal(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            op: MatchOp::Equal,
            value: value.to_string(),
        }
    }

    /// Create a new not-equal matcher
    pub fn not_equal(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            op: MatchOp::NotEqual,
            value: value.to_string(),
        }
    }

    /// Create a new regex matcher
    pub fn regex_match(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            op: MatchOp::RegexMatch,
            value: pattern.to_string(),
        }
    }

    /// Create a new regex not-match matcher
    pub fn regex_not_match(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            op: MatchOp::RegexNotMatch,
            value: pattern.to_string(),
        }
    }

    /// A matcher without a value or pattern constrains nothing and must be
    /// dropped by translation instead of emitted as a vacuous predicate.
    pub fn is_noop(&self) -> bool {
        self.value.is_empty()
    }
}

/// A predicate over the raw log line text.
///
/// `Equal`/`NotEqual` are substring containment; the regex operations are
/// full regular-expression tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFilter {
    pub op: MatchOp,
    pub pattern: String,
}

impl LineFilter {
    pub fn new(op: MatchOp, pattern: &str) -> Self {
        Self {
            op,
            pattern: pattern.to_string(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.pattern.is_empty()
    }
}

/// One node of a log selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SelectorNode {
    /// An unordered group of matchers, implicitly AND-ed
    Matchers(Vec<LabelMatcher>),
    /// A filter over the log line body
    LineFilter(LineFilter),
}

/// A full log selector: matcher groups and line filters in parse order,
/// traversable as a flat depth-first sequence. Traversal order carries no
/// semantic weight for translation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSelectorExpr {
    nodes: Vec<SelectorNode>,
}

impl LogSelectorExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_matchers(matchers: Vec<LabelMatcher>) -> Self {
        Self {
            nodes: vec![SelectorNode::Matchers(matchers)],
        }
    }

    pub fn with_node(mut self, node: SelectorNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_line_filter(self, filter: LineFilter) -> Self {
        self.with_node(SelectorNode::LineFilter(filter))
    }

    pub fn push(&mut self, node: SelectorNode) {
        self.nodes.push(node);
    }

    /// Flat depth-first traversal of the selector's nodes.
    pub fn walk(&self) -> impl Iterator<Item = &SelectorNode> {
        self.nodes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Ordering of a log selection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Direction {
    /// Oldest entries first
    Forward,
    /// Most recent entries first
    Backward,
}
