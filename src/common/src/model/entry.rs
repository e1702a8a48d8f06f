use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped log line handed back to the serving layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub line: String,
}

impl Default for LogEntry {
    fn default() -> Self {
        Self {
            timestamp: DateTime::UNIX_EPOCH,
            line: String::new(),
        }
    }
}
