//! Streaming reader over an executed log selection.
//!
//! Adapts the engine's forward-only cursor into a pull sequence of decoded
//! entries. Each advance installs a fresh run-once decode slot for the new
//! row; the scan, per-key normalization, and canonical label rendering
//! happen once no matter how many accessors read the row afterwards, and a
//! decode failure is cached the same way.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use common::model::{LabelSet, LogEntry};

use crate::engine::{EngineError, LogRowCursor};

/// A row scanned and normalized once, then served from cache.
#[derive(Clone, Debug)]
struct DecodedRow {
    timestamp: DateTime<Utc>,
    body: String,
    /// Canonical rendering of the normalized label set
    labels: String,
}

fn decode_row<C: LogRowCursor>(cursor: &mut C) -> Result<DecodedRow, EngineError> {
    let raw = cursor.scan()?;
    let labels = LabelSet::from_raw(raw.labels).to_string();

    Ok(DecodedRow {
        timestamp: raw.timestamp,
        body: raw.body,
        labels,
    })
}

/// Pull-based iterator of decoded log entries over a live cursor.
///
/// Usage: `advance` until it returns false, reading entries in between, then
/// check `error` to tell clean exhaustion from a failure, then `close`.
pub struct LogEntryIterator<C: LogRowCursor> {
    cursor: C,
    row: Option<OnceCell<Result<DecodedRow, EngineError>>>,
}

impl<C: LogRowCursor> LogEntryIterator<C> {
    pub fn new(cursor: C) -> Self {
        Self { cursor, row: None }
    }

    /// Position on the next row.
    ///
    /// Returns false once the cursor is exhausted, and also for a row whose
    /// decode fails; the failure stays cached for `error` and the accessors.
    pub fn advance(&mut self) -> bool {
        if !self.cursor.advance() {
            return false;
        }

        // Fresh slot for the new row; the decode runs through it here so
        // every later accessor observes the same result without rescanning.
        self.row = Some(OnceCell::new());
        match self.current() {
            Some(Err(err)) => {
                log::warn!("failed to read row: {err}");
                false
            }
            _ => true,
        }
    }

    fn current(&mut self) -> Option<&Result<DecodedRow, EngineError>> {
        let Self { cursor, row } = self;
        row.as_ref().map(|cell| cell.get_or_init(|| decode_row(cursor)))
    }

    /// Canonical, order-stable label string of the current row; empty if the
    /// row failed to decode.
    pub fn labels(&mut self) -> String {
        match self.current() {
            Some(Ok(row)) => row.labels.clone(),
            _ => String::new(),
        }
    }

    /// Stable 64-bit identity of the stream this row belongs to.
    ///
    /// Equal label strings always hash equal, across readers and process
    /// restarts; collisions are tolerated by consumers.
    pub fn stream_hash(&mut self) -> u64 {
        hash_labels(&self.labels())
    }

    /// Timestamp and line of the current row; zero-valued if the row failed
    /// to decode.
    pub fn entry(&mut self) -> LogEntry {
        match self.current() {
            Some(Ok(row)) => LogEntry {
                timestamp: row.timestamp,
                line: row.body.clone(),
            },
            _ => LogEntry::default(),
        }
    }

    /// Terminal error: the cursor's own error if set, otherwise the cached
    /// failure of the last attempted decode. Check after iteration ends.
    pub fn error(&mut self) -> Option<EngineError> {
        if let Some(err) = self.cursor.error() {
            return Some(err);
        }
        match self.current() {
            Some(Err(err)) => Some(err.clone()),
            _ => None,
        }
    }

    /// Release the underlying cursor.
    pub fn close(mut self) -> Result<(), EngineError> {
        self.cursor.close()
    }
}

/// FNV-1a over the canonical label string.
fn hash_labels(labels: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for byte in labels.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::engine::RawLogRow;

    use super::*;

    /// Scripted cursor: a row is either scannable or poisoned with an error.
    struct FakeCursor {
        rows: Vec<Result<RawLogRow, EngineError>>,
        position: Option<usize>,
        scan_calls: usize,
        terminal_error: Option<EngineError>,
    }

    impl FakeCursor {
        fn new(rows: Vec<Result<RawLogRow, EngineError>>) -> Self {
            Self {
                rows,
                position: None,
                scan_calls: 0,
                terminal_error: None,
            }
        }
    }

    impl LogRowCursor for FakeCursor {
        fn advance(&mut self) -> bool {
            let next = self.position.map_or(0, |p| p + 1);
            if next >= self.rows.len() {
                return false;
            }
            self.position = Some(next);
            true
        }

        fn scan(&mut self) -> Result<RawLogRow, EngineError> {
            self.scan_calls += 1;
            let position = self.position.expect("scan before advance");
            self.rows[position].clone()
        }

        fn error(&self) -> Option<EngineError> {
            self.terminal_error.clone()
        }

        fn close(&mut self) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn row(millis: i64, body: &str, labels: &[(&str, &str)]) -> RawLogRow {
        RawLogRow {
            timestamp: Utc.timestamp_millis_opt(millis).unwrap(),
            body: body.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_streams_entries_in_cursor_order() {
        let mut iter = LogEntryIterator::new(FakeCursor::new(vec![
            Ok(row(1000, "first", &[("service.name", "api")])),
            Ok(row(2000, "second", &[("service.name", "api")])),
        ]));

        assert!(iter.advance());
        assert_eq!(iter.entry().line, "first");
        assert!(iter.advance());
        assert_eq!(iter.entry().line, "second");
        assert_eq!(iter.entry().timestamp, Utc.timestamp_millis_opt(2000).unwrap());
        assert!(!iter.advance());
        assert!(iter.error().is_none());
    }

    #[test]
    fn test_labels_are_normalized_and_canonical() {
        let mut iter = LogEntryIterator::new(FakeCursor::new(vec![Ok(row(
            1000,
            "line",
            &[("service.name", "api"), ("env", "prod")],
        ))]));

        assert!(iter.advance());
        assert_eq!(iter.labels(), r#"{env="prod", service_name="api"}"#);
    }

    #[test]
    fn test_decode_runs_once_across_accessors() {
        let mut iter = LogEntryIterator::new(FakeCursor::new(vec![Ok(row(
            1000,
            "line",
            &[("service.name", "api")],
        ))]));

        assert!(iter.advance());
        let _ = iter.labels();
        let _ = iter.stream_hash();
        let _ = iter.entry();
        let _ = iter.error();

        assert_eq!(iter.cursor.scan_calls, 1);
    }

    #[test]
    fn test_stream_hash_is_stable_and_groups_equal_label_sets() {
        let make = || {
            LogEntryIterator::new(FakeCursor::new(vec![
                Ok(row(1000, "a", &[("service.name", "api"), ("env", "prod")])),
                Ok(row(2000, "b", &[("env", "prod"), ("service.name", "api")])),
                Ok(row(3000, "c", &[("service.name", "worker")])),
            ]))
        };

        let mut iter = make();
        assert!(iter.advance());
        let first = iter.stream_hash();
        assert_eq!(first, iter.stream_hash());
        assert!(iter.advance());
        // Same normalized label set, same stream
        assert_eq!(first, iter.stream_hash());
        assert!(iter.advance());
        let other = iter.stream_hash();

        // Stable across reader instances
        let mut again = make();
        assert!(again.advance());
        assert_eq!(first, again.stream_hash());

        assert_ne!(first, other);
    }

    #[test]
    fn test_hash_labels_is_fnv1a() {
        // Pinned values so the identity survives process restarts unchanged
        assert_eq!(hash_labels(""), 14695981039346656037);
        assert_eq!(hash_labels("{}"), 645223143103797797);
        assert_eq!(
            hash_labels(r#"{service_name="api"}"#),
            5342907797122227875
        );
        assert_eq!(
            hash_labels(r#"{env="prod", service_name="api"}"#),
            13979199584624493316
        );
    }

    #[test]
    fn test_failed_decode_is_cached_and_surfaced() {
        let mut iter = LogEntryIterator::new(FakeCursor::new(vec![
            Ok(row(1000, "good", &[("env", "prod")])),
            Err(EngineError::Scan("malformed label map".to_string())),
            Ok(row(3000, "unreached", &[])),
        ]));

        assert!(iter.advance());
        assert_eq!(iter.entry().line, "good");

        // Row 2 fails to decode: advance reports no more rows
        assert!(!iter.advance());

        // Every accessor observes the cached failure without rescanning
        assert_eq!(iter.labels(), "");
        assert_eq!(iter.entry(), LogEntry::default());
        let scans_after_failure = iter.cursor.scan_calls;
        let _ = iter.labels();
        assert_eq!(iter.cursor.scan_calls, scans_after_failure);

        // Not a clean exhaustion
        match iter.error() {
            Some(EngineError::Scan(msg)) => assert_eq!(msg, "malformed label map"),
            other => panic!("expected cached scan failure, got {other:?}"),
        }
    }

    #[test]
    fn test_cursor_terminal_error_wins() {
        let mut cursor = FakeCursor::new(vec![]);
        cursor.terminal_error = Some(EngineError::Execution("connection reset".to_string()));
        let mut iter = LogEntryIterator::new(cursor);

        assert!(!iter.advance());
        match iter.error() {
            Some(EngineError::Execution(msg)) => assert_eq!(msg, "connection reset"),
            other => panic!("expected cursor error, got {other:?}"),
        }
    }

    #[test]
    fn test_accessors_before_first_advance_are_zero_valued() {
        let mut iter = LogEntryIterator::new(FakeCursor::new(vec![]));

        assert_eq!(iter.labels(), "");
        assert_eq!(iter.entry(), LogEntry::default());
        assert!(iter.error().is_none());
    }

    #[test]
    fn test_close_releases_cursor() {
        let iter = LogEntryIterator::new(FakeCursor::new(vec![]));
        // close consumes the reader, so the cursor can only be released once
        assert!(iter.close().is_ok());
    }

    #[test]
    fn test_label_values_pass_through_unchanged() {
        let mut iter = LogEntryIterator::new(FakeCursor::new(vec![Ok(row(
            1000,
            "line",
            &[("http.route", "/api/v1/users")],
        ))]));

        assert!(iter.advance());
        // Keys are normalized, values pass through unchanged
        assert_eq!(iter.labels(), r#"{http_route="/api/v1/users"}"#);
    }
}
