use chrono::{DateTime, Utc};

use crate::config::LogWriterConfig;
use crate::error::Result;
use crate::item::LogItem;

/// A destination for log items.
///
/// Implementors only provide [`LogWriter::write_item`]; callers go through
/// [`LogWriter::log`], which applies the writer's inclusion map first.
pub trait LogWriter: Send + Sync {
    /// Settings shared by every writer.
    fn config(&self) -> &LogWriterConfig;

    /// Sink-specific write of an item that passed the inclusion map.
    fn write_item(&self, item: &LogItem) -> Result<()>;

    /// Human readable summary of the writer and its settings.
    fn description(&self) -> String;

    /// Writes `item` unless the inclusion map excludes it. Exclusion is not an error.
    fn log(&self, item: &LogItem) -> Result<()> {
        if !self.config().should_log(item) {
            return Ok(());
        }
        self.write_item(item)
    }
}

/// Earliest instant a reader is asked about by [`LogReader::read_all`].
pub fn min_instant() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(-62_135_596_800, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Latest instant a reader is asked about by [`LogReader::read_all`].
pub fn max_instant() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(253_402_300_799, 999_999_999)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Reads back what a writer produced.
pub trait LogReader {
    /// Items whose timestamp lies in `[start_utc, end_utc]`.
    fn read_range(&self, start_utc: DateTime<Utc>, end_utc: DateTime<Utc>) -> Result<Vec<LogItem>>;

    fn read_all(&self) -> Result<Vec<LogItem>> {
        self.read_range(min_instant(), max_instant())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::inclusion::{InclusionMap, OriginFilter};
    use crate::item::LogItemKind;

    struct Recording {
        config: LogWriterConfig,
        written: Mutex<Vec<String>>,
    }

    impl LogWriter for Recording {
        fn config(&self) -> &LogWriterConfig {
            &self.config
        }

        fn write_item(&self, item: &LogItem) -> Result<()> {
            self.written.lock().unwrap().push(item.message().to_string());
            Ok(())
        }

        fn description(&self) -> String {
            "Recording".into()
        }
    }

    #[test]
    fn test_log_filters_before_writing() {
        let writer = Recording {
            config: LogWriterConfig {
                inclusion: InclusionMap::none()
                    .with_kind(LogItemKind::Info, OriginFilter::only(["kept"])),
                ..Default::default()
            },
            written: Mutex::new(Vec::new()),
        };
        writer.log(&LogItem::info("kept", "one").unwrap()).unwrap();
        writer.log(&LogItem::info("dropped", "two").unwrap()).unwrap();
        assert_eq!(*writer.written.lock().unwrap(), vec!["one".to_string()]);
    }

    #[test]
    fn test_instant_bounds() {
        assert_eq!(min_instant().to_rfc3339(), "0001-01-01T00:00:00+00:00");
        assert!(max_instant().to_rfc3339().starts_with("9999-12-31T23:59:59"));
    }
}
