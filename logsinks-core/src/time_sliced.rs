use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::config::{LogWriterConfig, TimeSlicedFilesLogConfig};
use crate::error::{LogError, Result};
use crate::file::{append_to_file, ensure_directory};
use crate::item::LogItem;
use crate::log_writer::{LogReader, LogWriter};
use crate::message::build_message;
use crate::serializer::{JsonLogItemSerializer, LogItemSerializer};
use crate::time_slice::{LOG_FILE_EXTENSION, compute_file_path, file_name};

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Appends to one file per slice of the day. The target file is recomputed
/// on every write; there is no scheduled rollover.
pub struct TimeSlicedFilesLogWriter {
    config: TimeSlicedFilesLogConfig,
    serializer: Arc<dyn LogItemSerializer>,
    clock: Clock,
    lock: Mutex<()>,
}

impl TimeSlicedFilesLogWriter {
    pub fn new(config: TimeSlicedFilesLogConfig) -> Result<Self> {
        ensure_directory(config.directory(), config.create_directory_if_missing())?;
        Ok(Self {
            config,
            serializer: Arc::new(JsonLogItemSerializer),
            clock: Box::new(Utc::now),
            lock: Mutex::new(()),
        })
    }

    pub fn with_serializer(self, serializer: Arc<dyn LogItemSerializer>) -> Self {
        Self { serializer, ..self }
    }

    /// Replaces the wall clock used to pick the current file.
    pub fn with_clock<F>(self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            clock: Box::new(clock),
            ..self
        }
    }

    /// File the next write would go to.
    pub fn current_file_path(&self) -> PathBuf {
        compute_file_path(&self.config, (self.clock)())
    }
}

impl LogWriter for TimeSlicedFilesLogWriter {
    fn config(&self) -> &LogWriterConfig {
        self.config.base()
    }

    fn write_item(&self, item: &LogItem) -> Result<()> {
        let properties = &self.config.base().message_properties;
        let message = build_message(item, properties, self.serializer.as_ref())?;
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let path = self.current_file_path();
        // Serialized items are comma-led after the first so the file body
        // parses as a JSON array once wrapped in brackets.
        let separator = if properties.is_serialization_only()
            && fs::metadata(&path).is_ok_and(|m| m.len() > 0)
        {
            ","
        } else {
            ""
        };
        append_to_file(&path, &format!("{separator}{message}\n"))
    }

    fn description(&self) -> String {
        format!(
            "TimeSlicedFilesLogWriter; directory: {}; prefix: {}; slice: {:?}; create directory: {}; inclusion: {}; message: {}",
            self.config.directory().display(),
            self.config.file_name_prefix(),
            self.config.slice_duration(),
            self.config.create_directory_if_missing(),
            self.config.base().inclusion,
            self.config.base().message_properties
        )
    }
}

/// Reads back items written by a [`TimeSlicedFilesLogWriter`] configured for
/// serialization-only messages.
pub struct TimeSlicedFilesLogReader {
    config: TimeSlicedFilesLogConfig,
    serializer: Arc<dyn LogItemSerializer>,
}

impl TimeSlicedFilesLogReader {
    pub fn new(config: TimeSlicedFilesLogConfig) -> Self {
        Self {
            config,
            serializer: Arc::new(JsonLogItemSerializer),
        }
    }

    pub fn with_serializer(self, serializer: Arc<dyn LogItemSerializer>) -> Self {
        Self { serializer, ..self }
    }

    /// Files whose name sorts between the names of the two boundary slices.
    fn candidate_files(
        &self,
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
    ) -> Result<Vec<PathBuf>> {
        let directory = self.config.directory();
        if !directory.is_dir() {
            return Ok(Vec::new());
        }
        let prefix = self.config.file_name_prefix();
        let offsets = self.config.slice_offsets();
        let first = file_name(prefix, offsets, start_utc);
        let last = file_name(prefix, offsets, end_utc);
        let name_prefix = format!("{prefix}--");
        let suffix = format!(".{LOG_FILE_EXTENSION}");
        let mut names: Vec<String> = fs::read_dir(directory)?
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| {
                name.starts_with(&name_prefix)
                    && name.ends_with(&suffix)
                    && first.as_str() <= name.as_str()
                    && name.as_str() <= last.as_str()
            })
            .collect();
        names.sort();
        Ok(names.into_iter().map(|name| directory.join(name)).collect())
    }
}

impl LogReader for TimeSlicedFilesLogReader {
    fn read_range(
        &self,
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
    ) -> Result<Vec<LogItem>> {
        if !self.config.base().message_properties.is_serialization_only() {
            return Err(LogError::unsupported(
                "reading time-sliced files written with anything but serialization-only messages",
            ));
        }
        let mut items = Vec::new();
        for path in self.candidate_files(start_utc, end_utc)? {
            let content = fs::read_to_string(&path)?;
            let parsed = self
                .serializer
                .deserialize_many(&format!("[{content}]"))
                .map_err(|source| LogError::CorruptFile {
                    path: path.clone(),
                    source: Box::new(source),
                })?;
            items.extend(parsed.into_iter().filter(|item| {
                let ts = item.timestamp_utc();
                start_utc <= ts && ts <= end_utc
            }));
        }
        Ok(items)
    }
}
