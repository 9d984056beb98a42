use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LogError, Result, require_non_blank};
use crate::inclusion::InclusionMap;
use crate::item::{LogItem, current_process_name};
use crate::message::MessageProperties;
use crate::time_slice::slice_into_offsets_per_day;

/// Settings shared by every writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogWriterConfig {
    pub inclusion: InclusionMap,
    pub message_properties: MessageProperties,
}

impl LogWriterConfig {
    pub fn new(inclusion: InclusionMap, message_properties: MessageProperties) -> Self {
        Self {
            inclusion,
            message_properties,
        }
    }

    /// Accepts everything and renders items in their default form.
    pub fn include_all() -> Self {
        Self::new(InclusionMap::all(), MessageProperties::Default)
    }

    pub fn should_log(&self, item: &LogItem) -> bool {
        self.inclusion.should_log(item.kind(), item.origin())
    }
}

/// Console writer settings: the base map gates the writer, the two stream
/// maps decide where an admitted item is printed.
#[derive(Debug, Clone)]
pub struct ConsoleLogConfig {
    base: LogWriterConfig,
    console_out: InclusionMap,
    console_error: InclusionMap,
    colorize: bool,
}

impl ConsoleLogConfig {
    pub fn new(
        base: LogWriterConfig,
        console_out: InclusionMap,
        console_error: InclusionMap,
    ) -> Self {
        Self {
            base,
            console_out,
            console_error,
            colorize: false,
        }
    }

    /// Colors lines by item kind.
    pub fn with_colors(self) -> Self {
        Self {
            colorize: true,
            ..self
        }
    }

    pub fn base(&self) -> &LogWriterConfig {
        &self.base
    }

    pub fn console_out(&self) -> &InclusionMap {
        &self.console_out
    }

    pub fn console_error(&self) -> &InclusionMap {
        &self.console_error
    }

    pub fn colorize(&self) -> bool {
        self.colorize
    }
}

/// Single append-only file.
#[derive(Debug, Clone)]
pub struct FileLogConfig {
    base: LogWriterConfig,
    path: PathBuf,
    create_directory_if_missing: bool,
}

impl FileLogConfig {
    pub fn new<P: AsRef<Path>>(
        base: LogWriterConfig,
        path: P,
        create_directory_if_missing: bool,
    ) -> Result<Self> {
        let path = path.as_ref();
        require_non_blank(&path.to_string_lossy(), "path")?;
        Ok(Self {
            base,
            path: path.to_path_buf(),
            create_directory_if_missing,
        })
    }

    pub fn base(&self) -> &LogWriterConfig {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn create_directory_if_missing(&self) -> bool {
        self.create_directory_if_missing
    }
}

/// A directory of files, one per slice of the day.
#[derive(Debug, Clone)]
pub struct TimeSlicedFilesLogConfig {
    base: LogWriterConfig,
    directory: PathBuf,
    file_name_prefix: String,
    slice_duration: Duration,
    create_directory_if_missing: bool,
    slice_offsets: Vec<Duration>,
}

impl TimeSlicedFilesLogConfig {
    pub fn new<P: AsRef<Path>>(
        base: LogWriterConfig,
        directory: P,
        file_name_prefix: impl Into<String>,
        slice_duration: Duration,
        create_directory_if_missing: bool,
    ) -> Result<Self> {
        let directory = directory.as_ref();
        let file_name_prefix = file_name_prefix.into();
        require_non_blank(&directory.to_string_lossy(), "directory")?;
        require_non_blank(&file_name_prefix, "file name prefix")?;
        if file_name_prefix.contains(|c: char| c == '/' || c == '\\') {
            return Err(LogError::invalid_config(
                "file name prefix must not contain path separators",
            ));
        }
        let slice_offsets = slice_into_offsets_per_day(slice_duration)?;
        Ok(Self {
            base,
            directory: directory.to_path_buf(),
            file_name_prefix,
            slice_duration,
            create_directory_if_missing,
            slice_offsets,
        })
    }

    pub fn base(&self) -> &LogWriterConfig {
        &self.base
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name_prefix(&self) -> &str {
        &self.file_name_prefix
    }

    pub fn slice_duration(&self) -> Duration {
        self.slice_duration
    }

    pub fn create_directory_if_missing(&self) -> bool {
        self.create_directory_if_missing
    }

    /// Start of each slice, from midnight, in order.
    pub fn slice_offsets(&self) -> &[Duration] {
        &self.slice_offsets
    }
}

pub const DEFAULT_EVENT_LOG_NAME: &str = "Application";
pub const DEFAULT_MACHINE_NAME: &str = ".";

/// OS event log destination.
#[derive(Debug, Clone)]
pub struct EventLogConfig {
    base: LogWriterConfig,
    log_name: String,
    machine_name: String,
    source: String,
    create_source_if_missing: bool,
}

impl EventLogConfig {
    /// `Application` log on the local machine, sourced as the current process.
    pub fn new(base: LogWriterConfig) -> Self {
        Self {
            base,
            log_name: DEFAULT_EVENT_LOG_NAME.into(),
            machine_name: DEFAULT_MACHINE_NAME.into(),
            source: current_process_name().to_string(),
            create_source_if_missing: false,
        }
    }

    pub fn with_log_name(self, log_name: impl Into<String>) -> Result<Self> {
        let log_name = log_name.into();
        require_non_blank(&log_name, "log name")?;
        Ok(Self { log_name, ..self })
    }

    pub fn with_machine_name(self, machine_name: impl Into<String>) -> Result<Self> {
        let machine_name = machine_name.into();
        require_non_blank(&machine_name, "machine name")?;
        Ok(Self {
            machine_name,
            ..self
        })
    }

    pub fn with_source(self, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        require_non_blank(&source, "source")?;
        Ok(Self { source, ..self })
    }

    pub fn create_source_if_missing(self, yes: bool) -> Self {
        Self {
            create_source_if_missing: yes,
            ..self
        }
    }

    pub fn base(&self) -> &LogWriterConfig {
        &self.base
    }

    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn should_create_source(&self) -> bool {
        self.create_source_if_missing
    }
}

/// Unbounded retention marker for [`InMemoryLogConfig`].
pub const UNBOUNDED: i32 = -1;

/// Bounded in-process buffer.
#[derive(Debug, Clone)]
pub struct InMemoryLogConfig {
    base: LogWriterConfig,
    max_logged_item_count: i32,
}

impl InMemoryLogConfig {
    /// `max_logged_item_count` of -1 keeps everything.
    pub fn new(base: LogWriterConfig, max_logged_item_count: i32) -> Result<Self> {
        if max_logged_item_count < UNBOUNDED {
            return Err(LogError::invalid_config(format!(
                "max logged item count must be {UNBOUNDED} or greater, got {max_logged_item_count}"
            )));
        }
        Ok(Self {
            base,
            max_logged_item_count,
        })
    }

    pub fn base(&self) -> &LogWriterConfig {
        &self.base
    }

    pub fn max_logged_item_count(&self) -> i32 {
        self.max_logged_item_count
    }

    /// Capacity, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        usize::try_from(self.max_logged_item_count).ok()
    }
}
