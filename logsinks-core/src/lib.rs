//! # logsinks-core
//! Log writers sharing one configuration and filtering contract: console,
//! single file, time-sliced files, in-memory buffer and event log.

mod config;
mod console;
mod error;
mod event_log;
mod file;
mod in_memory;
mod inclusion;
mod item;
mod log_writer;
mod message;
mod serializer;
mod time_slice;
mod time_sliced;

pub use config::{
    ConsoleLogConfig, DEFAULT_EVENT_LOG_NAME, DEFAULT_MACHINE_NAME, EventLogConfig, FileLogConfig,
    InMemoryLogConfig, LogWriterConfig, TimeSlicedFilesLogConfig, UNBOUNDED,
};
pub use console::ConsoleLogWriter;
pub use error::{LogError, Result};
pub use event_log::{
    EventLogBackend, EventLogEntry, EventLogEntryType, EventLogReader, EventLogWriter,
    MAX_EVENT_ID, MAX_MESSAGE_LENGTH, MemoryEventLog,
};
pub use file::FileLogWriter;
pub use in_memory::InMemoryLogWriter;
pub use inclusion::{InclusionMap, OriginFilter};
pub use item::{
    Correlation, LogItem, LogItemContext, LogItemKind, current_process_name, format_timestamp,
    origin,
};
pub use log_writer::{LogReader, LogWriter, max_instant, min_instant};
pub use message::{MessageProperties, MessageProperty, build_message};
pub use serializer::{JsonLogItemSerializer, LogItemSerializer};
pub use time_slice::{
    LOG_FILE_EXTENSION, compute_file_path, file_name, find_offset_range,
    find_offset_range_for_time_of_day, slice_into_offsets_per_day,
};
pub use time_sliced::{TimeSlicedFilesLogReader, TimeSlicedFilesLogWriter};
