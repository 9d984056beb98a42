//! OS event log sink.
//!
//! The event log service itself sits behind [`EventLogBackend`]; this module
//! owns the event ID sequence, entry typing and payload encoding.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::config::{EventLogConfig, LogWriterConfig};
use crate::error::{LogError, Result};
use crate::item::{LogItem, LogItemKind, origin};
use crate::log_writer::{LogReader, LogWriter};
use crate::message::build_message;
use crate::serializer::{JsonLogItemSerializer, LogItemSerializer};

/// Largest event ID the event log accepts.
pub const MAX_EVENT_ID: u16 = u16::MAX;
/// Longest message the event log accepts, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 31_839;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLogEntryType {
    Error,
    Information,
}

impl From<LogItemKind> for EventLogEntryType {
    fn from(kind: LogItemKind) -> Self {
        match kind {
            LogItemKind::Exception => EventLogEntryType::Error,
            _ => EventLogEntryType::Information,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogEntry {
    pub log_name: String,
    pub machine_name: String,
    pub source: String,
    pub message: String,
    pub entry_type: EventLogEntryType,
    pub event_id: u16,
    pub category: i16,
    pub raw_data: Vec<u8>,
    pub written_at: DateTime<Utc>,
}

/// Access to an event log service.
pub trait EventLogBackend: Send + Sync {
    fn source_exists(&self, source: &str, machine_name: &str) -> std::io::Result<bool>;
    fn create_source(
        &self,
        source: &str,
        log_name: &str,
        machine_name: &str,
    ) -> std::io::Result<()>;
    fn write_entry(&self, entry: EventLogEntry) -> std::io::Result<()>;
    fn entries(&self, log_name: &str, machine_name: &str) -> std::io::Result<Vec<EventLogEntry>>;
}

/// In-process event log.
#[derive(Default)]
pub struct MemoryEventLog {
    sources: Mutex<HashMap<String, BTreeSet<String>>>,
    entries: Mutex<Vec<EventLogEntry>>,
    read_only: bool,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects source creation the way an unprivileged process would be.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn with_source(self, source: &str, machine_name: &str) -> Self {
        self.sources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(machine_name.to_string())
            .or_default()
            .insert(source.to_string());
        self
    }
}

impl EventLogBackend for MemoryEventLog {
    fn source_exists(&self, source: &str, machine_name: &str) -> std::io::Result<bool> {
        let sources = self.sources.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(sources
            .get(machine_name)
            .is_some_and(|names| names.contains(source)))
    }

    fn create_source(
        &self,
        source: &str,
        _log_name: &str,
        machine_name: &str,
    ) -> std::io::Result<()> {
        if self.read_only {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("not allowed to create event source '{source}'"),
            ));
        }
        self.sources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(machine_name.to_string())
            .or_default()
            .insert(source.to_string());
        Ok(())
    }

    fn write_entry(&self, entry: EventLogEntry) -> std::io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
        Ok(())
    }

    fn entries(&self, log_name: &str, machine_name: &str) -> std::io::Result<Vec<EventLogEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|e| e.log_name == log_name && e.machine_name == machine_name)
            .cloned()
            .collect())
    }
}

/// Hands out event IDs 1..=65535, wrapping back to 1.
#[derive(Default)]
struct EventIdSequence {
    last: AtomicU32,
    wrap: Mutex<()>,
}

impl EventIdSequence {
    fn next(&self) -> u16 {
        let id = self.last.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(id) = u16::try_from(id) {
            return id;
        }
        let _guard = self.wrap.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.last.load(Ordering::SeqCst) > u32::from(MAX_EVENT_ID) {
            self.last.store(0, Ordering::SeqCst);
        }
        let id = self.last.fetch_add(1, Ordering::SeqCst) + 1;
        u16::try_from(id).unwrap_or(1)
    }
}

fn truncate(message: String) -> String {
    match message.char_indices().nth(MAX_MESSAGE_LENGTH) {
        Some((cut, _)) => message[..cut].to_string(),
        None => message,
    }
}

pub struct EventLogWriter {
    config: EventLogConfig,
    backend: Arc<dyn EventLogBackend>,
    serializer: Arc<dyn LogItemSerializer>,
    event_ids: EventIdSequence,
}

impl EventLogWriter {
    /// Fails if the source is missing and the config does not allow creating it.
    pub fn new(config: EventLogConfig, backend: Arc<dyn EventLogBackend>) -> Result<Self> {
        ensure_source(&config, backend.as_ref())?;
        Ok(Self {
            config,
            backend,
            serializer: Arc::new(JsonLogItemSerializer),
            event_ids: EventIdSequence::default(),
        })
    }

    pub fn with_serializer(self, serializer: Arc<dyn LogItemSerializer>) -> Self {
        Self { serializer, ..self }
    }
}

fn ensure_source(config: &EventLogConfig, backend: &dyn EventLogBackend) -> Result<()> {
    if backend.source_exists(config.source(), config.machine_name())? {
        return Ok(());
    }
    if !config.should_create_source() {
        return Err(LogError::EventSourceMissing {
            source_name: config.source().to_string(),
            log_name: config.log_name().to_string(),
        });
    }
    backend.create_source(config.source(), config.log_name(), config.machine_name())?;
    Ok(())
}

impl LogWriter for EventLogWriter {
    fn config(&self) -> &LogWriterConfig {
        self.config.base()
    }

    fn write_item(&self, item: &LogItem) -> Result<()> {
        let message = build_message(
            item,
            &self.config.base().message_properties,
            self.serializer.as_ref(),
        )?;
        let raw_data = self.serializer.serialize(item)?.into_bytes();
        self.backend.write_entry(EventLogEntry {
            log_name: self.config.log_name().to_string(),
            machine_name: self.config.machine_name().to_string(),
            source: self.config.source().to_string(),
            message: truncate(message),
            entry_type: item.kind().into(),
            event_id: self.event_ids.next(),
            category: origin::code(item.origin()),
            raw_data,
            written_at: Utc::now(),
        })?;
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "EventLogWriter; log: {}; machine: {}; source: {}; create source: {}; inclusion: {}; message: {}",
            self.config.log_name(),
            self.config.machine_name(),
            self.config.source(),
            self.config.should_create_source(),
            self.config.base().inclusion,
            self.config.base().message_properties
        )
    }
}

/// Reads back entries written by an [`EventLogWriter`] with the same config.
pub struct EventLogReader {
    config: EventLogConfig,
    backend: Arc<dyn EventLogBackend>,
    serializer: Arc<dyn LogItemSerializer>,
}

impl EventLogReader {
    pub fn new(config: EventLogConfig, backend: Arc<dyn EventLogBackend>) -> Self {
        Self {
            config,
            backend,
            serializer: Arc::new(JsonLogItemSerializer),
        }
    }

    pub fn with_serializer(self, serializer: Arc<dyn LogItemSerializer>) -> Self {
        Self { serializer, ..self }
    }
}

impl LogReader for EventLogReader {
    fn read_range(
        &self,
        _start_utc: DateTime<Utc>,
        _end_utc: DateTime<Utc>,
    ) -> Result<Vec<LogItem>> {
        Err(LogError::unsupported("range reads from the event log"))
    }

    fn read_all(&self) -> Result<Vec<LogItem>> {
        self.backend
            .entries(self.config.log_name(), self.config.machine_name())?
            .into_iter()
            .filter(|entry| entry.source == self.config.source())
            .map(|entry| {
                let text = String::from_utf8_lossy(&entry.raw_data);
                self.serializer.deserialize(&text)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::LogItemContext;

    fn config() -> EventLogConfig {
        EventLogConfig::new(LogWriterConfig::include_all())
            .with_source("logsinks-tests")
            .unwrap()
    }

    #[test]
    fn test_event_ids_wrap_without_zero() {
        let sequence = EventIdSequence::default();
        let mut previous = 0u16;
        let mut wrapped = false;
        for _ in 0..(u32::from(MAX_EVENT_ID) + 10) {
            let id = sequence.next();
            assert_ne!(id, 0);
            if id < previous {
                assert_eq!(id, 1);
                wrapped = true;
            }
            previous = id;
        }
        assert!(wrapped);
        assert_eq!(previous, 10);
    }

    #[test]
    fn test_missing_source_without_auto_create_fails() {
        let backend = Arc::new(MemoryEventLog::new());
        let err = EventLogWriter::new(config(), backend).err().unwrap();
        assert!(matches!(err, LogError::EventSourceMissing { .. }));
    }

    #[test]
    fn test_source_creation_permission_error_propagates() {
        let backend = Arc::new(MemoryEventLog::read_only());
        let err = EventLogWriter::new(config().create_source_if_missing(true), backend)
            .err()
            .unwrap();
        match err {
            LogError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_entries_round_trip_through_reader() {
        let backend = Arc::new(MemoryEventLog::new());
        let writer =
            EventLogWriter::new(config().create_source_if_missing(true), backend.clone()).unwrap();
        let info = LogItem::info(origin::MANAGED_CONFIGURATION, "loaded").unwrap();
        let failure = LogItem::new(
            LogItemContext::new(origin::UNHANDLED_EXCEPTION).unwrap(),
            LogItemKind::Exception,
            "boom",
        );
        writer.log(&info).unwrap();
        writer.log(&failure).unwrap();

        let entries = backend.entries("Application", ".").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entry_type, EventLogEntryType::Information);
        assert_eq!(entries[0].event_id, 1);
        assert_eq!(entries[0].category, 2);
        assert_eq!(entries[1].entry_type, EventLogEntryType::Error);
        assert_eq!(entries[1].event_id, 2);
        assert_eq!(entries[1].message, failure.to_string());

        let reader = EventLogReader::new(config(), backend);
        assert_eq!(reader.read_all().unwrap(), vec![info, failure]);
        assert!(matches!(
            reader.read_range(Utc::now(), Utc::now()),
            Err(LogError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let backend = Arc::new(MemoryEventLog::new().with_source("logsinks-tests", "."));
        let writer = EventLogWriter::new(config(), backend.clone()).unwrap();
        let item = LogItem::info("tests", "x".repeat(MAX_MESSAGE_LENGTH + 100)).unwrap();
        writer.log(&item).unwrap();
        let entry = &backend.entries("Application", ".").unwrap()[0];
        assert_eq!(entry.message.chars().count(), MAX_MESSAGE_LENGTH);
    }
}
