//! # logsinks
//! Pluggable log writers (console, file, time-sliced files, in-memory, event
//! log) behind the `log` crate's macros.
//!
//! ## Usage
//! ```rust
//! use logsinks::logger_config;
//!
//! let dispatcher = logger_config()
//!     .with_stdout()
//!     .init_global()
//!     .expect("another logger is already installed");
//! log::info!("Hello, world!");
//! assert_eq!(dispatcher.writers().len(), 1);
//! ```
//!
//! ## Time-sliced files
//! One file per slice of the day, named
//! `{prefix}--{yyyy-MM-dd}--{HHmm}Z-{HHmm}Z.log`. Writers configured for
//! serialization-only messages can be read back with
//! [`TimeSlicedFilesLogReader`].
//!
//! ```rust
//! use std::time::Duration;
//! use logsinks::{
//!     LogItem, LogReader, LogWriter, LogWriterConfig, InclusionMap, MessageProperties,
//!     TimeSlicedFilesLogConfig, TimeSlicedFilesLogReader, TimeSlicedFilesLogWriter,
//! };
//!
//! let dir = std::env::temp_dir().join("logsinks_doc_time_sliced");
//! let _ = std::fs::remove_dir_all(&dir);
//! let config = TimeSlicedFilesLogConfig::new(
//!     LogWriterConfig::new(InclusionMap::all(), MessageProperties::serialization_only()),
//!     &dir,
//!     "app",
//!     Duration::from_secs(3600),
//!     true,
//! )
//! .unwrap();
//! let writer = TimeSlicedFilesLogWriter::new(config.clone()).unwrap();
//! writer.log(&LogItem::info("docs", "Hello, file!").unwrap()).unwrap();
//! let items = TimeSlicedFilesLogReader::new(config).read_all().unwrap();
//! assert_eq!(items[0].message(), "Hello, file!");
//! ```

mod config;
mod dispatcher;

use std::sync::{Arc, Mutex, RwLock};

use log::{Level, LevelFilter, Log};

pub use config::{LOGSINKS_CONFIG, LogSinksConfig};
pub use dispatcher::LogDispatcher;
pub use logsinks_core::*;

/// Dispatcher the `log` macros write to once [`ConfigBuilder::init_global`] ran.
static GLOBAL_DISPATCHER: RwLock<Option<Arc<LogDispatcher>>> = RwLock::new(None);
static BRIDGE_INSTALLED: Mutex<bool> = Mutex::new(false);
static BRIDGE: LogBridge = LogBridge;

/// Turns `log` records into log items for the global dispatcher.
struct LogBridge;

impl LogBridge {
    fn to_item(record: &log::Record) -> logsinks_core::Result<LogItem> {
        let target = record.target();
        let item_origin = if target.trim().is_empty() {
            origin::LOG_FACADE
        } else {
            target
        };
        let kind = match record.level() {
            Level::Error => LogItemKind::Exception,
            _ => LogItemKind::Info,
        };
        Ok(LogItem::new(
            LogItemContext::new(item_origin)?,
            kind,
            record.args().to_string(),
        ))
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let dispatcher = match GLOBAL_DISPATCHER.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let Some(dispatcher) = dispatcher else {
            return;
        };
        let result = LogBridge::to_item(record).and_then(|item| dispatcher.log_item(&item));
        if let Err(err) = result {
            eprintln!("logsinks: unable to write log record: {err}");
        }
    }

    fn flush(&self) {}
}

fn install_bridge() -> std::result::Result<(), log::SetLoggerError> {
    let mut installed = BRIDGE_INSTALLED
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if !*installed {
        log::set_logger(&BRIDGE)?;
        *installed = true;
    }
    Ok(())
}

/// Builder for the set of writers behind the `log` macros.
pub struct ConfigBuilder {
    writers: Vec<Arc<dyn LogWriter>>,
    level: LevelFilter,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            writers: Vec::new(),
            level: LOGSINKS_CONFIG.level(),
        }
    }
}

impl ConfigBuilder {
    /// Adds an already constructed writer.
    pub fn with_writer(mut self, writer: Arc<dyn LogWriter>) -> Self {
        self.writers.push(writer);
        self
    }

    /// Console writer: exceptions to stderr, everything else to stdout.
    pub fn with_stdout(self) -> Self {
        let out = LogItemKind::ALL
            .into_iter()
            .filter(|kind| *kind != LogItemKind::Exception)
            .fold(InclusionMap::none(), |map, kind| {
                map.with_kind(kind, OriginFilter::All)
            });
        let err = InclusionMap::none().with_kind(LogItemKind::Exception, OriginFilter::All);
        self.with_console(ConsoleLogConfig::new(
            LogWriterConfig::include_all(),
            out,
            err,
        ))
    }

    pub fn with_console(self, config: ConsoleLogConfig) -> Self {
        self.with_writer(Arc::new(ConsoleLogWriter::new(config)))
    }

    pub fn with_file(self, config: FileLogConfig) -> logsinks_core::Result<Self> {
        Ok(self.with_writer(Arc::new(FileLogWriter::new(config)?)))
    }

    pub fn with_time_sliced_files(
        self,
        config: TimeSlicedFilesLogConfig,
    ) -> logsinks_core::Result<Self> {
        Ok(self.with_writer(Arc::new(TimeSlicedFilesLogWriter::new(config)?)))
    }

    /// Adds an in-memory writer and hands back its handle, the only way to
    /// reach [`InMemoryLogWriter::logged_items`] once the builder is consumed.
    pub fn with_in_memory(self, config: InMemoryLogConfig) -> (Self, Arc<InMemoryLogWriter>) {
        let writer = Arc::new(InMemoryLogWriter::new(config));
        (self.with_writer(writer.clone()), writer)
    }

    /// Sets the most verbose level forwarded by the `log` bridge.
    pub fn with_level(self, level: LevelFilter) -> Self {
        Self { level, ..self }
    }

    pub fn build(self) -> LogDispatcher {
        LogDispatcher::new(self.writers)
    }

    /// Routes the `log` macros to the configured writers, replacing any
    /// dispatcher installed by an earlier call.
    pub fn init_global(self) -> std::result::Result<Arc<LogDispatcher>, log::SetLoggerError> {
        install_bridge()?;
        let level = self.level;
        let dispatcher = Arc::new(self.build());
        match GLOBAL_DISPATCHER.write() {
            Ok(mut guard) => *guard = Some(Arc::clone(&dispatcher)),
            Err(poisoned) => *poisoned.into_inner() = Some(Arc::clone(&dispatcher)),
        }
        log::set_max_level(level);
        Ok(dispatcher)
    }
}

/// Returns a default ConfigBuilder for configuring the writers.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}

/// In-memory writer accepting everything, sized by `LOGSINKS_IN_MEMORY_MAX`.
pub fn in_memory_writer() -> logsinks_core::Result<Arc<InMemoryLogWriter>> {
    let config = InMemoryLogConfig::new(
        LogWriterConfig::include_all(),
        LOGSINKS_CONFIG.in_memory_max(),
    )?;
    Ok(Arc::new(InMemoryLogWriter::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_item(level: Level, target: &str) -> LogItem {
        LogBridge::to_item(
            &log::Record::builder()
                .args(format_args!("hello"))
                .level(level)
                .target(target)
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_levels_map_to_kinds() {
        assert_eq!(record_item(Level::Error, "app").kind(), LogItemKind::Exception);
        assert_eq!(record_item(Level::Warn, "app").kind(), LogItemKind::Info);
        assert_eq!(record_item(Level::Info, "app").origin(), "app");
        assert_eq!(record_item(Level::Info, "").origin(), origin::LOG_FACADE);
        assert_eq!(record_item(Level::Info, "app").message(), "hello");
    }

    #[test]
    fn test_builder_collects_writers() {
        let (builder, memory) = logger_config()
            .with_stdout()
            .with_writer(in_memory_writer().unwrap())
            .with_in_memory(InMemoryLogConfig::new(LogWriterConfig::include_all(), 5).unwrap());
        let dispatcher = builder.build();
        assert_eq!(dispatcher.writers().len(), 3);

        dispatcher
            .log_item(&LogItem::info("tests", "kept").unwrap())
            .unwrap();
        let items = memory.logged_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].message(), "kept");
        memory.purge_all();
        assert!(memory.logged_items().is_empty());
    }
}
