use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config::{FileLogConfig, LogWriterConfig};
use crate::error::Result;
use crate::item::LogItem;
use crate::log_writer::LogWriter;
use crate::message::build_message;
use crate::serializer::{JsonLogItemSerializer, LogItemSerializer};

/// Appends `contents` to `path`, creating the file if needed. The handle is
/// closed before returning.
pub(crate) fn append_to_file(path: &Path, contents: &str) -> Result<()> {
    let mut file = File::options().create(true).append(true).open(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(())
}

pub(crate) fn ensure_directory(directory: &Path, create: bool) -> Result<()> {
    if create && !directory.as_os_str().is_empty() {
        fs::create_dir_all(directory)?;
    }
    Ok(())
}

/// One text line per item, appended to a single file.
pub struct FileLogWriter {
    config: FileLogConfig,
    serializer: Arc<dyn LogItemSerializer>,
    lock: Mutex<()>,
}

impl FileLogWriter {
    pub fn new(config: FileLogConfig) -> Result<Self> {
        if let Some(parent) = config.path().parent() {
            ensure_directory(parent, config.create_directory_if_missing())?;
        }
        Ok(Self {
            config,
            serializer: Arc::new(JsonLogItemSerializer),
            lock: Mutex::new(()),
        })
    }

    pub fn with_serializer(self, serializer: Arc<dyn LogItemSerializer>) -> Self {
        Self { serializer, ..self }
    }

    pub fn path(&self) -> &Path {
        self.config.path()
    }
}

impl LogWriter for FileLogWriter {
    fn config(&self) -> &LogWriterConfig {
        self.config.base()
    }

    fn write_item(&self, item: &LogItem) -> Result<()> {
        let message = build_message(
            item,
            &self.config.base().message_properties,
            self.serializer.as_ref(),
        )?;
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        append_to_file(self.config.path(), &format!("{message}\n"))
    }

    fn description(&self) -> String {
        format!(
            "FileLogWriter; path: {}; create directory: {}; inclusion: {}; message: {}",
            self.config.path().display(),
            self.config.create_directory_if_missing(),
            self.config.base().inclusion,
            self.config.base().message_properties
        )
    }
}
