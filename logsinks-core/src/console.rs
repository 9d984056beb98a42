use std::io::Write;
use std::sync::{Arc, Mutex};

use colored::Colorize;

use crate::config::{ConsoleLogConfig, LogWriterConfig};
use crate::error::Result;
use crate::item::{LogItem, LogItemKind};
use crate::log_writer::LogWriter;
use crate::message::build_message;
use crate::serializer::{JsonLogItemSerializer, LogItemSerializer};

type Stream = Mutex<Box<dyn Write + Send>>;

/// Prints items to stdout and/or stderr.
pub struct ConsoleLogWriter {
    config: ConsoleLogConfig,
    serializer: Arc<dyn LogItemSerializer>,
    out: Stream,
    err: Stream,
}

impl ConsoleLogWriter {
    pub fn new(config: ConsoleLogConfig) -> Self {
        Self::with_streams(
            config,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// Writes to the given streams instead of the process' standard streams.
    pub fn with_streams(
        config: ConsoleLogConfig,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            config,
            serializer: Arc::new(JsonLogItemSerializer),
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    pub fn with_serializer(self, serializer: Arc<dyn LogItemSerializer>) -> Self {
        Self { serializer, ..self }
    }

    fn paint(&self, line: String, kind: LogItemKind) -> String {
        if !self.config.colorize() {
            return line;
        }
        match kind {
            LogItemKind::Exception => line.as_str().red().to_string(),
            LogItemKind::Info => line.as_str().green().to_string(),
            LogItemKind::Object => line.as_str().blue().to_string(),
            LogItemKind::Unknown => line.as_str().purple().to_string(),
        }
    }
}

fn write_line(stream: &Stream, line: &str) -> Result<()> {
    let mut stream = stream.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    writeln!(stream, "{line}")?;
    stream.flush()?;
    Ok(())
}

impl LogWriter for ConsoleLogWriter {
    fn config(&self) -> &LogWriterConfig {
        self.config.base()
    }

    fn write_item(&self, item: &LogItem) -> Result<()> {
        let to_out = self.config.console_out().should_log(item.kind(), item.origin());
        let to_err = self.config.console_error().should_log(item.kind(), item.origin());
        if !to_out && !to_err {
            return Ok(());
        }
        let message = build_message(
            item,
            &self.config.base().message_properties,
            self.serializer.as_ref(),
        )?;
        let line = self.paint(message, item.kind());
        if to_out {
            write_line(&self.out, &line)?;
        }
        if to_err {
            write_line(&self.err, &line)?;
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "ConsoleLogWriter; inclusion: {}; console out: {}; console error: {}; message: {}",
            self.config.base().inclusion,
            self.config.console_out(),
            self.config.console_error(),
            self.config.base().message_properties
        )
    }
}
