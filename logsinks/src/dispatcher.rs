use std::sync::Arc;

use logsinks_core::{LogItem, LogWriter, Result};

/// Fans every item out to all registered writers.
#[derive(Default, Clone)]
pub struct LogDispatcher {
    writers: Vec<Arc<dyn LogWriter>>,
}

impl LogDispatcher {
    pub fn new(writers: Vec<Arc<dyn LogWriter>>) -> Self {
        Self { writers }
    }

    pub fn writers(&self) -> &[Arc<dyn LogWriter>] {
        &self.writers
    }

    /// Offers `item` to every writer, even after a failure, and returns the
    /// first error encountered.
    pub fn log_item(&self, item: &LogItem) -> Result<()> {
        let mut first_error = None;
        for writer in &self.writers {
            if let Err(err) = writer.log(item) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn description(&self) -> String {
        self.writers
            .iter()
            .map(|w| w.description())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
