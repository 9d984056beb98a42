use std::collections::VecDeque;
use std::sync::Mutex;

use crate::config::{InMemoryLogConfig, LogWriterConfig};
use crate::error::Result;
use crate::item::LogItem;
use crate::log_writer::LogWriter;

/// Keeps the most recent items in memory, oldest evicted first.
pub struct InMemoryLogWriter {
    config: InMemoryLogConfig,
    items: Mutex<VecDeque<LogItem>>,
}

impl InMemoryLogWriter {
    pub fn new(config: InMemoryLogConfig) -> Self {
        Self {
            config,
            items: Mutex::new(VecDeque::new()),
        }
    }

    fn items(&self) -> std::sync::MutexGuard<'_, VecDeque<LogItem>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the retained items in insertion order.
    pub fn logged_items(&self) -> Vec<LogItem> {
        self.items().iter().cloned().collect()
    }

    pub fn purge_all(&self) {
        self.items().clear();
    }
}

impl LogWriter for InMemoryLogWriter {
    fn config(&self) -> &LogWriterConfig {
        self.config.base()
    }

    fn write_item(&self, item: &LogItem) -> Result<()> {
        let mut items = self.items();
        items.push_back(item.clone());
        if let Some(capacity) = self.config.capacity() {
            while items.len() > capacity {
                items.pop_front();
            }
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "InMemoryLogWriter; max items: {}; inclusion: {}",
            self.config.max_logged_item_count(),
            self.config.base().inclusion
        )
    }
}
