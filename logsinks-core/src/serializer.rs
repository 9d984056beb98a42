use crate::error::Result;
use crate::item::LogItem;

/// Turns log items into text and back.
///
/// Writers that need a serialized form receive one of these at construction.
pub trait LogItemSerializer: Send + Sync {
    fn serialize(&self, item: &LogItem) -> Result<String>;
    fn deserialize(&self, text: &str) -> Result<LogItem>;
    /// Parses a whole array document, e.g. `[{...},{...}]`.
    fn deserialize_many(&self, text: &str) -> Result<Vec<LogItem>>;
}

/// Compact single-line JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLogItemSerializer;

impl LogItemSerializer for JsonLogItemSerializer {
    fn serialize(&self, item: &LogItem) -> Result<String> {
        Ok(serde_json::to_string(item)?)
    }

    fn deserialize(&self, text: &str) -> Result<LogItem> {
        Ok(serde_json::from_str(text)?)
    }

    fn deserialize_many(&self, text: &str) -> Result<Vec<LogItem>> {
        Ok(serde_json::from_str(text)?)
    }
}
