use std::path::PathBuf;

/// Errors raised by writers, readers and their configurations.
#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unable to read log items from {}", path.display())]
    CorruptFile {
        path: PathBuf,
        #[source]
        source: Box<LogError>,
    },

    #[error("operation not supported: {operation}")]
    Unsupported { operation: String },

    #[error("event log source '{source_name}' does not exist in log '{log_name}'")]
    EventSourceMissing {
        source_name: String,
        log_name: String,
    },
}

pub type Result<T> = std::result::Result<T, LogError>;

impl LogError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }
}

/// Rejects blank strings where a concrete value is required.
pub(crate) fn require_non_blank(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LogError::invalid_config(format!("{name} must not be blank")));
    }
    Ok(())
}
