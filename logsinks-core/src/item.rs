use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LogError, Result};

/// Well-known origins. Any other string is a valid origin too.
pub mod origin {
    pub const UNKNOWN: &str = "Unknown";
    pub const UNHANDLED_EXCEPTION: &str = "Unhandled Exception";
    pub const MANAGED_CONFIGURATION: &str = "Managed Configuration";
    pub const ENTRY_POSTED: &str = "Entry Posted";
    pub const INTERNAL_ERRORS: &str = "Internal Errors";
    pub const LOG_FACADE: &str = "Log Facade";

    /// Stable numeric code of a well-known origin, 0 for anything else.
    pub fn code(origin: &str) -> i16 {
        match origin {
            UNHANDLED_EXCEPTION => 1,
            MANAGED_CONFIGURATION => 2,
            ENTRY_POSTED => 3,
            INTERNAL_ERRORS => 4,
            LOG_FACADE => 5,
            _ => 0,
        }
    }
}

/// Coarse classification of a log item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogItemKind {
    Unknown,
    Info,
    Object,
    Exception,
}

impl LogItemKind {
    pub const ALL: [LogItemKind; 4] = [
        LogItemKind::Unknown,
        LogItemKind::Info,
        LogItemKind::Object,
        LogItemKind::Exception,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogItemKind::Unknown => "Unknown",
            LogItemKind::Info => "Info",
            LogItemKind::Object => "Object",
            LogItemKind::Exception => "Exception",
        }
    }
}

impl fmt::Display for LogItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders an instant as an ISO-8601 UTC string with a `Z` suffix.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

static PROCESS_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unknown".into())
});

/// Name of the running executable, used as a default for process metadata.
/// Resolved once per process.
pub fn current_process_name() -> &'static str {
    PROCESS_NAME.as_str()
}

/// When and where a log item was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogItemContext {
    timestamp_utc: DateTime<Utc>,
    origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    machine_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    process_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thread_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stack_trace: Option<String>,
}

impl LogItemContext {
    /// Context stamped with the current time, process and thread.
    pub fn new(origin: impl Into<String>) -> Result<Self> {
        let mut context = Self::at(Utc::now(), origin)?;
        context.process_name = Some(current_process_name().to_string());
        context.thread_name = std::thread::current().name().map(String::from);
        Ok(context)
    }

    /// Context with an explicit timestamp and no ambient metadata.
    pub fn at(timestamp_utc: DateTime<Utc>, origin: impl Into<String>) -> Result<Self> {
        let origin = origin.into();
        if origin.trim().is_empty() {
            return Err(LogError::InvalidArgument {
                message: "origin must not be blank".into(),
            });
        }
        Ok(Self {
            timestamp_utc,
            origin,
            machine_name: None,
            process_name: None,
            thread_name: None,
            stack_trace: None,
        })
    }

    pub fn with_machine_name(self, machine_name: impl Into<String>) -> Self {
        Self {
            machine_name: Some(machine_name.into()),
            ..self
        }
    }

    pub fn with_process_name(self, process_name: impl Into<String>) -> Self {
        Self {
            process_name: Some(process_name.into()),
            ..self
        }
    }

    pub fn with_stack_trace(self, stack_trace: impl Into<String>) -> Self {
        Self {
            stack_trace: Some(stack_trace.into()),
            ..self
        }
    }

    pub fn timestamp_utc(&self) -> DateTime<Utc> {
        self.timestamp_utc
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn machine_name(&self) -> Option<&str> {
        self.machine_name.as_deref()
    }

    pub fn process_name(&self) -> Option<&str> {
        self.process_name.as_deref()
    }

    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }
}

/// Links a log item to other items or to an outside operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    pub correlation_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Correlation {
    pub fn new(details: Option<&str>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            details: details.map(String::from),
        }
    }
}

/// A single log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogItem {
    context: LogItemContext,
    kind: LogItemKind,
    message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    correlations: Vec<Correlation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<serde_json::Value>,
}

impl LogItem {
    pub fn new(context: LogItemContext, kind: LogItemKind, message: impl Into<String>) -> Self {
        Self {
            context,
            kind,
            message: message.into(),
            correlations: Vec::new(),
            subject: None,
        }
    }

    /// Shorthand for an `Info` item stamped now.
    pub fn info(origin: impl Into<String>, message: impl Into<String>) -> Result<Self> {
        Ok(Self::new(
            LogItemContext::new(origin)?,
            LogItemKind::Info,
            message,
        ))
    }

    pub fn with_correlation(mut self, correlation: Correlation) -> Self {
        self.correlations.push(correlation);
        self
    }

    /// Attaches a structured payload describing what was logged.
    pub fn with_subject(self, subject: serde_json::Value) -> Self {
        Self {
            subject: Some(subject),
            ..self
        }
    }

    pub fn context(&self) -> &LogItemContext {
        &self.context
    }

    pub fn kind(&self) -> LogItemKind {
        self.kind
    }

    pub fn origin(&self) -> &str {
        self.context.origin()
    }

    pub fn timestamp_utc(&self) -> DateTime<Utc> {
        self.context.timestamp_utc()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn correlations(&self) -> &[Correlation] {
        &self.correlations
    }

    pub fn subject(&self) -> Option<&serde_json::Value> {
        self.subject.as_ref()
    }
}

impl fmt::Display for LogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            format_timestamp(&self.context.timestamp_utc),
            self.context.origin,
            self.kind,
            self.message
        )
    }
}
