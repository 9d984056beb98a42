use std::sync::LazyLock;

use derive_from_env::FromEnv;
use log::LevelFilter;

const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;
const DEFAULT_IN_MEMORY_MAX: i32 = 1000;

/// `LOGSINKS_*` environment settings. Unset variables take the defaults
/// applied by the accessors.
#[derive(FromEnv, Default)]
#[from_env(prefix = "LOGSINKS")]
#[allow(non_snake_case)]
pub struct LogSinksConfig {
    pub LEVEL: Option<String>,
    pub IN_MEMORY_MAX: Option<i32>,
}

impl LogSinksConfig {
    /// `LOGSINKS_LEVEL`, falling back to `Info` when unset or unparsable.
    pub fn level(&self) -> LevelFilter {
        self.LEVEL
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(DEFAULT_LEVEL)
    }

    /// `LOGSINKS_IN_MEMORY_MAX`, 1000 when unset.
    pub fn in_memory_max(&self) -> i32 {
        self.IN_MEMORY_MAX.unwrap_or(DEFAULT_IN_MEMORY_MAX)
    }
}

pub static LOGSINKS_CONFIG: LazyLock<LogSinksConfig> = LazyLock::new(|| {
    LogSinksConfig::from_env().unwrap_or_else(|err| {
        eprintln!("logsinks: ignoring environment settings: {err}");
        LogSinksConfig::default()
    })
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_settings_take_defaults() {
        let config = LogSinksConfig::default();
        assert_eq!(config.level(), LevelFilter::Info);
        assert_eq!(config.in_memory_max(), 1000);
    }

    #[test]
    fn test_explicit_settings_win() {
        let config = LogSinksConfig {
            LEVEL: Some("debug".into()),
            IN_MEMORY_MAX: Some(-1),
        };
        assert_eq!(config.level(), LevelFilter::Debug);
        assert_eq!(config.in_memory_max(), -1);

        let garbled = LogSinksConfig {
            LEVEL: Some("loud".into()),
            IN_MEMORY_MAX: None,
        };
        assert_eq!(garbled.level(), LevelFilter::Info);
    }
}
