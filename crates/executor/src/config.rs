use std::path::PathBuf;
use std::time::Duration;

use onstart_core::run_mode::RunModeSet;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::Invalid {
                var: "LOG_FORMAT",
                value: s.to_string(),
                expected: "text or json",
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Executor configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Directory holding the scripts (default: `./scripts`).
    pub script_root: PathBuf,
    /// Active run modes, from comma-separated `RUN_MODES` (default: none).
    pub run_modes: RunModeSet,
    /// Time limit for one automatic run (default: `300`s).
    pub script_timeout: Duration,
    /// Time limit for one validation (default: `30`s).
    pub validation_timeout: Duration,
    /// File extension treated as a script (default: `sh`).
    pub script_extension: String,
    pub log_format: LogFormat,
}

impl ExecutorConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default     |
    /// |---------------------------|-------------|
    /// | `SCRIPT_ROOT`             | `./scripts` |
    /// | `RUN_MODES`               | *(empty)*   |
    /// | `SCRIPT_TIMEOUT_SECS`     | `300`       |
    /// | `VALIDATION_TIMEOUT_SECS` | `30`        |
    /// | `SCRIPT_EXTENSION`        | `sh`        |
    /// | `LOG_FORMAT`              | `text`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let script_root = lookup("SCRIPT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./scripts"));

        let run_modes = lookup("RUN_MODES")
            .map(|list| RunModeSet::parse(&list))
            .unwrap_or_default();

        let script_timeout = parse_secs(&lookup, "SCRIPT_TIMEOUT_SECS", 300)?;
        let validation_timeout = parse_secs(&lookup, "VALIDATION_TIMEOUT_SECS", 30)?;

        let script_extension = lookup("SCRIPT_EXTENSION")
            .map(|ext| ext.trim().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| "sh".into());

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => LogFormat::from_str(&value)?,
            None => LogFormat::Text,
        };

        Ok(Self {
            script_root,
            run_modes,
            script_timeout,
            validation_timeout,
            script_extension,
            log_format,
        })
    }
}

fn parse_secs<F>(lookup: &F, var: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(Duration::from_secs(default));
    };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            expected: "a positive number of seconds",
        }),
    }
}
