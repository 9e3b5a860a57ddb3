use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use devwatch_core::{Cursor, ExpectedThresholds};
use devwatch_events::{EmailConfig, RedisConfig};

use crate::dispatcher::DispatchConfig;
use crate::error::ConfigError;
use crate::poller::PollConfig;

/// Default path of the expected-thresholds file.
const DEFAULT_THRESHOLDS_PATH: &str = "config.json";

/// Monitor configuration loaded from environment variables.
///
/// Everything here is a load-time constant for the life of the process.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Pool size (default: `5`).
    pub db_max_connections: u32,
    /// Apply the bundled migrations on startup (default: `false`).
    pub run_migrations: bool,
    pub redis: RedisConfig,
    pub email: EmailConfig,
    /// Expected value per metric slot.
    pub thresholds: ExpectedThresholds,
    pub poll: PollConfig,
    pub dispatch: DispatchConfig,
    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Required | Default                    |
    /// |-----------------------|----------|----------------------------|
    /// | `DATABASE_URL`        | yes      | —                          |
    /// | `DB_MAX_CONNECTIONS`  | no       | `5`                        |
    /// | `DB_RUN_MIGRATIONS`   | no       | `false`                    |
    /// | `REDIS_URL`           | yes      | —                          |
    /// | `SMTP_HOST`           | yes      | — (see [`EmailConfig`])    |
    /// | `ALERT_RECIPIENT`     | yes      | —                          |
    /// | `NOTIFY_MAX_ATTEMPTS` | no       | `3`                        |
    /// | `THRESHOLDS_PATH`     | no       | `config.json`              |
    /// | `POLL_INTERVAL_SECS`  | no       | `5`                        |
    /// | `FETCH_TIMEOUT_SECS`  | no       | `30`                       |
    /// | `SINK_TIMEOUT_SECS`   | no       | `10`                       |
    /// | `POLL_START_AFTER_ID` | no       | unset: replay whole table  |
    /// | `LOG_FORMAT`          | no       | `text` (`json` supported)  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `env`.
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {

        let database_url = required("DATABASE_URL", env("DATABASE_URL"))?;
        let db_max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            env("DB_MAX_CONNECTIONS"),
            devwatch_db::DEFAULT_MAX_CONNECTIONS,
        )?;
        let run_migrations = parse_or("DB_RUN_MIGRATIONS", env("DB_RUN_MIGRATIONS"), false)?;

        let redis = RedisConfig::from_lookup(&env).ok_or(ConfigError::Missing("REDIS_URL"))?;
        let email = EmailConfig::from_lookup(&env).ok_or(ConfigError::Missing("SMTP_HOST"))?;

        let thresholds_path = env("THRESHOLDS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_THRESHOLDS_PATH));
        let thresholds = load_thresholds(&thresholds_path)?;

        let poll_defaults = PollConfig::default();
        let start = match env("POLL_START_AFTER_ID") {
            Some(raw) => {
                let id = parse("POLL_START_AFTER_ID", &raw)?;
                Cursor::after(id).map_err(|e| ConfigError::Invalid {
                    var: "POLL_START_AFTER_ID",
                    value: raw,
                    reason: e.to_string(),
                })?
            }
            None => Cursor::start(),
        };
        let poll = PollConfig {
            interval: secs_or("POLL_INTERVAL_SECS", env("POLL_INTERVAL_SECS"), poll_defaults.interval)?,
            fetch_timeout: secs_or(
                "FETCH_TIMEOUT_SECS",
                env("FETCH_TIMEOUT_SECS"),
                poll_defaults.fetch_timeout,
            )?,
            start,
        };

        let dispatch_defaults = DispatchConfig::default();
        let max_attempts: u32 = parse_or(
            "NOTIFY_MAX_ATTEMPTS",
            env("NOTIFY_MAX_ATTEMPTS"),
            dispatch_defaults.max_attempts,
        )?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "NOTIFY_MAX_ATTEMPTS",
                value: "0".into(),
                reason: "at least one attempt is required".into(),
            });
        }
        let dispatch = DispatchConfig {
            recipient: required("ALERT_RECIPIENT", env("ALERT_RECIPIENT"))?,
            max_attempts,
            sink_timeout: secs_or(
                "SINK_TIMEOUT_SECS",
                env("SINK_TIMEOUT_SECS"),
                dispatch_defaults.sink_timeout,
            )?,
        };

        let json_logs = env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        Ok(Self {
            database_url,
            db_max_connections,
            run_migrations,
            redis,
            email,
            thresholds,
            poll,
            dispatch,
            json_logs,
        })
    }
}

/// Read the expected-thresholds JSON file (`{"metric1": .., "metric5": ..}`).
pub fn load_thresholds(path: &Path) -> Result<ExpectedThresholds, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ThresholdsRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::ThresholdsParse {
        path: path.to_path_buf(),
        source,
    })
}

fn required(var: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => parse(var, &raw),
        None => Ok(default),
    }
}

/// Whole seconds, strictly positive.
fn secs_or(var: &'static str, raw: Option<String>, default: Duration) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let secs: u64 = parse(var, &raw)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
