//! Environment configuration (`.env` supported).
//!
//! - `CTFIT_LOG`: log level (`error`, `warn`, `info`, `debug`, `trace`), default `info`
//! - `CTFIT_SEED`: default seed for synthetic trees, default `42`

use simplelog::LevelFilter;

use crate::error::AppError;

pub const ENV_LOG: &str = "CTFIT_LOG";
pub const ENV_SEED: &str = "CTFIT_SEED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    pub log_level: LevelFilter,
    pub seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Info,
            seed: 42,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::var(ENV_LOG).ok().as_deref(), std::env::var(ENV_SEED).ok().as_deref())
    }

    /// Build from raw variable values; `None` keeps the default.
    pub fn from_vars(log: Option<&str>, seed: Option<&str>) -> Result<Self, AppError> {
        let mut config = Self::default();
        if let Some(raw) = log {
            config.log_level = parse_level(raw)?;
        }
        if let Some(raw) = seed {
            config.seed = raw
                .trim()
                .parse()
                .map_err(|_| AppError::new(2, format!("Invalid {ENV_SEED}={raw:?} (expected an unsigned integer).")))?;
        }
        Ok(config)
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        _ => Err(AppError::new(
            2,
            format!("Invalid {ENV_LOG}={raw:?} (expected error, warn, info, debug or trace)."),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        assert_eq!(AppConfig::from_vars(None, None).unwrap(), AppConfig::default());
    }

    #[test]
    fn parses_level_and_seed() {
        let config = AppConfig::from_vars(Some(" DEBUG "), Some("7")).unwrap();
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(AppConfig::from_vars(Some("loud"), None).unwrap_err().exit_code(), 2);
        assert_eq!(AppConfig::from_vars(None, Some("-1")).unwrap_err().exit_code(), 2);
    }
}
