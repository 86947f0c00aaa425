use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::error::config::ConfigError;

static DATABASE_FILE: &str = "starsystems.sqlite";
static TEST_DATABASE_FILE: &str = "starsystems-test.sqlite";

/// Default sliding expiration of cached records.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
/// Default age past which a stored record no longer counts as fresh.
pub const DEFAULT_STALENESS_THRESHOLD: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 10;

pub struct Config {
    pub data_dir: PathBuf,
    pub test_mode: bool,
    pub provider: ProviderConfig,
}

/// Tunables for [`StarSystemProvider`](crate::service::provider::StarSystemProvider).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    pub cache_ttl: Duration,
    pub staleness_threshold: Duration,
    pub max_concurrent_fetches: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            staleness_threshold: DEFAULT_STALENESS_THRESHOLD,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = std::env::var("BEACON_DATA_DIR")
            .map_err(|_| ConfigError::MissingEnvVar("BEACON_DATA_DIR".to_string()))?;

        let defaults = ProviderConfig::default();
        let cache_ttl_secs =
            optional_env("BEACON_CACHE_TTL_SECS")?.unwrap_or(defaults.cache_ttl.as_secs());
        let staleness_secs = optional_env("BEACON_STALENESS_SECS")?
            .unwrap_or(defaults.staleness_threshold.as_secs());
        let max_concurrent_fetches = optional_env("BEACON_MAX_CONCURRENT_FETCHES")?
            .unwrap_or(defaults.max_concurrent_fetches);

        if max_concurrent_fetches == 0 {
            return Err(ConfigError::InvalidEnvValue {
                var: "BEACON_MAX_CONCURRENT_FETCHES".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            test_mode: optional_env("BEACON_TEST_MODE")?.unwrap_or(false),
            provider: ProviderConfig {
                cache_ttl: Duration::from_secs(cache_ttl_secs),
                staleness_threshold: Duration::from_secs(staleness_secs),
                max_concurrent_fetches,
            },
        })
    }

    /// Database file for the current mode; test mode keeps its own isolated file.
    pub fn database_path(&self) -> PathBuf {
        let file = if self.test_mode {
            TEST_DATABASE_FILE
        } else {
            DATABASE_FILE
        };

        self.data_dir.join(file)
    }
}

fn optional_env<T>(var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidEnvValue {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
