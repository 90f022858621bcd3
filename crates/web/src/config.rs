use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use model::proximity::DEFAULT_THRESHOLD_METERS;
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_STATIC_DIR: &str = "./resources/www/";

#[derive(Debug, Error)]
#[error("invalid value `{value}` for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Minimum distance between two captures of the same station.
    pub proximity_threshold_meters: f64,
    /// Used for generated links instead of the `x-forwarded-*`/`host` headers.
    pub public_base_url: Option<String>,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            proximity_threshold_meters: DEFAULT_THRESHOLD_METERS,
            public_base_url: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Config {
    /// Reads the configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let proximity_threshold_meters: f64 = try_load(
            "PROXIMITY_THRESHOLD_METERS",
            &DEFAULT_THRESHOLD_METERS.to_string(),
        )?;
        if !(proximity_threshold_meters >= 0.0) {
            return Err(ConfigError {
                key: "PROXIMITY_THRESHOLD_METERS",
                value: proximity_threshold_meters.to_string(),
                reason: "must be a non-negative number of meters".to_owned(),
            });
        }

        Ok(Self {
            bind_address: try_load("BIND_ADDRESS", DEFAULT_BIND_ADDRESS)?,
            proximity_threshold_meters,
            public_base_url: var("PUBLIC_BASE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_owned())
                .filter(|url| !url.is_empty()),
            static_dir: try_load("STATIC_DIR", DEFAULT_STATIC_DIR)?,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        log::info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|why: T::Err| ConfigError {
        key,
        reason: why.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // the only test touching the environment, so the steps stay sequential
    #[test]
    fn threshold_is_read_from_the_environment() {
        env::remove_var("PROXIMITY_THRESHOLD_METERS");
        let config = Config::load().unwrap();
        assert_eq!(config.proximity_threshold_meters, DEFAULT_THRESHOLD_METERS);

        env::set_var("PROXIMITY_THRESHOLD_METERS", "75.5");
        assert_eq!(Config::load().unwrap().proximity_threshold_meters, 75.5);

        env::set_var("PROXIMITY_THRESHOLD_METERS", "-1");
        let error = Config::load().unwrap_err();
        assert_eq!(error.key, "PROXIMITY_THRESHOLD_METERS");

        env::set_var("PROXIMITY_THRESHOLD_METERS", "fifty");
        assert_eq!(Config::load().unwrap_err().value, "fifty");

        env::remove_var("PROXIMITY_THRESHOLD_METERS");
    }
}
