use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use crate::{
    constants::{
        BCRYPT_MIN_COST, DEFAULT_BIND_ADDR, DEFAULT_COST_MARGIN, DEFAULT_MAX_COST,
        DEFAULT_MIN_COST, DEFAULT_MIN_HASH_TIME, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SEED_COST,
    },
    error::ConfigError,
};

/// Calibration knobs for [`crate::hasher::AdaptiveHasher`].
#[derive(Debug, Clone, PartialEq)]
pub struct HasherConfig {
    /// Wall-clock time a hash must take before it is handed out.
    pub min_hash_time: Duration,
    /// Cost floor.
    pub min_cost: u32,
    /// Cost the hasher starts probing with.
    pub seed_cost: u32,
    /// Cost ceiling. Calibration never goes past it.
    pub max_cost: u32,
    /// Multiplier applied to the target time when extrapolating.
    pub margin: f64,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            min_hash_time: DEFAULT_MIN_HASH_TIME,
            min_cost: DEFAULT_MIN_COST,
            seed_cost: DEFAULT_SEED_COST,
            max_cost: DEFAULT_MAX_COST,
            margin: DEFAULT_COST_MARGIN,
        }
    }
}

impl HasherConfig {
    /// Reads `MIN_HASH_TIME_MS`, `MIN_COST`, `SEED_COST`, `MAX_COST` and `COST_MARGIN`,
    /// falling back to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            min_hash_time: Duration::from_millis(parse_var(
                &lookup,
                "MIN_HASH_TIME_MS",
                defaults.min_hash_time.as_millis() as u64,
            )?),
            min_cost: parse_var(&lookup, "MIN_COST", defaults.min_cost)?,
            seed_cost: parse_var(&lookup, "SEED_COST", defaults.seed_cost)?,
            max_cost: parse_var(&lookup, "MAX_COST", defaults.max_cost)?,
            margin: parse_var(&lookup, "COST_MARGIN", defaults.margin)?,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_cost("MAX_COST", self.max_cost, BCRYPT_MIN_COST, DEFAULT_MAX_COST)?;
        check_cost("MIN_COST", self.min_cost, BCRYPT_MIN_COST, self.max_cost)?;
        check_cost("SEED_COST", self.seed_cost, BCRYPT_MIN_COST, self.max_cost)?;

        if self.min_hash_time.is_zero() {
            return Err(ConfigError::ZeroHashTime);
        }

        if !self.margin.is_finite() || self.margin < 1.0 {
            return Err(ConfigError::InvalidMargin(self.margin));
        }

        Ok(())
    }
}

/// Settings for the HTTP service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    pub debug: bool,
    pub hasher: HasherConfig,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `REQUEST_TIMEOUT_SECS`, `DEBUG` and the hasher variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default_bind_addr = SocketAddr::from_str(DEFAULT_BIND_ADDR)
            .map_err(|_| ConfigError::InvalidVar {
                name: "BIND_ADDR",
                value: DEFAULT_BIND_ADDR.to_string(),
            })?;

        let config = Self {
            bind_addr: parse_var(&lookup, "BIND_ADDR", default_bind_addr)?,
            request_timeout: Duration::from_secs(parse_var(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
            )?),
            debug: parse_var(&lookup, "DEBUG", true)?,
            hasher: HasherConfig::from_lookup(&lookup)?,
        };

        if config.request_timeout <= config.hasher.min_hash_time {
            return Err(ConfigError::TimeoutTooShort {
                timeout: config.request_timeout,
                min_hash_time: config.hasher.min_hash_time,
            });
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value }),
    }
}

fn check_cost(name: &'static str, value: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::CostOutOfRange {
            name,
            value,
            min,
            max,
        });
    }

    Ok(())
}
