use std::time::Duration;

use thiserror::Error;

/// The record does not start with a recognized bcrypt header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported algorithm: {record}")]
    UnsupportedAlgorithm { record: String },
    #[error("malformed cost field: {record}")]
    MalformedCost { record: String },
}

#[derive(Debug, Error)]
pub enum HasherError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("hash primitive failed: {0}")]
    Primitive(#[from] bcrypt::BcryptError),
    /// Hashing at the highest allowed cost still finished under the time floor.
    #[error("cost ceiling {cost} reached, hashing took only {elapsed:?}")]
    CostCeiling { cost: u32, elapsed: Duration },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("environment variable {name} has an invalid value: {value:?}")]
    InvalidVar { name: &'static str, value: String },
    #[error("{name} must be between {min} and {max}, got {value}")]
    CostOutOfRange {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("minimum hash time must be greater than zero")]
    ZeroHashTime,
    #[error("cost margin must be a finite number >= 1.0, got {0}")]
    InvalidMargin(f64),
    #[error("request timeout {timeout:?} must exceed the minimum hash time {min_hash_time:?}")]
    TimeoutTooShort {
        timeout: Duration,
        min_hash_time: Duration,
    },
}
