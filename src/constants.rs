use std::time::Duration;

/// Minimum wall-clock time a single hash must take.
pub const DEFAULT_MIN_HASH_TIME: Duration = Duration::from_millis(500);

/// Absolute cost floor. A noisy timing measurement can never push the cost below this.
pub const DEFAULT_MIN_COST: u32 = 14;

/// Starting cost. Cheap enough for a quick timing probe, high enough that the probe isn't all noise
/// (4 is too inaccurate).
pub const DEFAULT_SEED_COST: u32 = 5;

/// Largest cost bcrypt accepts.
pub const DEFAULT_MAX_COST: u32 = 31;

/// Upward bias applied to the extrapolation so the next measurement doesn't land just under the floor.
pub const DEFAULT_COST_MARGIN: f64 = 1.1;

/// Smallest cost bcrypt accepts.
pub const BCRYPT_MIN_COST: u32 = 4;

/// bcrypt only looks at the first 72 bytes of its input.
pub const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

/// Password hashed by [`crate::hasher::AdaptiveHasher::calibrate`].
pub const CALIBRATION_PROBE: &str = "Hello";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
