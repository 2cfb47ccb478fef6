//! Self-tuning bcrypt.
//!
//! [`AdaptiveHasher`] keeps a process-wide cost that is raised whenever a hash or a verification
//! finishes faster than the configured minimum hash time. The cost is never lowered and never
//! drops below the configured floor.

pub mod clock;
pub mod primitive;
pub mod record;

use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use tracing::{event, Level};

use crate::{
    config::HasherConfig,
    constants::CALIBRATION_PROBE,
    error::{ConfigError, HasherError},
};
use clock::{Clock, MonotonicClock};
use primitive::{Bcrypt, Primitive};
use record::RecordHeader;

pub struct AdaptiveHasher<P = Bcrypt, C = MonotonicClock> {
    config: HasherConfig,
    primitive: P,
    clock: C,
    current_cost: AtomicU32,
}

impl AdaptiveHasher {
    /// A hasher backed by the `bcrypt` crate and the system's monotonic clock.
    pub fn bcrypt(config: HasherConfig) -> Result<Self, ConfigError> {
        Self::new(config, Bcrypt, MonotonicClock::new())
    }
}

impl<P: Primitive, C: Clock> AdaptiveHasher<P, C> {
    pub fn new(config: HasherConfig, primitive: P, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            current_cost: AtomicU32::new(config.seed_cost),
            config,
            primitive,
            clock,
        })
    }

    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    pub fn current_cost(&self) -> u32 {
        self.current_cost.load(Ordering::Acquire)
    }

    /// Hashes `password`, raising the cost and retrying until a single hash takes at least the
    /// minimum hash time at or above the cost floor.
    ///
    /// Fails with [`HasherError::CostCeiling`] if even the maximum cost is too fast.
    pub fn hash(&self, password: impl AsRef<[u8]>) -> Result<String, HasherError> {
        let password = password.as_ref();

        loop {
            let cost = self.current_cost();
            let (record, elapsed) = self.timed(|| self.primitive.hash(password, cost));
            let record = record?;

            event!(Level::DEBUG, cost, elapsed_ms = elapsed.as_millis() as u64, "timed hash");

            if elapsed >= self.config.min_hash_time && cost >= self.config.min_cost {
                return Ok(record);
            }

            if cost >= self.config.max_cost {
                event!(
                    Level::WARN,
                    cost,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "hashing at the maximum cost is still faster than the minimum hash time"
                );

                return Err(HasherError::CostCeiling { cost, elapsed });
            }

            self.update_cost(elapsed, cost);
        }
    }

    /// Checks `password` against `record`, using the verification time to recalibrate.
    ///
    /// The verdict is returned as-is. A record without a bcrypt header is a
    /// [`HasherError::Decode`], never `false`.
    pub fn verify(&self, password: impl AsRef<[u8]>, record: &str) -> Result<bool, HasherError> {
        let header = RecordHeader::parse(record)?;

        let (valid, elapsed) = self.timed(|| self.primitive.verify(password.as_ref(), record));
        let valid = valid?;

        event!(
            Level::DEBUG,
            cost = header.cost,
            elapsed_ms = elapsed.as_millis() as u64,
            "timed verification"
        );

        self.update_cost(elapsed, header.cost);

        Ok(valid)
    }

    /// Whether `record` should be regenerated at the current cost.
    ///
    /// Only meaningful once [`hash`](Self::hash), [`verify`](Self::verify) or
    /// [`calibrate`](Self::calibrate) has run; before that the cost is still the seed and
    /// under-cost records go unnoticed. Never recommends rehashing to an equal or lower cost.
    pub fn needs_rehash(&self, record: &str) -> Result<bool, HasherError> {
        let header = RecordHeader::parse(record)?;
        let current = self.current_cost();

        let stale = self.primitive.needs_rehash(record, current)?;

        Ok(stale && current > header.cost)
    }

    /// Hashes a throwaway password so the cost reflects this machine. Returns the calibrated cost.
    pub fn calibrate(&self) -> Result<u32, HasherError> {
        self.hash(CALIBRATION_PROBE)?;

        Ok(self.current_cost())
    }

    fn timed<T>(&self, f: impl FnOnce() -> T) -> (T, Duration) {
        let start = self.clock.now();
        let result = f();

        (result, self.clock.now().saturating_sub(start))
    }

    /// The only writer of `current_cost`.
    fn update_cost(&self, elapsed: Duration, baseline: u32) {
        let target = self.target_cost(elapsed, baseline);
        let previous = self.current_cost.fetch_max(target, Ordering::AcqRel);

        if target > previous {
            event!(
                Level::INFO,
                from = previous,
                to = target,
                elapsed_ms = elapsed.as_millis() as u64,
                "raised bcrypt cost"
            );
        }
    }

    /// Extrapolates from `baseline`, the cost that took `elapsed`, to the cost that reaches the
    /// minimum hash time. Each extra cost point doubles the work.
    ///
    /// The delta may be negative when `elapsed` is already above target. The result is bounded
    /// by the configured floor and ceiling.
    fn target_cost(&self, elapsed: Duration, baseline: u32) -> u32 {
        let ratio =
            self.config.min_hash_time.as_secs_f64() / elapsed.as_secs_f64() * self.config.margin;
        let extra = ratio.log2().ceil();

        (f64::from(baseline) + extra)
            .max(f64::from(self.config.min_cost))
            .min(f64::from(self.config.max_cost)) as u32
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    };

    use super::*;
    use crate::error::DecodeError;

    #[derive(Default)]
    struct FakeClock {
        nanos: AtomicU64,
    }

    impl FakeClock {
        fn advance(&self, by: Duration) {
            self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Duration {
            Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
        }
    }

    /// Takes `unit * 2^cost` of fake time per call. Records are `$2b$<cost>$<password>`.
    struct FakeBcrypt {
        clock: Arc<FakeClock>,
        unit: Duration,
        hashed_at: Mutex<Vec<u32>>,
        verify_calls: Mutex<u32>,
    }

    impl FakeBcrypt {
        /// `cost_five` is how long a cost 5 hash takes.
        fn new(clock: Arc<FakeClock>, cost_five: Duration) -> Self {
            Self {
                clock,
                unit: cost_five / 32,
                hashed_at: Mutex::new(vec![]),
                verify_calls: Mutex::new(0),
            }
        }

        fn work(&self, cost: u32) {
            self.clock.advance(self.unit * (1u32 << cost));
        }

        fn hashed_at(&self) -> Vec<u32> {
            self.hashed_at.lock().unwrap().clone()
        }
    }

    impl Primitive for FakeBcrypt {
        fn hash(&self, password: &[u8], cost: u32) -> bcrypt::BcryptResult<String> {
            if !(4..=31).contains(&cost) {
                return Err(bcrypt::BcryptError::CostNotAllowed(cost));
            }

            self.work(cost);
            self.hashed_at.lock().unwrap().push(cost);

            Ok(format!("$2b${cost:02}${}", String::from_utf8_lossy(password)))
        }

        fn verify(&self, password: &[u8], record: &str) -> bcrypt::BcryptResult<bool> {
            let cost = record::cost_of(record)
                .map_err(|_| bcrypt::BcryptError::InvalidHash(record.to_string()))?;

            self.work(cost);
            *self.verify_calls.lock().unwrap() += 1;

            Ok(record[7..].as_bytes() == password)
        }

        fn needs_rehash(&self, record: &str, cost: u32) -> Result<bool, DecodeError> {
            let header = RecordHeader::parse(record)?;

            Ok(header.version != record::Version::TwoB || header.cost != cost)
        }
    }

    fn hasher(
        config: HasherConfig,
        cost_five: Duration,
    ) -> AdaptiveHasher<Arc<FakeBcrypt>, Arc<FakeClock>> {
        let clock = Arc::new(FakeClock::default());
        let primitive = Arc::new(FakeBcrypt::new(clock.clone(), cost_five));

        AdaptiveHasher::new(config, primitive, clock).unwrap()
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn first_hash_escalates_from_seed_to_floor() {
        let hasher = hasher(HasherConfig::default(), ms(10));

        let record = hasher.hash("hunter2").unwrap();

        // 0.5 / 0.01 * 1.1 = 55, log2 = 5.78 -> +6 -> 11, floored at 14.
        assert_eq!(hasher.primitive.hashed_at(), vec![5, 14]);
        assert_eq!(record::cost_of(&record).unwrap(), 14);
        assert_eq!(hasher.current_cost(), 14);
    }

    #[test]
    fn escalation_above_floor_follows_the_extrapolation() {
        let config = HasherConfig {
            min_cost: 4,
            ..HasherConfig::default()
        };
        let hasher = hasher(config, ms(10));

        hasher.hash("hunter2").unwrap();

        // cost 11 takes 0.64s, which clears 0.5s on the first retry.
        assert_eq!(hasher.primitive.hashed_at(), vec![5, 11]);
        assert_eq!(hasher.current_cost(), 11);
    }

    #[test]
    fn calibrated_hashes_do_not_retry() {
        let hasher = hasher(HasherConfig::default(), ms(10));

        hasher.hash("first").unwrap();
        hasher.hash("second").unwrap();

        assert_eq!(hasher.primitive.hashed_at(), vec![5, 14, 14]);
    }

    #[test]
    fn converges_within_logarithmic_escalations() {
        for micros in [1, 7, 50, 300, 2_000, 40_000] {
            let config = HasherConfig {
                min_cost: 4,
                margin: 1.0,
                ..HasherConfig::default()
            };
            let cost_five = Duration::from_micros(micros);
            let hasher = hasher(config.clone(), cost_five);

            hasher.hash("hunter2").unwrap();

            let attempts = hasher.primitive.hashed_at();
            let bound = (config.min_hash_time.as_secs_f64() / cost_five.as_secs_f64())
                .log2()
                .ceil() as usize;
            let last = *attempts.last().unwrap();

            assert!(attempts.len() - 1 <= bound.max(1), "{micros}us: {attempts:?}");
            assert!(cost_five * (1u32 << last) / 32 >= config.min_hash_time);
        }
    }

    #[test]
    fn slow_seed_still_respects_the_floor() {
        let hasher = hasher(HasherConfig::default(), Duration::from_secs(1));

        let record = hasher.hash("hunter2").unwrap();

        assert_eq!(hasher.primitive.hashed_at(), vec![5, 14]);
        assert_eq!(record::cost_of(&record).unwrap(), 14);
    }

    #[test]
    fn verify_round_trips() {
        let hasher = hasher(HasherConfig::default(), ms(10));
        let record = hasher.hash("hunter2").unwrap();

        assert!(hasher.verify("hunter2", &record).unwrap());
        assert!(!hasher.verify("hunter3", &record).unwrap());
    }

    #[test]
    fn verify_extrapolates_from_the_record_cost() {
        let config = HasherConfig {
            min_cost: 4,
            ..HasherConfig::default()
        };
        let hasher = hasher(config, ms(10));

        // cost 8 takes 0.08s: 0.5 / 0.08 * 1.1 = 6.9 -> +3 -> 11. Anchoring on the seed would give 8.
        let verdict = hasher.verify("hunter2", "$2b$08$hunter2").unwrap();

        assert!(verdict);
        assert_eq!(hasher.current_cost(), 11);
    }

    #[test]
    fn slow_verification_never_lowers_the_cost() {
        let config = HasherConfig {
            min_cost: 4,
            ..HasherConfig::default()
        };
        let hasher = hasher(config, ms(10));
        hasher.hash("hunter2").unwrap();
        assert_eq!(hasher.current_cost(), 11);

        // cost 9 takes 0.16s: +2 -> 11, no change.
        hasher.verify("x", "$2b$09$x").unwrap();
        assert_eq!(hasher.current_cost(), 11);

        // cost 14 takes 5.12s: extrapolates to 14 - 3 = 11, still no change.
        hasher.verify("x", "$2b$14$x").unwrap();
        assert_eq!(hasher.current_cost(), 11);

        // cost 12 takes 1.28s: extrapolates to 12 - 1 = 11, still no change.
        hasher.verify("x", "$2b$12$x").unwrap();
        assert_eq!(hasher.current_cost(), 11);
    }

    #[test]
    fn cost_stays_above_floor_and_never_decreases() {
        let hasher = hasher(HasherConfig::default(), ms(10));
        let records = ["$2b$04$a", "$2b$10$b", "$2b$16$c", "$2b$20$d", "$2b$13$e"];
        let mut last = 0;

        for (i, record) in records.iter().enumerate() {
            hasher.verify("a", record).unwrap();
            let after_verify = hasher.current_cost();

            hasher.hash(format!("password {i}")).unwrap();
            let after_hash = hasher.current_cost();

            assert!(after_verify >= 14 && after_hash >= 14);
            assert!(after_verify >= last && after_hash >= after_verify);
            last = after_hash;
        }
    }

    #[test]
    fn needs_rehash_scenarios() {
        let hasher = hasher(HasherConfig::default(), ms(10));
        hasher.hash("hunter2").unwrap();
        assert_eq!(hasher.current_cost(), 14);

        assert!(hasher.needs_rehash("$2b$10$hunter2").unwrap());
        assert!(!hasher.needs_rehash("$2b$16$hunter2").unwrap());
        assert!(!hasher.needs_rehash("$2b$14$hunter2").unwrap());

        // Different algorithm tag is stale, but only worth a rehash if the cost goes up.
        assert!(!hasher.needs_rehash("$2y$14$hunter2").unwrap());
        assert!(hasher.needs_rehash("$2y$12$hunter2").unwrap());
    }

    #[test]
    fn needs_rehash_before_calibration_can_miss_weak_records() {
        let hasher = hasher(HasherConfig::default(), ms(10));

        assert!(!hasher.needs_rehash("$2b$05$hunter2").unwrap());

        hasher.calibrate().unwrap();

        assert!(hasher.needs_rehash("$2b$05$hunter2").unwrap());
    }

    #[test]
    fn malformed_records_are_decode_errors() {
        let hasher = hasher(HasherConfig::default(), ms(10));

        assert!(matches!(
            hasher.verify("hunter2", "not-a-hash"),
            Err(HasherError::Decode(DecodeError::UnsupportedAlgorithm { .. }))
        ));
        assert!(matches!(
            hasher.needs_rehash("not-a-hash"),
            Err(HasherError::Decode(DecodeError::UnsupportedAlgorithm { .. }))
        ));
        assert_eq!(*hasher.primitive.verify_calls.lock().unwrap(), 0);
        assert_eq!(hasher.current_cost(), 5);
    }

    #[test]
    fn gives_up_at_the_cost_ceiling() {
        let config = HasherConfig {
            max_cost: 16,
            ..HasherConfig::default()
        };
        let hasher = hasher(config, Duration::from_nanos(32));

        let err = hasher.hash("hunter2").unwrap_err();

        assert!(matches!(err, HasherError::CostCeiling { cost: 16, .. }));
        assert_eq!(hasher.current_cost(), 16);
    }

    #[test]
    fn instantaneous_measurement_jumps_to_the_ceiling() {
        let config = HasherConfig {
            max_cost: 20,
            ..HasherConfig::default()
        };
        let hasher = hasher(config, Duration::ZERO);

        assert!(matches!(
            hasher.hash("hunter2"),
            Err(HasherError::CostCeiling { cost: 20, .. })
        ));
        assert_eq!(hasher.primitive.hashed_at(), vec![5, 20]);
    }

    #[test]
    fn concurrent_hashing_keeps_invariants() {
        let hasher = hasher(HasherConfig::default(), ms(10));

        let records: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let hasher = &hasher;
                    scope.spawn(move || hasher.hash(format!("password {i}")).unwrap())
                })
                .collect();

            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for record in &records {
            assert!(record::cost_of(record).unwrap() >= 14);
        }
        assert!(hasher.current_cost() >= 14);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = HasherConfig {
            seed_cost: 2,
            ..HasherConfig::default()
        };
        let clock = Arc::new(FakeClock::default());
        let primitive = FakeBcrypt::new(clock.clone(), ms(10));

        assert!(matches!(
            AdaptiveHasher::new(config, primitive, clock),
            Err(ConfigError::CostOutOfRange { name: "SEED_COST", .. })
        ));
    }
}
