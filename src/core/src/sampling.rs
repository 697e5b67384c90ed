//! Per-connection sampling decision.

use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Clamps a configured percentage into `0..=100`.
pub fn normalize(rate: i32) -> u8 {
    rate.clamp(0, 100) as u8
}

/// Random source shared by every connection of one proxy.
///
/// Seeded once when the proxy is built, never per connection.
#[derive(Debug)]
pub struct Sampler {
    rng: Mutex<StdRng>,
}

impl Sampler {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seeds from the current wall-clock time.
    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        debug!("Sampler seeded from time: {}", seed);
        Self::seeded(seed)
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_time(),
        }
    }

    /// Decides whether one connection is acted upon.
    ///
    /// 0 never samples and 100 always does, without touching the random
    /// source; anything in between samples iff a uniform draw in `0..100`
    /// is below the rate.
    pub fn should_sample(&self, rate: i32) -> bool {
        match normalize(rate) {
            0 => false,
            100 => true,
            rate => {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                rng.gen_range(0..100u8) < rate
            }
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::from_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(i32::MIN), 0);
        assert_eq!(normalize(-1), 0);
        assert_eq!(normalize(0), 0);
        assert_eq!(normalize(42), 42);
        assert_eq!(normalize(100), 100);
        assert_eq!(normalize(101), 100);
        assert_eq!(normalize(i32::MAX), 100);
    }

    #[test]
    fn test_extreme_rates() {
        let sampler = Sampler::from_time();
        for _ in 0..1_000 {
            assert!(!sampler.should_sample(0));
            assert!(!sampler.should_sample(-20));
            assert!(sampler.should_sample(100));
            assert!(sampler.should_sample(250));
        }
    }

    #[test]
    fn test_rate_converges() {
        let sampler = Sampler::seeded(0x6b74);
        for rate in [1, 25, 50, 90] {
            let trials = 100_000;
            let hits = (0..trials).filter(|_| sampler.should_sample(rate)).count();
            let observed = hits as f64 / trials as f64;
            let expected = rate as f64 / 100.0;
            assert!(
                (observed - expected).abs() < 0.01,
                "rate {} observed {}",
                rate,
                observed
            );
        }
    }

    #[test]
    fn test_same_seed_same_decisions() {
        let a = Sampler::seeded(7);
        let b = Sampler::seeded(7);
        let left: Vec<bool> = (0..256).map(|_| a.should_sample(37)).collect();
        let right: Vec<bool> = (0..256).map(|_| b.should_sample(37)).collect();
        assert_eq!(left, right);
        assert!(left.iter().any(|s| *s));
        assert!(left.iter().any(|s| !*s));
    }
}
