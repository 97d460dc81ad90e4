use core::time::Duration;

#[cfg(feature = "rand")]
use rand_distr::{Distribution, Normal};

/// Emulates the latency of a slow upstream, such as a round trip to a
/// database.
///
/// [`InMemoryHiSource`] calls its sleeper before producing each value, which
/// makes it usable as a stand-in for a real sequence in tests and benchmarks.
///
/// [`InMemoryHiSource`]: crate::InMemoryHiSource
pub trait Sleeper {
    /// Blocks the calling thread for a duration chosen by the implementation.
    fn sleep(&mut self);
}

/// A [`Sleeper`] that returns immediately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoopSleeper;

impl Sleeper for NoopSleeper {
    #[inline]
    fn sleep(&mut self) {}
}

/// A [`Sleeper`] that always blocks for the same duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedSleeper {
    duration: Duration,
}

impl FixedSleeper {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

impl Sleeper for FixedSleeper {
    fn sleep(&mut self) {
        if !self.duration.is_zero() {
            std::thread::sleep(self.duration);
        }
    }
}

/// A [`Sleeper`] whose delay follows a normal distribution.
///
/// Samples are drawn from a [`Normal`] distribution with the thread-local RNG
/// and clamped at zero, so a large standard deviation skews the effective
/// mean upwards.
#[cfg_attr(docsrs, doc(cfg(feature = "rand")))]
#[cfg(feature = "rand")]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianSleeper {
    mean: Duration,
    std_dev: Duration,
}

#[cfg(feature = "rand")]
impl GaussianSleeper {
    #[must_use]
    pub const fn new(mean: Duration, std_dev: Duration) -> Self {
        Self { mean, std_dev }
    }

    #[must_use]
    pub const fn mean(&self) -> Duration {
        self.mean
    }

    #[must_use]
    pub const fn std_dev(&self) -> Duration {
        self.std_dev
    }

    /// Draws the next delay without sleeping.
    #[must_use]
    pub fn sample(&self) -> Duration {
        let Ok(normal) = Normal::new(self.mean.as_secs_f64(), self.std_dev.as_secs_f64()) else {
            return self.mean;
        };
        let secs: f64 = normal.sample(&mut rand::rng());
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}

#[cfg(feature = "rand")]
impl Sleeper for GaussianSleeper {
    fn sleep(&mut self) {
        let delay = self.sample();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn noop_returns_immediately() {
        let start = Instant::now();
        let mut sleeper = NoopSleeper;
        for _ in 0..1000 {
            sleeper.sleep();
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn fixed_sleeps_at_least_duration() {
        let mut sleeper = FixedSleeper::new(Duration::from_millis(5));
        let start = Instant::now();
        sleeper.sleep();
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[cfg(feature = "rand")]
    #[test]
    fn gaussian_without_deviation_is_constant() {
        let sleeper = GaussianSleeper::new(Duration::from_micros(100), Duration::ZERO);
        for _ in 0..100 {
            let sample = sleeper.sample();
            let diff = sample.abs_diff(Duration::from_micros(100));
            assert!(diff < Duration::from_nanos(10), "sample {sample:?}");
        }
    }

    #[cfg(feature = "rand")]
    #[test]
    fn gaussian_clamps_negative_samples_to_zero() {
        let sleeper = GaussianSleeper::new(Duration::ZERO, Duration::from_secs(10));
        let zeros = (0..1000)
            .filter(|_| sleeper.sample() == Duration::ZERO)
            .count();
        // Half the mass lies below zero; 1000 draws all landing above it is
        // a 2^-1000 event.
        assert!(zeros > 0);
        assert!(zeros < 1000);
    }
}
