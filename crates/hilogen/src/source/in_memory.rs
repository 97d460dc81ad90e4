use crate::{
    error::ConfigError,
    layout::UNINITIALIZED,
    source::{HiSource, NoopSleeper, Sleeper},
};

/// An ephemeral, strictly increasing [`HiSource`] held in memory.
///
/// Each call returns the current value and advances it by `sparseness + 1`,
/// skipping [`UNINITIALIZED`]. With `sparseness = capacity - 1` the source is
/// suitable for [`Mode::Pooled`].
///
/// The value is not persisted, so identifiers derived from it are unique only
/// within one process run. A [`Sleeper`] can be attached to emulate the
/// latency of a real sequence.
///
/// ## Features
/// - ❌ Persistent
/// - ✅ Strictly increasing (until the counter wraps around `i64::MAX`)
///
/// # Example
/// ```
/// use hilogen::{HiSource, InMemoryHiSource};
///
/// let mut source = InMemoryHiSource::with_sparseness(10, 4).unwrap();
/// assert_eq!(source.next_hi(), Ok(10));
/// assert_eq!(source.next_hi(), Ok(15));
/// assert_eq!(source.next_hi(), Ok(20));
/// ```
///
/// [`Mode::Pooled`]: crate::Mode::Pooled
#[derive(Clone, Debug)]
pub struct InMemoryHiSource<Z = NoopSleeper>
where
    Z: Sleeper,
{
    next: i64,
    step: i64,
    sleeper: Z,
}

impl InMemoryHiSource {
    /// Creates a dense source whose first value is `start`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReservedHi`] if `start` is [`UNINITIALIZED`].
    pub const fn new(start: i64) -> Result<Self, ConfigError> {
        Self::with_sparseness(start, 0)
    }

    /// Creates a source whose first value is `start` and whose consecutive
    /// values differ by `sparseness + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReservedHi`] if `start` is [`UNINITIALIZED`], or
    /// [`ConfigError::InvalidSparseness`] if `sparseness` is negative or so
    /// large that `sparseness + 1` overflows.
    pub const fn with_sparseness(start: i64, sparseness: i64) -> Result<Self, ConfigError> {
        if start == UNINITIALIZED {
            return Err(ConfigError::ReservedHi { hi: start });
        }
        if sparseness < 0 || sparseness == i64::MAX {
            return Err(ConfigError::InvalidSparseness { sparseness });
        }
        Ok(Self {
            next: start,
            step: sparseness + 1,
            sleeper: NoopSleeper,
        })
    }
}

impl Default for InMemoryHiSource {
    /// A dense source starting at `0`.
    fn default() -> Self {
        Self {
            next: 0,
            step: 1,
            sleeper: NoopSleeper,
        }
    }
}

impl<Z> InMemoryHiSource<Z>
where
    Z: Sleeper,
{
    /// Replaces the sleeper invoked before each value is produced.
    ///
    /// # Example
    /// ```
    /// use core::time::Duration;
    /// use hilogen::{FixedSleeper, HiSource, InMemoryHiSource};
    ///
    /// let mut source = InMemoryHiSource::default()
    ///     .with_sleeper(FixedSleeper::new(Duration::from_micros(50)));
    /// assert_eq!(source.next_hi(), Ok(0));
    /// ```
    pub fn with_sleeper<Y: Sleeper>(self, sleeper: Y) -> InMemoryHiSource<Y> {
        InMemoryHiSource {
            next: self.next,
            step: self.step,
            sleeper,
        }
    }

    /// The distance between consecutive values minus one.
    #[must_use]
    pub const fn sparseness(&self) -> i64 {
        self.step - 1
    }

    /// The value the next call will return, before sentinel skipping.
    #[must_use]
    pub const fn peek(&self) -> i64 {
        self.next
    }

    fn advance(&mut self) -> i64 {
        let current = self.next;
        self.next = self.next.wrapping_add(self.step);
        current
    }
}

impl<Z> HiSource for InMemoryHiSource<Z>
where
    Z: Sleeper,
{
    type Err = core::convert::Infallible;

    fn next_hi(&mut self) -> Result<i64, Self::Err> {
        self.sleeper.sleep();
        let hi = self.advance();
        if hi == UNINITIALIZED {
            return Ok(self.advance());
        }
        Ok(hi)
    }
}
