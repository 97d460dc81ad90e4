use portable_atomic::{AtomicI64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Error,
    generator::{
        DEFAULT_MAX_OPTIMISTIC_ATTEMPTS, HiLoGenerator,
        hi::obtain_hi,
        mutex::{Padded, padded},
        stamp::{Stamp, StampedLock},
    },
    layout::{Layout, UNINITIALIZED},
    source::HiSource,
};

#[derive(Debug, PartialEq, Eq)]
enum Claim {
    Id(i64),
    Retry,
    Exclusive,
}

/// A Hi/Lo generator that validates optimistic reads with a stamped lock.
///
/// Like [`AtomicHiLoGenerator`], lo is claimed with a single `fetch_add`, but
/// instead of re-reading hi the claim is validated against a version stamp
/// that every exclusive writer bumps. Validation fails exactly when a writer
/// entered the exclusive section in between, so acceptance never depends on
/// comparing hi values.
///
/// A source that hands out the same hi twice reissues that hi's identifiers
/// under every strategy. Sources only need to be non-repeating, not ordered.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ No locking on the common path
/// - ✅ Unique identifiers with non-repeating but unordered hi sources
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - The hi source is not known to be strictly increasing
///
/// ## See Also
/// - [`LockHiLoGenerator`]
/// - [`AtomicHiLoGenerator`]
///
/// [`LockHiLoGenerator`]: crate::LockHiLoGenerator
/// [`AtomicHiLoGenerator`]: crate::AtomicHiLoGenerator
pub struct StampedHiLoGenerator<S>
where
    S: HiSource,
{
    hi: Padded<AtomicI64>,
    lo: Padded<AtomicI64>,
    lock: StampedLock<S>,
    layout: Layout,
    max_optimistic_attempts: u32,
}

impl<S> StampedHiLoGenerator<S>
where
    S: HiSource,
{
    /// Creates a new [`StampedHiLoGenerator`] with the default attempt budget.
    ///
    /// # Example
    /// ```
    /// use hilogen::{InMemoryHiSource, Layout, StampedHiLoGenerator};
    ///
    /// let source = InMemoryHiSource::with_sparseness(0, 4).unwrap();
    /// let generator = StampedHiLoGenerator::new(Layout::pooled(5).unwrap(), source);
    ///
    /// let ids: Vec<i64> = (0..7).map(|_| generator.try_generate().unwrap()).collect();
    /// assert_eq!(ids, [0, 1, 2, 3, 4, 5, 6]);
    /// ```
    pub fn new(layout: Layout, source: S) -> Self {
        Self {
            hi: padded(AtomicI64::new(UNINITIALIZED)),
            lo: padded(AtomicI64::new(-1)),
            lock: StampedLock::new(source),
            layout,
            max_optimistic_attempts: DEFAULT_MAX_OPTIMISTIC_ATTEMPTS,
        }
    }

    /// Sets how many optimistic attempts are made before entering the
    /// exclusive section. `0` makes every call take the exclusive section.
    #[must_use]
    pub fn with_max_optimistic_attempts(mut self, attempts: u32) -> Self {
        self.max_optimistic_attempts = attempts;
        self
    }

    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    #[must_use]
    pub const fn max_optimistic_attempts(&self) -> u32 {
        self.max_optimistic_attempts
    }

    /// Generates the next identifier.
    ///
    /// An attempt that finds a writer inside the exclusive section counts
    /// against the attempt budget without claiming a lo value.
    ///
    /// # Errors
    /// - [`Error::HiSource`] if the source failed
    /// - [`Error::LockPoisoned`] if the lock is poisoned (`std` mutex only)
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_generate(&self) -> Result<i64, Error<S::Err>> {
        let capacity = self.layout.capacity();
        for _ in 0..self.max_optimistic_attempts {
            let Some(stamp) = self.lock.try_optimistic_read() else {
                core::hint::spin_loop();
                continue;
            };
            match self.claim(stamp, capacity) {
                Claim::Id(id) => return Ok(id),
                Claim::Retry => {}
                Claim::Exclusive => break,
            }
        }
        self.cold_exclusive()
    }

    /// One optimistic attempt under `stamp`.
    ///
    /// The stamp is validated once before lo is touched, so a stamp that went
    /// stale while hi was being read never consumes a lo value.
    #[inline]
    fn claim(&self, stamp: Stamp, capacity: i64) -> Claim {
        let hi = self.hi.load(Ordering::Acquire);
        if hi == UNINITIALIZED {
            return Claim::Exclusive;
        }
        if !self.lock.validate(stamp) {
            return Claim::Retry;
        }
        let lo = self.lo.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        if lo >= capacity {
            return Claim::Exclusive;
        }
        if self.lock.validate(stamp) {
            Claim::Id(self.layout.calculate(hi, lo))
        } else {
            Claim::Retry
        }
    }

    /// Generates the next identifier when no error is possible.
    ///
    /// See [`HiLoGenerator::generate`].
    pub fn generate(&self) -> i64
    where
        Error<S::Err>: Into<core::convert::Infallible>,
    {
        HiLoGenerator::generate(self)
    }

    #[cold]
    #[inline(never)]
    fn cold_exclusive(&self) -> Result<i64, Error<S::Err>> {
        let mut source = self.lock.write::<S::Err>()?;
        let hi = self.hi.load(Ordering::Relaxed);
        if hi == UNINITIALIZED {
            let hi = obtain_hi(&mut *source)?;
            let lo = self.lo.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
            self.hi.store(hi, Ordering::Release);
            drop(source);
            #[cfg(feature = "tracing")]
            tracing::debug!(hi, "initialized hi");
            return Ok(self.layout.calculate(hi, lo));
        }
        let lo = self.lo.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        let (hi, lo) = if lo >= self.layout.capacity() {
            let hi = obtain_hi(&mut *source)?;
            self.hi.store(hi, Ordering::Release);
            self.lo.store(0, Ordering::Release);
            #[cfg(feature = "tracing")]
            tracing::debug!(hi, "advanced hi");
            (hi, 0)
        } else {
            (hi, lo)
        };
        drop(source);

        Ok(self.layout.calculate(hi, lo))
    }
}

impl<S> HiLoGenerator<S> for StampedHiLoGenerator<S>
where
    S: HiSource,
{
    fn new(layout: Layout, source: S) -> Self {
        Self::new(layout, source)
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn try_generate(&self) -> Result<i64, Error<S::Err>> {
        self.try_generate()
    }
}
