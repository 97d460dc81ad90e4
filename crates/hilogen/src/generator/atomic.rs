use portable_atomic::{AtomicI64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Error,
    generator::{
        DEFAULT_MAX_OPTIMISTIC_ATTEMPTS, HiLoGenerator,
        hi::obtain_hi,
        mutex::{Mutex, Padded, lock, padded},
    },
    layout::{Layout, UNINITIALIZED},
    source::HiSource,
};

/// An optimistic Hi/Lo generator suitable for multi-threaded environments.
///
/// lo lives in an [`AtomicI64`] and is claimed with a single `fetch_add`. hi
/// lives in a second [`AtomicI64`] that is only written inside the exclusive
/// section. A claimed lo is accepted when hi reads the same before and after
/// the claim; otherwise the attempt is retried. After a bounded number of
/// attempts, or as soon as lo runs past the capacity, the caller falls back to
/// the exclusive section, which always makes progress.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ No locking on the common path (lo has room and hi is stable)
///
/// ## Caveats
/// "hi changed" is detected by comparing values, so a hi source that can
/// return the same value twice in a row (ABA) may let a stale lo through.
/// Strictly increasing sources are not affected.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - `capacity` is large enough that rollovers are rare
///
/// ## See Also
/// - [`LockHiLoGenerator`]
/// - [`StampedHiLoGenerator`]
///
/// [`LockHiLoGenerator`]: crate::LockHiLoGenerator
/// [`StampedHiLoGenerator`]: crate::StampedHiLoGenerator
pub struct AtomicHiLoGenerator<S>
where
    S: HiSource,
{
    hi: Padded<AtomicI64>,
    lo: Padded<AtomicI64>,
    source: Padded<Mutex<S>>,
    layout: Layout,
    max_optimistic_attempts: u32,
}

impl<S> AtomicHiLoGenerator<S>
where
    S: HiSource,
{
    /// Creates a new [`AtomicHiLoGenerator`] with the default attempt budget.
    ///
    /// # Example
    /// ```
    /// use hilogen::{AtomicHiLoGenerator, InMemoryHiSource, Layout};
    ///
    /// let generator = AtomicHiLoGenerator::new(Layout::hilo(10).unwrap(), InMemoryHiSource::default());
    ///
    /// let ids: Vec<i64> = (0..12).map(|_| generator.try_generate().unwrap()).collect();
    /// assert_eq!(ids, (0..12).collect::<Vec<_>>());
    /// ```
    pub fn new(layout: Layout, source: S) -> Self {
        Self {
            hi: padded(AtomicI64::new(UNINITIALIZED)),
            lo: padded(AtomicI64::new(-1)),
            source: padded(Mutex::new(source)),
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
    /// # Errors
    /// - [`Error::HiSource`] if the source failed
    /// - [`Error::LockPoisoned`] if the lock is poisoned (`std` mutex only)
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_generate(&self) -> Result<i64, Error<S::Err>> {
        let capacity = self.layout.capacity();
        for _ in 0..self.max_optimistic_attempts {
            let hi = self.hi.load(Ordering::Acquire);
            if hi == UNINITIALIZED {
                break;
            }
            let lo = self.lo.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
            if lo >= capacity {
                break;
            }
            if self.hi.load(Ordering::Acquire) == hi {
                return Ok(self.layout.calculate(hi, lo));
            }
            // hi rolled over concurrently, `lo` may belong to either epoch.
        }
        self.cold_exclusive()
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
        let mut source = lock::<_, S::Err>(&self.source)?;
        let hi = self.hi.load(Ordering::Acquire);
        if hi == UNINITIALIZED {
            // Fast-path callers do not touch lo until hi is published, so
            // the first lo is claimed here before anyone can race for it.
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
            // hi must be published before lo is reset: a fast-path caller
            // that claims a fresh lo is then guaranteed to see the new hi.
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

impl<S> HiLoGenerator<S> for AtomicHiLoGenerator<S>
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
