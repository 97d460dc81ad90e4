#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Error,
    generator::{
        HiLoGenerator,
        hi::obtain_hi,
        mutex::{Mutex, Padded, lock, padded},
    },
    layout::{Layout, UNINITIALIZED},
    source::HiSource,
};

struct LockState<S> {
    hi: i64,
    lo: i64,
    source: S,
}

/// A lock-based Hi/Lo generator suitable for multi-threaded environments.
///
/// Every call enters a single [`Mutex`] that guards hi, lo and the source, so
/// the hi+lo read is atomic by construction. All callers are serialized,
/// including behind a slow hi fetch during rollover.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Simplest correct strategy; reference semantics for the others
///
/// ## Recommended When
/// - Contention is low, or simplicity matters more than throughput
/// - Fair access across threads is important
///
/// ## See Also
/// - [`AtomicHiLoGenerator`]
/// - [`StampedHiLoGenerator`]
///
/// [`AtomicHiLoGenerator`]: crate::AtomicHiLoGenerator
/// [`StampedHiLoGenerator`]: crate::StampedHiLoGenerator
pub struct LockHiLoGenerator<S>
where
    S: HiSource,
{
    state: Padded<Mutex<LockState<S>>>,
    layout: Layout,
}

impl<S> LockHiLoGenerator<S>
where
    S: HiSource,
{
    /// Creates a new [`LockHiLoGenerator`].
    ///
    /// No hi value is requested until the first call to
    /// [`Self::try_generate`].
    ///
    /// # Example
    /// ```
    /// use hilogen::{InMemoryHiSource, Layout, LockHiLoGenerator};
    ///
    /// let generator = LockHiLoGenerator::new(Layout::hilo(10).unwrap(), InMemoryHiSource::default());
    ///
    /// assert_eq!(generator.try_generate().ok(), Some(0));
    /// assert_eq!(generator.try_generate().ok(), Some(1));
    /// ```
    pub fn new(layout: Layout, source: S) -> Self {
        Self {
            state: padded(Mutex::new(LockState {
                hi: UNINITIALIZED,
                lo: -1,
                source,
            })),
            layout,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Generates the next identifier.
    ///
    /// The new hi/lo pair is only committed once the source (if it had to be
    /// called) succeeded, so a failed call leaves the generator unchanged.
    ///
    /// # Errors
    /// - [`Error::HiSource`] if the source failed
    /// - [`Error::LockPoisoned`] if the lock is poisoned (`std` mutex only)
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_generate(&self) -> Result<i64, Error<S::Err>> {
        let mut state = lock::<_, S::Err>(&self.state)?;
        let lo = state.lo + 1;
        let (hi, lo) = if lo >= self.layout.capacity() {
            (Self::cold_rollover(&mut state.source)?, 0)
        } else if state.hi == UNINITIALIZED {
            (obtain_hi(&mut state.source)?, lo)
        } else {
            (state.hi, lo)
        };
        state.hi = hi;
        state.lo = lo;
        drop(state);

        Ok(self.layout.calculate(hi, lo))
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
    fn cold_rollover(source: &mut S) -> Result<i64, Error<S::Err>> {
        let hi = obtain_hi(source)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(hi, "advanced hi");
        Ok(hi)
    }
}

impl<S> HiLoGenerator<S> for LockHiLoGenerator<S>
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
