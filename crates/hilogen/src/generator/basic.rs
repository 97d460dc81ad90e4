use core::cell::{Cell, RefCell};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Error,
    generator::{HiLoGenerator, hi::obtain_hi},
    layout::{Layout, UNINITIALIZED},
    source::HiSource,
};

/// A non-concurrent Hi/Lo generator suitable for single-threaded
/// environments.
///
/// This generator is lightweight and fast, but **not thread-safe**.
///
/// ## Features
/// - ❌ Not thread-safe
/// - ✅ No atomics or locks
///
/// ## Recommended When
/// - You're in a single-threaded environment (no shared access)
/// - You want the fastest generator
///
/// ## See Also
/// - [`LockHiLoGenerator`]
/// - [`AtomicHiLoGenerator`]
/// - [`StampedHiLoGenerator`]
///
/// [`LockHiLoGenerator`]: crate::LockHiLoGenerator
/// [`AtomicHiLoGenerator`]: crate::AtomicHiLoGenerator
/// [`StampedHiLoGenerator`]: crate::StampedHiLoGenerator
pub struct BasicHiLoGenerator<S>
where
    S: HiSource,
{
    hi: Cell<i64>,
    lo: Cell<i64>,
    source: RefCell<S>,
    layout: Layout,
}

impl<S> BasicHiLoGenerator<S>
where
    S: HiSource,
{
    /// Creates a new [`BasicHiLoGenerator`].
    ///
    /// # Example
    /// ```
    /// use hilogen::{BasicHiLoGenerator, InMemoryHiSource, Layout};
    ///
    /// let generator = BasicHiLoGenerator::new(Layout::hilo(1).unwrap(), InMemoryHiSource::default());
    ///
    /// assert_eq!(generator.try_generate().ok(), Some(0));
    /// assert_eq!(generator.try_generate().ok(), Some(1));
    /// ```
    pub fn new(layout: Layout, source: S) -> Self {
        Self {
            hi: Cell::new(UNINITIALIZED),
            lo: Cell::new(-1),
            source: RefCell::new(source),
            layout,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Generates the next identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HiSource`] if the source failed. The generator is
    /// left unchanged in that case.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_generate(&self) -> Result<i64, Error<S::Err>> {
        let lo = self.lo.get() + 1;
        let (hi, lo) = if lo >= self.layout.capacity() {
            (obtain_hi(&mut *self.source.borrow_mut())?, 0)
        } else if self.hi.get() == UNINITIALIZED {
            (obtain_hi(&mut *self.source.borrow_mut())?, lo)
        } else {
            (self.hi.get(), lo)
        };
        self.hi.set(hi);
        self.lo.set(lo);

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
}

impl<S> HiLoGenerator<S> for BasicHiLoGenerator<S>
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
