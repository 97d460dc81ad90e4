use core::fmt;

/// A result type that is infallible by default.
pub type Result<T, E = core::convert::Infallible> = core::result::Result<T, E>;

/// Errors detected while validating a configuration.
///
/// These are raised once, at construction time, and are never retried.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The number of lo values per hi value must be positive.
    #[error("capacity must be positive, got {capacity}")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: i64,
    },

    /// A hi source cannot have a negative sparseness.
    #[error("sparseness must not be negative, got {sparseness}")]
    InvalidSparseness {
        /// The rejected sparseness.
        sparseness: i64,
    },

    /// The reserved [`UNINITIALIZED`] value was supplied as a hi value.
    ///
    /// [`UNINITIALIZED`]: crate::UNINITIALIZED
    #[error("hi value {hi} is reserved to mean uninitialized")]
    ReservedHi {
        /// The rejected hi value.
        hi: i64,
    },
}

/// All errors a generator can produce while generating an identifier.
///
/// `E` is the error type of the [`HiSource`] the generator wraps. Failures of
/// the source are passed through untouched; the generator never retries them.
///
/// When the `parking-lot` feature is enabled, locks cannot be poisoned and the
/// only remaining variant is [`Error::HiSource`]. With an infallible source
/// the error is then uninhabited and the infallible `generate` shortcuts
/// become available.
///
/// [`HiSource`]: crate::HiSource
#[derive(Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error<E> {
    /// The hi source failed to supply the next hi value.
    #[error("hi source failed: {0:?}")]
    HiSource(E),

    /// A thread panicked while holding the exclusive section.
    ///
    /// Only available without the `parking-lot` feature: `parking_lot`
    /// mutexes do not poison.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("lock poisoned by a panic in another thread")]
    LockPoisoned,
}

impl<E: fmt::Debug> fmt::Debug for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HiSource(e) => f.debug_tuple("HiSource").field(e).finish(),
            #[cfg(not(feature = "parking-lot"))]
            Self::LockPoisoned => f.write_str("LockPoisoned"),
        }
    }
}

#[cfg(feature = "parking-lot")]
impl From<Error<core::convert::Infallible>> for core::convert::Infallible {
    fn from(e: Error<core::convert::Infallible>) -> Self {
        match e {
            Error::HiSource(e) => match e {},
        }
    }
}

#[cfg(not(feature = "parking-lot"))]
impl<T, E> From<std::sync::PoisonError<T>> for Error<E> {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
