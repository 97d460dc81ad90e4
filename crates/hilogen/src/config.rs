use core::fmt;

use crate::{
    error::ConfigError,
    generator::DEFAULT_MAX_OPTIMISTIC_ATTEMPTS,
    layout::{Layout, Mode},
};

/// The concurrency strategy an [`IdGenerator`] uses.
///
/// [`IdGenerator`]: crate::IdGenerator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// Every call takes the exclusive section. See [`LockHiLoGenerator`].
    ///
    /// [`LockHiLoGenerator`]: crate::LockHiLoGenerator
    Lock,

    /// Optimistic lo claims validated by re-reading hi, with a bounded number
    /// of retries. See [`AtomicHiLoGenerator`].
    ///
    /// [`AtomicHiLoGenerator`]: crate::AtomicHiLoGenerator
    #[default]
    Optimistic,

    /// Optimistic lo claims validated with a stamped lock. See
    /// [`StampedHiLoGenerator`].
    ///
    /// [`StampedHiLoGenerator`]: crate::StampedHiLoGenerator
    Stamped,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lock => f.write_str("lock"),
            Self::Optimistic => f.write_str("optimistic"),
            Self::Stamped => f.write_str("stamped"),
        }
    }
}

#[cfg(feature = "serde")]
const fn default_max_optimistic_attempts() -> u32 {
    DEFAULT_MAX_OPTIMISTIC_ATTEMPTS
}

/// Construction-time configuration of an [`IdGenerator`].
///
/// Only `capacity` is required; the other fields default to [`Mode::HiLo`],
/// [`Strategy::Optimistic`] and [`DEFAULT_MAX_OPTIMISTIC_ATTEMPTS`]. With the
/// `serde` feature the same defaults apply to missing fields when
/// deserializing.
///
/// # Example
/// ```
/// use hilogen::{HiLoConfig, Mode, Strategy};
///
/// let config = HiLoConfig::new(100)
///     .with_mode(Mode::Pooled)
///     .with_strategy(Strategy::Stamped);
///
/// let layout = config.layout().unwrap();
/// assert_eq!(layout.capacity(), 100);
/// assert_eq!(layout.mode(), Mode::Pooled);
/// ```
///
/// [`IdGenerator`]: crate::IdGenerator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HiLoConfig {
    /// Number of identifiers per hi value. Must be positive.
    pub capacity: i64,
    /// How hi and lo are combined.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: Mode,
    /// How concurrent callers are synchronized.
    #[cfg_attr(feature = "serde", serde(default))]
    pub strategy: Strategy,
    /// Optimistic attempts before falling back to the exclusive section.
    /// Ignored by [`Strategy::Lock`].
    #[cfg_attr(
        feature = "serde",
        serde(default = "default_max_optimistic_attempts")
    )]
    pub max_optimistic_attempts: u32,
}

impl HiLoConfig {
    #[must_use]
    pub const fn new(capacity: i64) -> Self {
        Self {
            capacity,
            mode: Mode::HiLo,
            strategy: Strategy::Optimistic,
            max_optimistic_attempts: DEFAULT_MAX_OPTIMISTIC_ATTEMPTS,
        }
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_max_optimistic_attempts(mut self, attempts: u32) -> Self {
        self.max_optimistic_attempts = attempts;
        self
    }

    /// Validates the configuration and returns the resulting [`Layout`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] when `capacity <= 0`.
    pub const fn layout(&self) -> Result<Layout, ConfigError> {
        Layout::new(self.capacity, self.mode)
    }
}

impl From<Layout> for HiLoConfig {
    fn from(layout: Layout) -> Self {
        Self::new(layout.capacity()).with_mode(layout.mode())
    }
}
