use core::fmt;

use crate::error::ConfigError;

/// Reserved hi value meaning "no hi value has been obtained yet".
///
/// This is `i64::MIN`. It is never a usable hi value: a [`HiSource`] must skip
/// it, and the generators refuse to combine it with a lo value.
///
/// [`HiSource`]: crate::HiSource
pub const UNINITIALIZED: i64 = i64::MIN;

/// How a hi value and a lo value are combined into an identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    /// `id = hi * capacity + lo`.
    ///
    /// Works with any hi source, but the produced identifiers are not
    /// compatible with the hi source itself (they live in a scaled space).
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "hilo"))]
    HiLo,

    /// `id = hi + lo`.
    ///
    /// Identifiers are compatible with the hi source, but the source must be
    /// sparse with a sparseness of at least `capacity - 1`, i.e. consecutive hi
    /// values must differ by at least `capacity`. This is a precondition the
    /// generator cannot check.
    Pooled,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HiLo => f.write_str("hilo"),
            Self::Pooled => f.write_str("pooled"),
        }
    }
}

/// Combines `hi` and `lo` into an identifier.
///
/// Arithmetic wraps on overflow, so the formula holds exactly modulo 2^64.
///
/// # Panics
///
/// Panics if `hi` is [`UNINITIALIZED`], if `lo` is outside `[0, capacity)` or
/// if `capacity` is not positive. Generators never pass such values; hitting
/// one of these assertions is a bug.
#[inline]
#[must_use]
pub const fn calculate_id(hi: i64, lo: i64, capacity: i64, mode: Mode) -> i64 {
    assert!(capacity > 0, "capacity must be positive");
    assert!(hi != UNINITIALIZED, "hi must not be UNINITIALIZED");
    assert!(lo >= 0 && lo < capacity, "lo must be in [0, capacity)");
    match mode {
        Mode::HiLo => hi.wrapping_mul(capacity).wrapping_add(lo),
        Mode::Pooled => hi.wrapping_add(lo),
    }
}

/// The immutable part of a Hi/Lo generator: how many lo values exist per hi
/// value, and how the two are combined.
///
/// A `Layout` can only be built with a positive capacity, so every generator
/// constructed from one is valid by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    capacity: i64,
    mode: Mode,
}

impl Layout {
    /// Creates a layout, failing if `capacity` is not positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] when `capacity <= 0`.
    ///
    /// # Example
    /// ```
    /// use hilogen::{Layout, Mode};
    ///
    /// let layout = Layout::new(10, Mode::HiLo).unwrap();
    /// assert_eq!(layout.calculate(2, 3), 23);
    ///
    /// let pooled = Layout::new(10, Mode::Pooled).unwrap();
    /// assert_eq!(pooled.calculate(20, 3), 23);
    ///
    /// assert!(Layout::new(0, Mode::HiLo).is_err());
    /// ```
    pub const fn new(capacity: i64, mode: Mode) -> Result<Self, ConfigError> {
        if capacity <= 0 {
            return Err(ConfigError::InvalidCapacity { capacity });
        }
        Ok(Self { capacity, mode })
    }

    /// Shorthand for a [`Mode::HiLo`] layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] when `capacity <= 0`.
    pub const fn hilo(capacity: i64) -> Result<Self, ConfigError> {
        Self::new(capacity, Mode::HiLo)
    }

    /// Shorthand for a [`Mode::Pooled`] layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] when `capacity <= 0`.
    pub const fn pooled(capacity: i64) -> Result<Self, ConfigError> {
        Self::new(capacity, Mode::Pooled)
    }

    /// Number of lo values usable per hi value (the open upper bound of lo).
    #[must_use]
    pub const fn capacity(&self) -> i64 {
        self.capacity
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Combines `hi` and `lo` into an identifier using this layout.
    ///
    /// # Panics
    ///
    /// See [`calculate_id`].
    #[inline]
    #[must_use]
    pub const fn calculate(&self, hi: i64, lo: i64) -> i64 {
        calculate_id(hi, lo, self.capacity, self.mode)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(capacity={})", self.mode, self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hilo_formula() {
        let layout = Layout::hilo(10).unwrap();
        assert_eq!(layout.calculate(0, 0), 0);
        assert_eq!(layout.calculate(0, 9), 9);
        assert_eq!(layout.calculate(1, 0), 10);
        assert_eq!(layout.calculate(7, 3), 73);
        assert_eq!(layout.calculate(-2, 5), -15);
    }

    #[test]
    fn pooled_formula() {
        let layout = Layout::pooled(5).unwrap();
        assert_eq!(layout.calculate(0, 4), 4);
        assert_eq!(layout.calculate(5, 0), 5);
        assert_eq!(layout.calculate(100, 2), 102);
    }

    #[test]
    fn capacity_one_is_identity_on_hi() {
        let layout = Layout::hilo(1).unwrap();
        for hi in [-3, 0, 1, 42, i64::MAX] {
            assert_eq!(layout.calculate(hi, 0), hi);
        }
    }

    #[test]
    fn hilo_wraps_on_overflow() {
        let layout = Layout::hilo(2).unwrap();
        assert_eq!(
            layout.calculate(i64::MAX, 1),
            i64::MAX.wrapping_mul(2).wrapping_add(1)
        );
    }

    #[test]
    fn rejects_non_positive_capacity() {
        assert_eq!(
            Layout::hilo(0),
            Err(ConfigError::InvalidCapacity { capacity: 0 })
        );
        assert_eq!(
            Layout::pooled(-5),
            Err(ConfigError::InvalidCapacity { capacity: -5 })
        );
    }

    #[test]
    #[should_panic(expected = "hi must not be UNINITIALIZED")]
    fn panics_on_uninitialized_hi() {
        let _ = calculate_id(UNINITIALIZED, 0, 10, Mode::HiLo);
    }

    #[test]
    #[should_panic(expected = "lo must be in [0, capacity)")]
    fn panics_on_lo_at_capacity() {
        let _ = calculate_id(0, 10, 10, Mode::HiLo);
    }

    #[test]
    #[should_panic(expected = "lo must be in [0, capacity)")]
    fn panics_on_negative_lo() {
        let _ = calculate_id(0, -1, 10, Mode::Pooled);
    }

    #[test]
    fn display() {
        assert_eq!(Layout::hilo(10).unwrap().to_string(), "hilo(capacity=10)");
        assert_eq!(
            Layout::pooled(3).unwrap().to_string(),
            "pooled(capacity=3)"
        );
    }
}
