use core::fmt;

/// A source of hi values.
///
/// In practice this is usually a database sequence or another persistent
/// counter, and each call may take a noticeable amount of time. Generators
/// call it rarely: once on first use and then once every `capacity`
/// identifiers.
///
/// Generators own their source inside their exclusive section, so
/// `next_hi` is never invoked concurrently by the same generator and the
/// source only needs to be [`Send`]. A source shared between several
/// generators is responsible for its own synchronization.
///
/// Implementations must never return [`UNINITIALIZED`]; a counter that would
/// naturally produce it must skip to the following value. Generators request
/// a replacement if it is returned anyway.
///
/// # Example
///
/// ```
/// use hilogen::HiSource;
///
/// struct Sequence(i64);
///
/// impl HiSource for Sequence {
///     type Err = core::convert::Infallible;
///
///     fn next_hi(&mut self) -> Result<i64, Self::Err> {
///         self.0 += 1;
///         Ok(self.0)
///     }
/// }
///
/// let mut seq = Sequence(0);
/// assert_eq!(seq.next_hi(), Ok(1));
/// assert_eq!(seq.next_hi(), Ok(2));
/// ```
///
/// [`UNINITIALIZED`]: crate::UNINITIALIZED
pub trait HiSource {
    /// The error returned when the upstream cannot supply a value.
    type Err: fmt::Debug;

    /// Returns the next hi value.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream fails. The generator propagates it to
    /// the caller of `try_generate` without retrying.
    fn next_hi(&mut self) -> Result<i64, Self::Err>;
}

impl<S: HiSource + ?Sized> HiSource for &mut S {
    type Err = S::Err;

    fn next_hi(&mut self) -> Result<i64, Self::Err> {
        (**self).next_hi()
    }
}

impl<S: HiSource + ?Sized> HiSource for Box<S> {
    type Err = S::Err;

    fn next_hi(&mut self) -> Result<i64, Self::Err> {
        (**self).next_hi()
    }
}
