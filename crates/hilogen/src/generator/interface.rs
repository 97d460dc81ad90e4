use core::convert::Infallible;

use crate::{error::Error, layout::Layout, source::HiSource};

/// A minimal interface for Hi/Lo identifier generators.
///
/// Every strategy in this crate implements it, so code that only needs
/// identifiers can stay generic over how they are synchronized.
pub trait HiLoGenerator<S>
where
    S: HiSource,
{
    /// Creates a generator that draws hi values from `source`.
    ///
    /// No hi value is requested until the first identifier is generated.
    fn new(layout: Layout, source: S) -> Self;

    /// The layout identifiers are computed with.
    fn layout(&self) -> Layout;

    /// Generates the next identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HiSource`] if a new hi value was needed and the source
    /// failed, or [`Error::LockPoisoned`] if another thread panicked inside the
    /// exclusive section (`std` mutexes only).
    fn try_generate(&self) -> Result<i64, Error<S::Err>>;

    /// Generates the next identifier when no error is possible.
    ///
    /// This is the infallible counterpart to [`HiLoGenerator::try_generate`].
    /// It is only callable when the generator error is uninhabited, i.e. with
    /// the `parking-lot` feature and an infallible [`HiSource`].
    fn generate(&self) -> i64
    where
        Error<S::Err>: Into<Infallible>,
    {
        match self.try_generate() {
            Ok(id) => id,
            Err(e) => {
                #[allow(unreachable_code)]
                // `into()` satisfies the trait bound at compile time.
                match Into::<Infallible>::into(e) {}
            }
        }
    }
}
