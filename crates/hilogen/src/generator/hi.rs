use crate::{error::Error, layout::UNINITIALIZED, source::HiSource};

/// Requests the next hi value, asking again whenever the source hands out the
/// reserved [`UNINITIALIZED`] value.
///
/// Callers must hold the generator's exclusive section.
pub(crate) fn obtain_hi<S>(source: &mut S) -> Result<i64, Error<S::Err>>
where
    S: HiSource + ?Sized,
{
    loop {
        let hi = source.next_hi().map_err(Error::HiSource)?;
        if hi != UNINITIALIZED {
            return Ok(hi);
        }
        #[cfg(feature = "tracing")]
        tracing::warn!("hi source returned the reserved UNINITIALIZED value; requesting another");
    }
}
