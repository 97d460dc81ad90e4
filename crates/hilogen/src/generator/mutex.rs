#[cfg(feature = "parking-lot")]
pub use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
pub use std::sync::{Mutex, MutexGuard};

use crate::error::Error;

/// Enters the exclusive section guarded by `mutex`.
///
/// A poisoned `std` mutex surfaces as [`Error::LockPoisoned`]; `parking_lot`
/// mutexes cannot be poisoned.
#[inline]
pub(crate) fn lock<T, E>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, Error<E>> {
    #[cfg(feature = "parking-lot")]
    {
        Ok(mutex.lock())
    }
    #[cfg(not(feature = "parking-lot"))]
    {
        Ok(mutex.lock()?)
    }
}

/// Keeps hot shared fields on their own cache line when `cache-padded` is
/// enabled.
#[cfg(feature = "cache-padded")]
pub(crate) type Padded<T> = crossbeam_utils::CachePadded<T>;
#[cfg(not(feature = "cache-padded"))]
pub(crate) type Padded<T> = T;

#[inline]
pub(crate) const fn padded<T>(value: T) -> Padded<T> {
    #[cfg(feature = "cache-padded")]
    {
        crossbeam_utils::CachePadded::new(value)
    }
    #[cfg(not(feature = "cache-padded"))]
    {
        value
    }
}
