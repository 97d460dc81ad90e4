use core::ops::{Deref, DerefMut};

use portable_atomic::{AtomicU64, Ordering, fence};

use crate::{
    error::Error,
    generator::mutex::{Mutex, MutexGuard, Padded, lock, padded},
};

/// A version observed by an optimistic reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Stamp(u64);

/// An exclusive lock with optimistic reads, in the spirit of a seqlock.
///
/// The version is even while no writer holds the lock and odd while one does.
/// A reader takes a [`Stamp`] of an even version, performs its unsynchronized
/// reads, then validates that the version did not move. Writers are
/// serialized by the inner [`Mutex`], which also owns the protected value.
pub(crate) struct StampedLock<T> {
    version: Padded<AtomicU64>,
    inner: Mutex<T>,
}

impl<T> StampedLock<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            version: padded(AtomicU64::new(0)),
            inner: Mutex::new(value),
        }
    }

    /// Returns a stamp for an optimistic read, or `None` while a writer holds
    /// the lock.
    #[inline]
    pub(crate) fn try_optimistic_read(&self) -> Option<Stamp> {
        let version = self.version.load(Ordering::Acquire);
        (version & 1 == 0).then_some(Stamp(version))
    }

    /// Returns `true` if no writer acquired the lock since `stamp` was taken.
    #[inline]
    pub(crate) fn validate(&self, stamp: Stamp) -> bool {
        fence(Ordering::Acquire);
        self.version.load(Ordering::Relaxed) == stamp.0
    }

    /// Acquires the lock exclusively, invalidating every outstanding stamp.
    pub(crate) fn write<E>(&self) -> Result<StampedWriteGuard<'_, T>, Error<E>> {
        let guard = lock::<_, E>(&self.inner)?;
        self.version.fetch_add(1, Ordering::Relaxed);
        fence(Ordering::Release);
        Ok(StampedWriteGuard {
            version: &self.version,
            guard,
        })
    }
}

/// Exclusive access to the value of a [`StampedLock`].
///
/// Dropping the guard, including during unwinding, makes the version even
/// again before the inner mutex is released.
pub(crate) struct StampedWriteGuard<'a, T> {
    version: &'a AtomicU64,
    guard: MutexGuard<'a, T>,
}

impl<T> Drop for StampedWriteGuard<'_, T> {
    fn drop(&mut self) {
        self.version.fetch_add(1, Ordering::Release);
    }
}

impl<T> Deref for StampedWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for StampedWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimistic_read_validates_without_writers() {
        let lock = StampedLock::new(0_u8);
        let stamp = lock.try_optimistic_read().unwrap();
        assert!(lock.validate(stamp));
        assert!(lock.validate(stamp));
    }

    #[test]
    fn writer_invalidates_stamp() {
        let lock = StampedLock::new(0_u8);
        let stamp = lock.try_optimistic_read().unwrap();
        {
            let mut guard = lock.write::<()>().unwrap();
            *guard += 1;
            assert!(lock.try_optimistic_read().is_none());
            assert!(!lock.validate(stamp));
        }
        assert!(!lock.validate(stamp));

        let fresh = lock.try_optimistic_read().unwrap();
        assert_ne!(fresh, stamp);
        assert!(lock.validate(fresh));
        assert_eq!(*lock.write::<()>().unwrap(), 1);
    }

    #[test]
    fn version_restored_after_panic_in_writer() {
        let lock = StampedLock::new(0_u8);
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = lock.write::<()>().unwrap();
            panic!("writer failed");
        }));
        assert!(lock.try_optimistic_read().is_some());
    }
}
