//! Cache-line isolation for transactionally shared data

use std::ops::{Deref, DerefMut};

/// Assumed cache line size in bytes
pub const CACHE_LINE_SIZE: usize = 64;

/// Value padded and aligned to its own cache line
///
/// Two unrelated values in the same line make independent transactions
/// conflict with each other. Wrap every location a critical section writes.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(T);

impl<T> CacheAligned<T> {
    /// Wrap a value
    pub const fn new(value: T) -> Self {
        CacheAligned(value)
    }

    /// Unwrap the value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for CacheAligned<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for CacheAligned<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
