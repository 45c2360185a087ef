//! Deferred result ownership.
//!
//! Variable-output encoders do not know their output size up front. Instead of making
//! the caller guess, the finished buffer is parked here under a fresh handle and the
//! caller is told `(handle, size)`. It then allocates exactly `size` bytes and picks the
//! result up, which copies it out and frees the parked buffer.
//!
//! Handles are minted from a monotonic counter and never recycled, so a pickup can
//! succeed at most once per handle. Buffers that are never picked up are released when
//! the registry is dropped or [`ResultRegistry::drain`]ed.

use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, MutexGuard},
};

use crate::error::{Result, TexWrapError};

/// Identifies one pending result.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Debug)]
#[repr(transparent)]
pub struct ResultHandle(i32);

impl ResultHandle {
    /// Rebuilds a handle from the raw value a caller passed back.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ResultHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A result owned by the registry until pickup.
struct PendingResult {
    buffer: Vec<u8>,
}

struct RegistryState {
    entries: HashMap<ResultHandle, PendingResult>,
    next_handle: i32,
}

/// Ownership table from handle to parked result buffer.
pub struct ResultRegistry {
    state: Mutex<RegistryState>,
}

impl ResultRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                entries: HashMap::new(),
                next_handle: 1,
            }),
        }
    }

    // No operation panics while holding the lock, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Takes ownership of `buffer` and returns the handle it is parked under.
    ///
    /// Only the first `size` bytes are kept.
    pub fn store(&self, mut buffer: Vec<u8>, size: usize) -> Result<ResultHandle> {
        if size > buffer.len() {
            return Err(TexWrapError::AllocationFailure { size });
        }
        buffer.truncate(size);

        let mut state = self.lock();
        let handle = ResultHandle(state.next_handle);
        state.next_handle = state
            .next_handle
            .checked_add(1)
            .ok_or(TexWrapError::AllocationFailure { size })?;
        state.entries.insert(handle, PendingResult { buffer });

        log::debug!("stored result {handle} ({size} bytes)");

        Ok(handle)
    }

    /// Copies `expected_size` bytes of the result into `destination` and releases it.
    ///
    /// Fails without side effects when the handle is unknown or already consumed, when
    /// `expected_size` is larger than the stored result, or when `destination` is shorter
    /// than `expected_size`. In the last two cases the result stays pending.
    pub fn pickup(
        &self,
        handle: ResultHandle,
        destination: &mut [u8],
        expected_size: usize,
    ) -> Result<()> {
        let mut state = self.lock();

        let pending = state
            .entries
            .get(&handle)
            .ok_or(TexWrapError::InvalidHandle {
                handle: handle.raw(),
            })?;
        TexWrapError::check_len(expected_size, pending.buffer.len())?;
        TexWrapError::check_len(expected_size, destination.len())?;

        if let Some(pending) = state.entries.remove(&handle) {
            destination[..expected_size].copy_from_slice(&pending.buffer[..expected_size]);
        }

        log::debug!("picked up result {handle} ({expected_size} bytes)");

        Ok(())
    }

    /// Size of a pending result, `None` if the handle is not pending.
    pub fn pending_size(&self, handle: ResultHandle) -> Option<usize> {
        self.lock()
            .entries
            .get(&handle)
            .map(|pending| pending.buffer.len())
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frees every pending result and returns how many there were.
    ///
    /// The handle counter is not reset.
    pub fn drain(&self) -> usize {
        let mut state = self.lock();
        let count = state.entries.len();
        state.entries.clear();

        if count > 0 {
            log::debug!("released {count} unpicked results");
        }

        count
    }
}

impl Default for ResultRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_succeeds_exactly_once() {
        let registry = ResultRegistry::new();
        let handle = registry.store(vec![1, 2, 3, 4], 4).unwrap();

        let mut destination = [0u8; 4];
        registry.pickup(handle, &mut destination, 4).unwrap();
        assert_eq!(destination, [1, 2, 3, 4]);

        let mut second = [9u8; 4];
        assert!(matches!(
            registry.pickup(handle, &mut second, 4),
            Err(TexWrapError::InvalidHandle { .. })
        ));
        assert_eq!(second, [9u8; 4]);
        assert!(registry.is_empty());
    }

    #[test]
    fn handles_are_never_reused() {
        let registry = ResultRegistry::new();
        let first = registry.store(vec![0; 8], 8).unwrap();
        registry.pickup(first, &mut [0; 8], 8).unwrap();
        let second = registry.store(vec![0; 8], 8).unwrap();
        registry.drain();
        let third = registry.store(vec![0; 8], 8).unwrap();

        assert!(first < second && second < third);
        assert_eq!(first.raw(), 1);
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let registry = ResultRegistry::new();
        let mut destination = [0u8; 4];
        for raw in [-1, 0, 1, 42] {
            assert!(registry
                .pickup(ResultHandle::from_raw(raw), &mut destination, 4)
                .is_err());
        }
    }

    #[test]
    fn oversized_pickup_keeps_result_pending() {
        let registry = ResultRegistry::new();
        let handle = registry.store(vec![7; 16], 16).unwrap();

        assert!(matches!(
            registry.pickup(handle, &mut [0; 32], 32),
            Err(TexWrapError::BufferTooSmall {
                required: 32,
                actual: 16
            })
        ));
        assert!(registry.pickup(handle, &mut [0; 8], 16).is_err());
        assert_eq!(registry.pending_size(handle), Some(16));

        let mut destination = [0u8; 16];
        registry.pickup(handle, &mut destination, 16).unwrap();
        assert_eq!(destination, [7; 16]);
    }

    #[test]
    fn partial_pickup_copies_prefix() {
        let registry = ResultRegistry::new();
        let handle = registry.store(vec![1, 2, 3, 4, 5, 6], 6).unwrap();

        let mut destination = [0u8; 6];
        registry.pickup(handle, &mut destination, 3).unwrap();
        assert_eq!(destination, [1, 2, 3, 0, 0, 0]);
        assert_eq!(registry.pending_size(handle), None);
    }

    #[test]
    fn store_truncates_to_size() {
        let registry = ResultRegistry::new();
        let handle = registry.store(vec![1; 64], 10).unwrap();
        assert_eq!(registry.pending_size(handle), Some(10));
        assert!(registry.store(vec![1; 4], 5).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn drain_releases_everything() {
        let registry = ResultRegistry::new();
        let handles: Vec<_> = (0..5)
            .map(|index| registry.store(vec![index; 4], 4).unwrap())
            .collect();

        assert_eq!(registry.drain(), 5);
        assert_eq!(registry.drain(), 0);
        for handle in handles {
            assert!(registry.pickup(handle, &mut [0; 4], 4).is_err());
        }
    }
}
