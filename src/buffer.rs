//! Scratch storage reused by consecutive merges and sort calls.

use crate::error::SortError;
use log::debug;
use std::mem::MaybeUninit;

/// Growable array of uninitialised element slots owned by one [`Sorter`](crate::Sorter).
///
/// Only the spare capacity of `slots` is used; its length stays 0. Slots never hold live
/// values outside of a single merge, so the buffer needs no clearing between calls and
/// dropping it never drops an element.
pub(crate) struct ScratchBuffer<T> {
    slots: Vec<T>,
}

impl<T> ScratchBuffer<T> {
    /// Creates an empty buffer. Nothing is allocated until the first merge needs it.
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Creates a buffer with room for at least `capacity` elements.
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, SortError> {
        let mut buffer = Self::new();
        buffer.reallocate(capacity)?;
        Ok(buffer)
    }

    /// Number of elements the buffer can hold without growing.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Guarantees room for at least `min_capacity` elements and returns the slots.
    ///
    /// When the buffer is too small it is replaced by a fresh allocation of the smallest power
    /// of two above `min_capacity`, capped at half of `sorted_len` (the length of the range
    /// being sorted). Old contents are abandoned, never copied, and the buffer never shrinks.
    pub(crate) fn ensure_capacity(
        &mut self,
        min_capacity: usize,
        sorted_len: usize,
    ) -> Result<&mut [MaybeUninit<T>], SortError> {
        if self.capacity() < min_capacity {
            let new_size = min_capacity
                .checked_add(1)
                .and_then(usize::checked_next_power_of_two)
                .map_or(min_capacity, |size| size.min(sorted_len / 2))
                .max(min_capacity);

            debug!(
                "growing scratch buffer from {} to {} slots",
                self.capacity(),
                new_size
            );
            self.reallocate(new_size)?;
        }

        Ok(self.slots.spare_capacity_mut())
    }

    fn reallocate(&mut self, capacity: usize) -> Result<(), SortError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| SortError::Allocation {
                requested: capacity,
            })?;
        self.slots = slots;
        Ok(())
    }
}
