//! Core traits and types for sortpool.
//!
//! This module defines:
//! - [`Sequence`]: The trait through which the sorter reaches the elements of a collection.
//! - [`SortConfig`]: Tuning knobs for run length and galloping.
//! - Range resolution shared by every ranged entry point.

use crate::error::SortError;
use std::collections::VecDeque;
use std::ops::{Bound, RangeBounds};

/// Sequences shorter than this are sorted with a single binary insertion sort.
pub const MIN_MERGE: usize = 32;

/// Initial number of consecutive wins after which a merge switches to galloping.
pub const MIN_GALLOP: usize = 7;

/// A contiguous, mutable collection the sorter can reorder in place.
///
/// Implementations hand out their logical contents as one slice. For growable containers
/// this is the initialised prefix of the backing storage, never the spare capacity.
///
/// # Examples
///
/// Implementing for a custom container:
///
/// ```
/// use sortpool::core::Sequence;
///
/// struct Scores {
///     values: Vec<u32>,
/// }
///
/// impl Sequence for Scores {
///     type Item = u32;
///
///     fn as_mut_items(&mut self) -> &mut [u32] {
///         &mut self.values
///     }
/// }
///
/// let mut scores = Scores { values: vec![30, 10, 20] };
/// sortpool::sort(&mut scores).unwrap();
/// assert_eq!(scores.values, vec![10, 20, 30]);
/// ```
pub trait Sequence {
    /// Element type being sorted.
    type Item;

    /// Returns the elements of the sequence as one mutable slice.
    fn as_mut_items(&mut self) -> &mut [Self::Item];
}

impl<T> Sequence for [T] {
    type Item = T;

    fn as_mut_items(&mut self) -> &mut [T] {
        self
    }
}

impl<T, const N: usize> Sequence for [T; N] {
    type Item = T;

    fn as_mut_items(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

// Sorts the logical length only; spare capacity is never visited.
impl<T> Sequence for Vec<T> {
    type Item = T;

    fn as_mut_items(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Sequence for Box<[T]> {
    type Item = T;

    fn as_mut_items(&mut self) -> &mut [T] {
        self
    }
}

// Rotates the ring buffer so it is contiguous. Indices keep their logical meaning.
impl<T> Sequence for VecDeque<T> {
    type Item = T;

    fn as_mut_items(&mut self) -> &mut [T] {
        self.make_contiguous()
    }
}

/// Tuning parameters of a [`Sorter`](crate::Sorter).
///
/// The defaults are the classic timsort values and rarely need changing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortConfig {
    /// Ranges shorter than this skip run merging entirely. Must be at least 2.
    pub min_merge: usize,
    /// Starting gallop threshold of every sort call. Must be at least 1.
    pub min_gallop: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            min_merge: MIN_MERGE,
            min_gallop: MIN_GALLOP,
        }
    }
}

impl SortConfig {
    /// Checks that both parameters are in their valid domain.
    pub fn validate(&self) -> Result<(), SortError> {
        if self.min_merge < 2 {
            return Err(SortError::InvalidConfig {
                reason: "min_merge must be at least 2",
            });
        }
        if self.min_gallop < 1 {
            return Err(SortError::InvalidConfig {
                reason: "min_gallop must be at least 1",
            });
        }
        Ok(())
    }
}

/// Resolves `range` against a sequence of length `len` into a half-open `(from, to)` pair.
pub(crate) fn resolve_range<R: RangeBounds<usize>>(
    range: R,
    len: usize,
) -> Result<(usize, usize), SortError> {
    let from = match range.start_bound() {
        Bound::Included(&from) => Some(from),
        Bound::Excluded(&from) => from.checked_add(1),
        Bound::Unbounded => Some(0),
    };
    let to = match range.end_bound() {
        Bound::Included(&to) => to.checked_add(1),
        Bound::Excluded(&to) => Some(to),
        Bound::Unbounded => Some(len),
    };

    match (from, to) {
        (Some(from), Some(to)) if from <= to && to <= len => Ok((from, to)),
        (from, to) => Err(SortError::InvalidRange {
            from: from.unwrap_or(usize::MAX),
            to: to.unwrap_or(usize::MAX),
            len,
        }),
    }
}
