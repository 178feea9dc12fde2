//! The reusable sorting engine.
//!
//! [`Sorter`] implements a stable adaptive merge sort (timsort):
//! - **Run detection**: Already ordered stretches are found and kept as runs; strictly
//!   descending ones are reversed in place.
//! - **Binary insertion sort**: Short runs are extended to a minimum length, and short ranges are
//!   sorted without merging at all.
//! - **Galloping merge**: Runs are merged through a scratch buffer, switching to exponential
//!   search when one run keeps winning.
//!
//! The scratch buffer and run stack belong to the sorter and survive between calls, so sorting
//! repeatedly through one sorter stops allocating once the buffer fits the largest merge seen.

use crate::buffer::ScratchBuffer;
use crate::core::{Sequence, SortConfig, resolve_range};
use crate::error::SortError;
use crate::merge::MergeState;
use crate::run::{binary_insertion_sort, count_run_and_make_ascending, min_run_length};
use log::trace;
use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::RangeBounds;

/// Counters describing the most recent sort call of a [`Sorter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Number of elements in the sorted range.
    pub len: usize,
    /// Runs pushed onto the pending-run stack, after extension to the minimum run length.
    pub runs: usize,
    /// Pairwise run merges performed.
    pub merges: usize,
    /// Times a merge entered galloping mode.
    pub gallops: usize,
}

/// A stable sorting engine that keeps its working memory between calls.
///
/// One sorter sorts one sequence at a time: every method takes `&mut self`, so sharing a
/// sorter between threads or reentering it from a comparison function is ruled out by the
/// borrow checker. Use one sorter per thread, or the pooled free functions such as
/// [`sort`](crate::sort), which keep one sorter per thread and element type.
///
/// # Examples
///
/// ```
/// use sortpool::Sorter;
///
/// let mut sorter = Sorter::new();
///
/// for frame in 0..3 {
///     let mut depths = vec![frame + 3, 1, frame + 2, 0];
///     sorter.sort(&mut depths).unwrap();
///     assert!(depths.windows(2).all(|w| w[0] <= w[1]));
/// }
/// ```
pub struct Sorter<T> {
    config: SortConfig,
    scratch: ScratchBuffer<T>,
    state: MergeState,
    stats: SortStats,
}

impl<T> Sorter<T> {
    /// Creates a sorter with the default configuration and no scratch memory yet.
    pub fn new() -> Self {
        let config = SortConfig::default();
        Self {
            config,
            scratch: ScratchBuffer::new(),
            state: MergeState::new(config.min_gallop),
            stats: SortStats::default(),
        }
    }

    /// Creates a sorter with custom tuning.
    pub fn with_config(config: SortConfig) -> Result<Self, SortError> {
        config.validate()?;
        Ok(Self {
            config,
            scratch: ScratchBuffer::new(),
            state: MergeState::new(config.min_gallop),
            stats: SortStats::default(),
        })
    }

    /// Creates a sorter whose scratch buffer already holds `capacity` slots.
    ///
    /// Merging a range of `n` elements never needs more than `n / 2` slots.
    pub fn with_capacity(capacity: usize) -> Result<Self, SortError> {
        let mut sorter = Self::new();
        sorter.scratch = ScratchBuffer::with_capacity(capacity)?;
        Ok(sorter)
    }

    /// Tuning in effect for this sorter.
    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Current size of the scratch buffer, in elements. Never decreases.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// Counters of the most recent sort call.
    pub fn last_stats(&self) -> SortStats {
        self.stats
    }

    /// Sorts the whole sequence by the natural order of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortpool::Sorter;
    ///
    /// let mut sorter = Sorter::new();
    /// let mut data = [5, 3, 1, 4, 2];
    /// sorter.sort(&mut data).unwrap();
    ///
    /// assert_eq!(data, [1, 2, 3, 4, 5]);
    /// ```
    pub fn sort<S>(&mut self, seq: &mut S) -> Result<(), SortError>
    where
        S: Sequence<Item = T> + ?Sized,
        T: Ord,
    {
        self.sort_range(seq, ..)
    }

    /// Sorts `range` of the sequence by the natural order of `T`.
    ///
    /// Elements outside `range` are never touched. A reversed or out-of-bounds range fails
    /// with [`SortError::InvalidRange`] before anything is moved.
    pub fn sort_range<S, R>(&mut self, seq: &mut S, range: R) -> Result<(), SortError>
    where
        S: Sequence<Item = T> + ?Sized,
        R: RangeBounds<usize>,
        T: Ord,
    {
        self.sort_by_range(seq, range, T::cmp)
    }

    /// Sorts the whole sequence with a comparison function.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortpool::Sorter;
    ///
    /// let mut sorter = Sorter::new();
    /// let mut pairs = vec![(1, 'a'), (1, 'b'), (0, 'c')];
    /// sorter.sort_by(&mut pairs, |a, b| a.0.cmp(&b.0)).unwrap();
    ///
    /// assert_eq!(pairs, vec![(0, 'c'), (1, 'a'), (1, 'b')]);
    /// ```
    pub fn sort_by<S, F>(&mut self, seq: &mut S, compare: F) -> Result<(), SortError>
    where
        S: Sequence<Item = T> + ?Sized,
        F: FnMut(&T, &T) -> Ordering,
    {
        self.sort_by_range(seq, .., compare)
    }

    /// Sorts `range` of the sequence with a comparison function.
    ///
    /// `compare` must implement a total order. When it does not, the call either completes with
    /// an unspecified order or fails with [`SortError::ComparisonContract`]; in both cases the
    /// sequence keeps every one of its elements.
    pub fn sort_by_range<S, R, F>(
        &mut self,
        seq: &mut S,
        range: R,
        mut compare: F,
    ) -> Result<(), SortError>
    where
        S: Sequence<Item = T> + ?Sized,
        R: RangeBounds<usize>,
        F: FnMut(&T, &T) -> Ordering,
    {
        let items = seq.as_mut_items();
        let (from, to) = resolve_range(range, items.len())?;
        self.merge_sort(&mut items[from..to], &mut |a, b| {
            compare(a, b) == Ordering::Less
        })
    }

    /// Sorts the whole sequence by a key extracted from each element.
    pub fn sort_by_key<S, K, F>(&mut self, seq: &mut S, mut key: F) -> Result<(), SortError>
    where
        S: Sequence<Item = T> + ?Sized,
        K: Ord,
        F: FnMut(&T) -> K,
    {
        self.sort_by_range(seq, .., |a, b| key(a).cmp(&key(b)))
    }

    fn merge_sort<F>(&mut self, v: &mut [T], is_less: &mut F) -> Result<(), SortError>
    where
        F: FnMut(&T, &T) -> bool,
    {
        let len = v.len();
        self.state.reset();
        self.stats = SortStats {
            len,
            ..SortStats::default()
        };

        // Zero-sized values carry no order to restore.
        if len < 2 || mem::size_of::<T>() == 0 {
            return Ok(());
        }

        // Short ranges: one binary insertion sort, no merging.
        if len < self.config.min_merge {
            let init_run_len = count_run_and_make_ascending(v, is_less);
            binary_insertion_sort(v, init_run_len, is_less);
            self.stats.runs = 1;
            return Ok(());
        }

        let min_run = min_run_length(len, self.config.min_merge);
        let mut lo = 0;
        while lo < len {
            let remaining = len - lo;
            let mut run_len = count_run_and_make_ascending(&mut v[lo..], is_less);

            // Extend a short natural run to min(min_run, remaining).
            if run_len < min_run {
                let force = remaining.min(min_run);
                binary_insertion_sort(&mut v[lo..lo + force], run_len, is_less);
                run_len = force;
            }

            self.state.push_run(lo, run_len);
            self.stats.runs += 1;
            let collapsed = self.state.merge_collapse(v, &mut self.scratch, is_less);
            self.record_merges();
            collapsed?;
            lo += run_len;
        }

        let collapsed = self.state.merge_force_collapse(v, &mut self.scratch, is_less);
        self.record_merges();
        collapsed?;
        debug_assert_eq!(self.state.pending_runs(), 1);

        trace!(
            "sorted {} elements: {} runs, {} merges, {} gallops",
            len, self.stats.runs, self.stats.merges, self.stats.gallops
        );
        Ok(())
    }

    // Copied after every merge phase so failed calls still report what they did.
    fn record_merges(&mut self) {
        self.stats.merges = self.state.merges;
        self.stats.gallops = self.state.gallops;
    }
}

impl<T> Default for Sorter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Sorter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sorter")
            .field("config", &self.config)
            .field("scratch_capacity", &self.scratch.capacity())
            .field("last_stats", &self.stats)
            .finish()
    }
}
