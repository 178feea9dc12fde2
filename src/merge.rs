//! Pending-run stack and the galloping merge.
//!
//! Runs are pushed in the order they are found and merged according to the stack invariant:
//! - `len[i - 2] > len[i - 1] + len[i]`
//! - `len[i - 1] > len[i]`
//!
//! The invariant is checked on the top four entries, which is required for it to hold for the
//! whole stack. It keeps run lengths growing at least as fast as the Fibonacci numbers from top
//! to bottom, which bounds the stack depth and keeps merges balanced.

use crate::buffer::ScratchBuffer;
use crate::error::SortError;
use crate::run::{gallop_left, gallop_right};
use cuneiform::cuneiform;
use std::ptr;
use std::slice;

/// Capacity of the pending-run stack.
///
/// Every run holds at least one element and the invariant makes lengths grow like Fibonacci
/// numbers, so no slice of at most `isize::MAX` elements can need more entries than this.
const MAX_RUN_STACK: usize = 96;

// Cache-aligned run bookkeeping.
#[cuneiform]
struct RunStack {
    base: [usize; MAX_RUN_STACK],
    len: [usize; MAX_RUN_STACK],
    size: usize,
}

/// Merge bookkeeping of one [`Sorter`](crate::Sorter): the run stack and the adaptive gallop
/// threshold, both reset at the start of every sort call.
pub(crate) struct MergeState {
    runs: RunStack,
    min_gallop: usize,
    initial_gallop: usize,
    pub(crate) merges: usize,
    pub(crate) gallops: usize,
}

impl MergeState {
    pub(crate) fn new(min_gallop: usize) -> Self {
        Self {
            runs: RunStack {
                base: [0; MAX_RUN_STACK],
                len: [0; MAX_RUN_STACK],
                size: 0,
            },
            min_gallop,
            initial_gallop: min_gallop,
            merges: 0,
            gallops: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.runs.size = 0;
        self.min_gallop = self.initial_gallop;
        self.merges = 0;
        self.gallops = 0;
    }

    pub(crate) fn pending_runs(&self) -> usize {
        self.runs.size
    }

    pub(crate) fn push_run(&mut self, base: usize, len: usize) {
        let runs = &mut self.runs;
        debug_assert!(runs.size < MAX_RUN_STACK);
        runs.base[runs.size] = base;
        runs.len[runs.size] = len;
        runs.size += 1;
    }

    /// Merges runs until the stack invariant holds again. Called after every push.
    pub(crate) fn merge_collapse<T, F>(
        &mut self,
        v: &mut [T],
        scratch: &mut ScratchBuffer<T>,
        is_less: &mut F,
    ) -> Result<(), SortError>
    where
        F: FnMut(&T, &T) -> bool,
    {
        while self.runs.size > 1 {
            let len = &self.runs.len;
            let mut n = self.runs.size - 2;
            if (n > 0 && len[n - 1] <= len[n] + len[n + 1])
                || (n > 1 && len[n - 2] <= len[n - 1] + len[n])
            {
                if len[n - 1] < len[n + 1] {
                    n -= 1;
                }
            } else if len[n] > len[n + 1] {
                break;
            }
            self.merge_at(n, v, scratch, is_less)?;
        }
        Ok(())
    }

    /// Merges all remaining runs into one. Called once the whole range has been scanned.
    pub(crate) fn merge_force_collapse<T, F>(
        &mut self,
        v: &mut [T],
        scratch: &mut ScratchBuffer<T>,
        is_less: &mut F,
    ) -> Result<(), SortError>
    where
        F: FnMut(&T, &T) -> bool,
    {
        while self.runs.size > 1 {
            let len = &self.runs.len;
            let mut n = self.runs.size - 2;
            if n > 0 && len[n - 1] < len[n + 1] {
                n -= 1;
            }
            self.merge_at(n, v, scratch, is_less)?;
        }
        Ok(())
    }

    /// Merges the adjacent runs at stack positions `i` and `i + 1`.
    ///
    /// `i` must be the second or third entry from the top.
    fn merge_at<T, F>(
        &mut self,
        i: usize,
        v: &mut [T],
        scratch: &mut ScratchBuffer<T>,
        is_less: &mut F,
    ) -> Result<(), SortError>
    where
        F: FnMut(&T, &T) -> bool,
    {
        let runs = &mut self.runs;
        debug_assert!(runs.size >= 2);
        debug_assert!(i + 2 == runs.size || i + 3 == runs.size);

        let mut base1 = runs.base[i];
        let mut len1 = runs.len[i];
        let base2 = runs.base[i + 1];
        let mut len2 = runs.len[i + 1];
        debug_assert!(len1 > 0 && len2 > 0);
        debug_assert_eq!(base1 + len1, base2);

        // Record the combined run. If merging the 3rd and 2nd from the top, slide the top down.
        runs.len[i] = len1 + len2;
        if i + 3 == runs.size {
            runs.base[i + 1] = runs.base[i + 2];
            runs.len[i + 1] = runs.len[i + 2];
        }
        runs.size -= 1;
        self.merges += 1;

        // Elements of run1 not greater than the first element of run2 are already in place.
        let k = gallop_right(&v[base2], &v[base1..base2], 0, is_less);
        base1 += k;
        len1 -= k;
        if len1 == 0 {
            return Ok(());
        }

        // Elements of run2 not less than the last element of run1 are already in place.
        len2 = gallop_left(&v[base2 - 1], &v[base2..base2 + len2], len2 - 1, is_less);
        if len2 == 0 {
            return Ok(());
        }

        let sorted_len = v.len();
        let merged = &mut v[base1..base2 + len2];
        let buf = scratch
            .ensure_capacity(len1.min(len2), sorted_len)?
            .as_mut_ptr()
            .cast::<T>();

        // SAFETY: `merged` holds exactly `len1 + len2` elements split at `len1`, both runs are
        // non-empty and sorted, the trimming above established the first element of run2 as the
        // smallest and the last element of run1 as the largest, and `buf` has room for the
        // shorter run without overlapping `merged`.
        unsafe {
            if len1 <= len2 {
                self.merge_lo(merged.as_mut_ptr(), len1, len2, buf, is_less)
            } else {
                self.merge_hi(merged.as_mut_ptr(), len1, len2, buf, is_less)
            }
        }
    }

    /// Merges `len1` elements at `base` with the `len2` elements following them, in place and
    /// front to back. Run1 must not be longer than run2 and is moved into `buf` first.
    ///
    /// # Safety
    ///
    /// `base..base + len1 + len2` must be valid for reads and writes and hold two sorted runs,
    /// `v[base]` must be greater than `v[base + len1]` and the last element of run1 greater than
    /// every element of run2. `buf` must be valid for `len1` writes and not overlap the runs.
    unsafe fn merge_lo<T, F>(
        &mut self,
        base: *mut T,
        len1: usize,
        len2: usize,
        buf: *mut T,
        is_less: &mut F,
    ) -> Result<(), SortError>
    where
        F: FnMut(&T, &T) -> bool,
    {
        debug_assert!(len1 > 0 && len2 > 0);
        let mut len1 = len1;
        let mut len2 = len2;

        // The unconsumed part of run1 lives in `hole.start..hole.end` and the gap it will fill
        // always starts at `hole.dest` and ends right where the unconsumed part of run2 begins.
        // Dropping the hole, including during a panic in `is_less`, closes the gap.
        let mut hole;
        let mut right;
        unsafe {
            ptr::copy_nonoverlapping(base, buf, len1);
            hole = MergeHole {
                start: buf,
                end: buf.add(len1),
                dest: base,
            };
            right = base.add(len1);

            // The first element of run2 is the smallest overall.
            ptr::copy_nonoverlapping(right, hole.dest, 1);
            hole.dest = hole.dest.add(1);
            right = right.add(1);
        }
        len2 -= 1;
        if len2 == 0 {
            return Ok(());
        }
        if len1 == 1 {
            // SAFETY: the remaining run2 shifts down by one; the hole writes the last slot.
            unsafe {
                ptr::copy(right, hole.dest, len2);
                hole.dest = hole.dest.add(len2);
            }
            return Ok(());
        }

        let mut min_gallop = self.min_gallop;
        'outer: loop {
            // Number of times in a row that run1 or run2 won.
            let mut count1 = 0;
            let mut count2 = 0;

            // One element at a time until one run starts winning consistently.
            loop {
                debug_assert!(len1 > 1 && len2 > 0);
                // SAFETY: both cursors point at unconsumed elements and `hole.dest` into the gap.
                unsafe {
                    if is_less(&*right, &*hole.start) {
                        ptr::copy_nonoverlapping(right, hole.dest, 1);
                        right = right.add(1);
                        hole.dest = hole.dest.add(1);
                        len2 -= 1;
                        count2 += 1;
                        count1 = 0;
                        if len2 == 0 {
                            break 'outer;
                        }
                    } else {
                        ptr::copy_nonoverlapping(hole.start, hole.dest, 1);
                        hole.start = hole.start.add(1);
                        hole.dest = hole.dest.add(1);
                        len1 -= 1;
                        count1 += 1;
                        count2 = 0;
                        if len1 == 1 {
                            break 'outer;
                        }
                    }
                }
                if (count1 | count2) >= min_gallop {
                    break;
                }
            }

            // Gallop until neither run is winning by a wide margin.
            self.gallops += 1;
            loop {
                debug_assert!(len1 > 1 && len2 > 0);
                // SAFETY: every slice built here covers unconsumed elements only, and each copy
                // moves elements from the front of a run into the front of the gap.
                unsafe {
                    count1 = gallop_right(
                        &*right,
                        slice::from_raw_parts(hole.start, len1),
                        0,
                        is_less,
                    );
                    if count1 != 0 {
                        ptr::copy_nonoverlapping(hole.start, hole.dest, count1);
                        hole.start = hole.start.add(count1);
                        hole.dest = hole.dest.add(count1);
                        len1 -= count1;
                        if len1 <= 1 {
                            break 'outer;
                        }
                    }
                    ptr::copy_nonoverlapping(right, hole.dest, 1);
                    right = right.add(1);
                    hole.dest = hole.dest.add(1);
                    len2 -= 1;
                    if len2 == 0 {
                        break 'outer;
                    }

                    count2 = gallop_left(
                        &*hole.start,
                        slice::from_raw_parts(right, len2),
                        0,
                        is_less,
                    );
                    if count2 != 0 {
                        // The gap may be shorter than the block, so the ranges can overlap.
                        ptr::copy(right, hole.dest, count2);
                        right = right.add(count2);
                        hole.dest = hole.dest.add(count2);
                        len2 -= count2;
                        if len2 == 0 {
                            break 'outer;
                        }
                    }
                    ptr::copy_nonoverlapping(hole.start, hole.dest, 1);
                    hole.start = hole.start.add(1);
                    hole.dest = hole.dest.add(1);
                    len1 -= 1;
                    if len1 == 1 {
                        break 'outer;
                    }
                }
                min_gallop = min_gallop.saturating_sub(1);
                if count1 < self.initial_gallop && count2 < self.initial_gallop {
                    break;
                }
            }
            // Penalize leaving gallop mode.
            min_gallop += 2;
        }
        self.min_gallop = min_gallop.max(1);

        if len1 == 1 {
            debug_assert!(len2 > 0);
            // SAFETY: as in the early exit above.
            unsafe {
                ptr::copy(right, hole.dest, len2);
                hole.dest = hole.dest.add(len2);
            }
            Ok(())
        } else if len1 == 0 {
            // Run1 ran out although its last element is the largest overall.
            Err(SortError::ComparisonContract)
        } else {
            debug_assert!(len2 == 0);
            Ok(())
        }
    }

    /// Mirror image of [`merge_lo`](Self::merge_lo): merges back to front with run2 moved into
    /// `buf`. Run2 must not be longer than run1.
    ///
    /// # Safety
    ///
    /// Same as `merge_lo`, with `buf` valid for `len2` writes.
    unsafe fn merge_hi<T, F>(
        &mut self,
        base: *mut T,
        len1: usize,
        len2: usize,
        buf: *mut T,
        is_less: &mut F,
    ) -> Result<(), SortError>
    where
        F: FnMut(&T, &T) -> bool,
    {
        debug_assert!(len1 > 0 && len2 > 0);
        let mut len1 = len1;
        let mut len2 = len2;

        // The unconsumed part of run2 is `buf..hole.end` and its gap is
        // `hole.dest..hole.dest + len2`, where `hole.dest` is also the end of the unconsumed
        // part of run1. Outputs are written to the last slot of the gap.
        let mut hole;
        unsafe {
            ptr::copy_nonoverlapping(base.add(len1), buf, len2);
            hole = MergeHole {
                start: buf,
                end: buf.add(len2),
                dest: base.add(len1),
            };

            // The last element of run1 is the largest overall.
            hole.dest = hole.dest.sub(1);
            ptr::copy_nonoverlapping(hole.dest, hole.dest.add(len2), 1);
        }
        len1 -= 1;
        if len1 == 0 {
            return Ok(());
        }
        if len2 == 1 {
            // SAFETY: the remaining run1 shifts up by one; the hole writes the first slot.
            unsafe {
                hole.dest = hole.dest.sub(len1);
                ptr::copy(hole.dest, hole.dest.add(1), len1);
            }
            return Ok(());
        }

        let mut min_gallop = self.min_gallop;
        'outer: loop {
            let mut count1 = 0;
            let mut count2 = 0;

            loop {
                debug_assert!(len1 > 0 && len2 > 1);
                // SAFETY: `hole.dest - 1` and `hole.end - 1` are the last unconsumed elements.
                unsafe {
                    if is_less(&*hole.end.sub(1), &*hole.dest.sub(1)) {
                        hole.dest = hole.dest.sub(1);
                        ptr::copy_nonoverlapping(hole.dest, hole.dest.add(len2), 1);
                        len1 -= 1;
                        count1 += 1;
                        count2 = 0;
                        if len1 == 0 {
                            break 'outer;
                        }
                    } else {
                        hole.end = hole.end.sub(1);
                        ptr::copy_nonoverlapping(hole.end, hole.dest.add(len2 - 1), 1);
                        len2 -= 1;
                        count2 += 1;
                        count1 = 0;
                        if len2 == 1 {
                            break 'outer;
                        }
                    }
                }
                if (count1 | count2) >= min_gallop {
                    break;
                }
            }

            self.gallops += 1;
            loop {
                debug_assert!(len1 > 0 && len2 > 1);
                // SAFETY: every slice built here covers unconsumed elements only, and each copy
                // moves elements from the back of a run into the back of the gap.
                unsafe {
                    count1 = len1
                        - gallop_right(
                            &*hole.end.sub(1),
                            slice::from_raw_parts(base, len1),
                            len1 - 1,
                            is_less,
                        );
                    if count1 != 0 {
                        hole.dest = hole.dest.sub(count1);
                        // The gap may be shorter than the block, so the ranges can overlap.
                        ptr::copy(hole.dest, hole.dest.add(len2), count1);
                        len1 -= count1;
                        if len1 == 0 {
                            break 'outer;
                        }
                    }
                    hole.end = hole.end.sub(1);
                    ptr::copy_nonoverlapping(hole.end, hole.dest.add(len2 - 1), 1);
                    len2 -= 1;
                    if len2 == 1 {
                        break 'outer;
                    }

                    count2 = len2
                        - gallop_left(
                            &*hole.dest.sub(1),
                            slice::from_raw_parts(buf, len2),
                            len2 - 1,
                            is_less,
                        );
                    if count2 != 0 {
                        hole.end = hole.end.sub(count2);
                        ptr::copy_nonoverlapping(hole.end, hole.dest.add(len2 - count2), count2);
                        len2 -= count2;
                        if len2 <= 1 {
                            break 'outer;
                        }
                    }
                    hole.dest = hole.dest.sub(1);
                    ptr::copy_nonoverlapping(hole.dest, hole.dest.add(len2), 1);
                    len1 -= 1;
                    if len1 == 0 {
                        break 'outer;
                    }
                }
                min_gallop = min_gallop.saturating_sub(1);
                if count1 < self.initial_gallop && count2 < self.initial_gallop {
                    break;
                }
            }
            min_gallop += 2;
        }
        self.min_gallop = min_gallop.max(1);

        if len2 == 1 {
            debug_assert!(len1 > 0);
            // SAFETY: as in the early exit above.
            unsafe {
                hole.dest = hole.dest.sub(len1);
                ptr::copy(hole.dest, hole.dest.add(1), len1);
            }
            Ok(())
        } else if len2 == 0 {
            // Run2 ran out although its first element is the smallest overall.
            Err(SortError::ComparisonContract)
        } else {
            debug_assert!(len1 == 0);
            Ok(())
        }
    }
}

// When dropped, copies the range `start..end` into `dest..`.
struct MergeHole<T> {
    start: *mut T,
    end: *mut T,
    dest: *mut T,
}

impl<T> Drop for MergeHole<T> {
    fn drop(&mut self) {
        // SAFETY: `start..end` is the unconsumed part of the scratch copy and `dest` the start
        // of a gap of exactly that length inside the sequence. `T` is not zero-sized.
        unsafe {
            let len = self.end.offset_from(self.start) as usize;
            ptr::copy_nonoverlapping(self.start, self.dest, len);
        }
    }
}
