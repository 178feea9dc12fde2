//! Run detection, short-run sorting and galloping searches.
//!
//! Every function here works on plain slices and a strict `is_less` predicate derived from the
//! caller's ordering. None of them move an element while the predicate can still be called, so
//! a panicking comparison leaves the slice untouched.

/// Computes the minimum run length for a range of `n` elements.
///
/// Roughly `n / min_run` is a power of two, or slightly below one, which keeps the final merges
/// balanced. For `n >= min_merge` the result lies in `min_merge / 2..=min_merge`.
pub(crate) fn min_run_length(mut n: usize, min_merge: usize) -> usize {
    // becomes 1 if any 1 bits are shifted off
    let mut r = 0;
    while n >= min_merge {
        r |= n & 1;
        n >>= 1;
    }
    n + r
}

/// Returns the length of the run starting at `v[0]`.
///
/// A strictly descending run is reversed in place so every run comes back non-descending.
/// Strictness keeps equal elements from being swapped by the reversal.
pub(crate) fn count_run_and_make_ascending<T, F>(v: &mut [T], is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    if len < 2 {
        return len;
    }

    let mut end = 2;
    if is_less(&v[1], &v[0]) {
        while end < len && is_less(&v[end], &v[end - 1]) {
            end += 1;
        }
        v[..end].reverse();
    } else {
        while end < len && !is_less(&v[end], &v[end - 1]) {
            end += 1;
        }
    }

    end
}

/// Sorts `v` assuming `v[..start]` is already sorted.
///
/// Each following element is placed after all equal elements of the sorted prefix, found by
/// binary search, which makes the sort stable.
pub(crate) fn binary_insertion_sort<T, F>(v: &mut [T], start: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    for i in start.max(1)..v.len() {
        let (sorted, rest) = v.split_at(i);
        let pivot = &rest[0];
        let pos = sorted.partition_point(|x| !is_less(pivot, x));
        v[pos..=i].rotate_right(1);
    }
}

/// Locates the leftmost position at which `key` could be inserted into the sorted slice `a`.
///
/// Returns `k` such that `a[..k] < key <= a[k..]`. The search starts at `hint` and gallops
/// outwards, so it is cheapest when `hint` is close to the answer.
pub(crate) fn gallop_left<T, F>(key: &T, a: &[T], hint: usize, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    debug_assert!(hint < a.len());

    let mut last_ofs = 0;
    let mut ofs = 1;
    let mut lo;
    let mut hi;

    if is_less(&a[hint], key) {
        // Gallop right until a[hint + last_ofs] < key <= a[hint + ofs].
        let max_ofs = a.len() - hint;
        while ofs < max_ofs && is_less(&a[hint + ofs], key) {
            last_ofs = ofs;
            ofs = (ofs << 1) + 1;
        }
        ofs = ofs.min(max_ofs);
        lo = hint + last_ofs + 1;
        hi = hint + ofs;
    } else {
        // Gallop left until a[hint - ofs] < key <= a[hint - last_ofs].
        let max_ofs = hint + 1;
        while ofs < max_ofs && !is_less(&a[hint - ofs], key) {
            last_ofs = ofs;
            ofs = (ofs << 1) + 1;
        }
        ofs = ofs.min(max_ofs);
        lo = hint + 1 - ofs;
        hi = hint - last_ofs;
    }

    // a[lo - 1] < key <= a[hi], with the out-of-range ends taken as given.
    while lo < hi {
        let mid = lo + ((hi - lo) >> 1);
        if is_less(&a[mid], key) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    hi
}

/// Like [`gallop_left`], but lands after any elements equal to `key`.
///
/// Returns `k` such that `a[..k] <= key < a[k..]`.
pub(crate) fn gallop_right<T, F>(key: &T, a: &[T], hint: usize, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    debug_assert!(hint < a.len());

    let mut last_ofs = 0;
    let mut ofs = 1;
    let mut lo;
    let mut hi;

    if is_less(key, &a[hint]) {
        // Gallop left until a[hint - ofs] <= key < a[hint - last_ofs].
        let max_ofs = hint + 1;
        while ofs < max_ofs && is_less(key, &a[hint - ofs]) {
            last_ofs = ofs;
            ofs = (ofs << 1) + 1;
        }
        ofs = ofs.min(max_ofs);
        lo = hint + 1 - ofs;
        hi = hint - last_ofs;
    } else {
        // Gallop right until a[hint + last_ofs] <= key < a[hint + ofs].
        let max_ofs = a.len() - hint;
        while ofs < max_ofs && !is_less(key, &a[hint + ofs]) {
            last_ofs = ofs;
            ofs = (ofs << 1) + 1;
        }
        ofs = ofs.min(max_ofs);
        lo = hint + last_ofs + 1;
        hi = hint + ofs;
    }

    while lo < hi {
        let mid = lo + ((hi - lo) >> 1);
        if is_less(key, &a[mid]) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    hi
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lt(a: &i32, b: &i32) -> bool {
        a < b
    }

    #[test]
    fn min_run_stays_within_bounds() {
        assert_eq!(min_run_length(31, 32), 31);
        assert_eq!(min_run_length(64, 32), 16);
        assert_eq!(min_run_length(65, 32), 17);
        for n in 32..5000 {
            let min_run = min_run_length(n, 32);
            assert!((16..=32).contains(&min_run), "n = {n}, min_run = {min_run}");
        }
    }

    #[test]
    fn descending_run_is_reversed() {
        let mut v = [5, 4, 3, 3, 1];
        let run = count_run_and_make_ascending(&mut v, &mut lt);
        assert_eq!(run, 3);
        assert_eq!(v, [3, 4, 5, 3, 1]);

        let mut v = [1, 1, 2, 0];
        assert_eq!(count_run_and_make_ascending(&mut v, &mut lt), 3);
        assert_eq!(v, [1, 1, 2, 0]);
    }

    #[test]
    fn insertion_sort_keeps_equal_elements_in_order() {
        let mut v = [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (0, 'e')];
        binary_insertion_sort(&mut v, 1, &mut |a: &(i32, char), b: &(i32, char)| a.0 < b.0);
        assert_eq!(v, [(0, 'e'), (1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn gallops_agree_with_partition_point() {
        let a = [1, 2, 2, 2, 4, 7, 7, 9, 12, 12, 15];
        for key in 0..17 {
            let left = a.partition_point(|x| *x < key);
            let right = a.partition_point(|x| *x <= key);
            for hint in 0..a.len() {
                assert_eq!(gallop_left(&key, &a, hint, &mut lt), left, "key {key} hint {hint}");
                assert_eq!(gallop_right(&key, &a, hint, &mut lt), right, "key {key} hint {hint}");
            }
        }
    }
}
