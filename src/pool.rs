//! Per-thread default sorters behind the free-function entry points.
//!
//! Every thread lazily gets one [`Sorter`] per element type on first use. Sorters are never
//! shared between threads, so the free functions are safe to call concurrently, and each
//! thread's scratch buffers keep growing to fit the largest sort it has run.

use crate::algo::Sorter;
use crate::core::Sequence;
use crate::error::SortError;
use log::debug;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::RangeBounds;

thread_local! {
    static SORTERS: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Runs `f` with this thread's default sorter for `T`.
///
/// If the pool is already in use further up the stack, for example when a comparison function
/// itself sorts, `f` gets a temporary sorter instead of sharing the busy one.
///
/// # Examples
///
/// ```
/// use sortpool::with_default_sorter;
///
/// let mut data = vec![3u8, 1, 2];
/// let capacity = with_default_sorter::<u8, _>(|sorter| {
///     sorter.sort(&mut data).unwrap();
///     sorter.scratch_capacity()
/// });
///
/// assert_eq!(data, vec![1, 2, 3]);
/// assert_eq!(capacity, 0); // short inputs never merge
/// ```
pub fn with_default_sorter<T: 'static, R>(f: impl FnOnce(&mut Sorter<T>) -> R) -> R {
    SORTERS.with(|cell| {
        let Ok(mut sorters) = cell.try_borrow_mut() else {
            debug!("default sorter pool is busy, sorting with a temporary sorter");
            return f(&mut Sorter::new());
        };

        let entry = sorters
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Sorter::<T>::new()) as Box<dyn Any>);
        match entry.downcast_mut::<Sorter<T>>() {
            Some(sorter) => f(sorter),
            None => f(&mut Sorter::new()),
        }
    })
}

/// Sorts the whole sequence by natural order with this thread's default sorter.
///
/// # Examples
///
/// ```
/// let mut data = vec![5, 3, 1, 4, 2];
/// sortpool::sort(&mut data).unwrap();
///
/// assert_eq!(data, vec![1, 2, 3, 4, 5]);
/// ```
pub fn sort<S>(seq: &mut S) -> Result<(), SortError>
where
    S: Sequence + ?Sized,
    S::Item: Ord + 'static,
{
    with_default_sorter::<S::Item, _>(|sorter| sorter.sort(seq))
}

/// Sorts `range` of the sequence by natural order with this thread's default sorter.
pub fn sort_range<S, R>(seq: &mut S, range: R) -> Result<(), SortError>
where
    S: Sequence + ?Sized,
    S::Item: Ord + 'static,
    R: RangeBounds<usize>,
{
    with_default_sorter::<S::Item, _>(|sorter| sorter.sort_range(seq, range))
}

/// Sorts the whole sequence with a comparison function and this thread's default sorter.
pub fn sort_by<S, F>(seq: &mut S, compare: F) -> Result<(), SortError>
where
    S: Sequence + ?Sized,
    S::Item: 'static,
    F: FnMut(&S::Item, &S::Item) -> Ordering,
{
    with_default_sorter::<S::Item, _>(|sorter| sorter.sort_by(seq, compare))
}

/// Sorts `range` of the sequence with a comparison function and this thread's default sorter.
///
/// # Examples
///
/// ```
/// let mut data = [9, 8, 3, 1, 2, 0];
/// sortpool::sort_by_range(&mut data, 1..5, |a, b| a.cmp(b)).unwrap();
///
/// assert_eq!(data, [9, 1, 2, 3, 8, 0]);
/// ```
pub fn sort_by_range<S, R, F>(seq: &mut S, range: R, compare: F) -> Result<(), SortError>
where
    S: Sequence + ?Sized,
    S::Item: 'static,
    R: RangeBounds<usize>,
    F: FnMut(&S::Item, &S::Item) -> Ordering,
{
    with_default_sorter::<S::Item, _>(|sorter| sorter.sort_by_range(seq, range, compare))
}
