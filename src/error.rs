//! Error type returned by the sorting entry points.

use std::fmt;

/// Errors reported by [`Sorter`](crate::Sorter) and the pooled free functions.
///
/// Every error aborts the sort call that produced it. [`SortError::InvalidRange`] and
/// [`SortError::InvalidConfig`] are detected before anything is moved. The other variants are
/// raised mid-sort: the sequence then still holds each of its original elements exactly once,
/// in an unspecified order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SortError {
    /// The requested range is reversed or reaches past the end of the sequence.
    InvalidRange { from: usize, to: usize, len: usize },
    /// The comparison function was caught violating total order during a merge.
    ///
    /// Detection is best effort: an inconsistent comparator may also go unnoticed and
    /// simply produce an unsorted result.
    ComparisonContract,
    /// The scratch buffer could not be grown to `requested` slots.
    Allocation { requested: usize },
    /// A [`SortConfig`](crate::core::SortConfig) value is out of its valid domain.
    InvalidConfig { reason: &'static str },
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortError::InvalidRange { from, to, len } => write!(
                f,
                "invalid sort range {from}..{to} for a sequence of length {len}"
            ),
            SortError::ComparisonContract => {
                write!(f, "comparison method violates its general contract")
            }
            SortError::Allocation { requested } => {
                write!(f, "failed to allocate {requested} scratch slots")
            }
            SortError::InvalidConfig { reason } => write!(f, "invalid sort config: {reason}"),
        }
    }
}

impl std::error::Error for SortError {}
