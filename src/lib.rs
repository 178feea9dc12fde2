//! # sortpool
//!
//! `sortpool` is a stable, adaptive merge sort (timsort) for slices of any element type, built
//! for programs that sort again and again (per frame, per tick, per request) and do not want to
//! allocate a fresh merge buffer on every call.
//!
//! ## Key Features
//!
//! - **Reusable engine**: A [`Sorter`] owns its scratch buffer and run stack. The buffer grows
//!   on demand up to half of the largest range sorted and is never shrunk, so steady-state
//!   sorting does not allocate.
//! - **Adaptive**: Already ordered or reversed stretches are detected as runs and merged with
//!   galloping, so presorted data sorts in close to linear time.
//! - **Stable**: Equal elements keep their original relative order.
//! - **Ranges and containers**: Sort a whole [`Sequence`] (`Vec`, arrays, slices, `Box<[T]>`,
//!   `VecDeque`) or any sub-range of it, by natural order or with a comparison function.
//! - **Robust**: A comparison function that panics or violates total order never loses or
//!   duplicates elements; detected violations are reported as
//!   [`SortError::ComparisonContract`].
//!
//! ## Usage
//!
//! ### Basic Usage
//!
//! The free functions use a per-thread default sorter for each element type.
//!
//! ```rust
//! let mut data = vec!["banana", "apple", "cherry", "date"];
//! sortpool::sort(&mut data).unwrap();
//!
//! assert_eq!(data, vec!["apple", "banana", "cherry", "date"]);
//! ```
//!
//! ### Owning a Sorter
//!
//! Keep a [`Sorter`] next to the data it sorts to control its lifetime and memory explicitly.
//!
//! ```rust
//! use sortpool::Sorter;
//!
//! struct Sprite {
//!     depth: u32,
//!     id: usize,
//! }
//!
//! let mut sorter = Sorter::new();
//! let mut sprites: Vec<Sprite> = (0..100)
//!     .map(|id| Sprite { depth: (id as u32 * 7) % 10, id })
//!     .collect();
//!
//! sorter.sort_by(&mut sprites, |a, b| a.depth.cmp(&b.depth)).unwrap();
//! assert!(sprites.windows(2).all(|w| w[0].depth <= w[1].depth));
//!
//! // Stability: equal depths keep ascending ids.
//! assert!(sprites
//!     .windows(2)
//!     .all(|w| w[0].depth < w[1].depth || w[0].id < w[1].id));
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Best Case**: O(N) for input that is already sorted or strictly descending.
//! - **Worst Case**: O(N log N) comparisons.
//! - **Memory Overhead**: At most `N / 2` scratch slots, kept by the sorter for reuse.

pub mod algo;
mod buffer;
pub mod core;
pub mod error;
mod merge;
pub mod pool;
mod run;

pub use crate::algo::{SortStats, Sorter};
pub use crate::core::{Sequence, SortConfig};
pub use crate::error::SortError;
pub use crate::pool::{sort, sort_by, sort_by_range, sort_range, with_default_sorter};

pub mod prelude {
    pub use crate::algo::{SortStats, Sorter};
    pub use crate::core::{Sequence, SortConfig};
    pub use crate::error::SortError;
    pub use crate::pool::{sort, sort_by, sort_by_range, sort_range, with_default_sorter};
}
