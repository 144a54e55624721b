//! int-open-map: an open-addressing hash map from `i32` keys to arbitrary
//! values, with a per-map default return value and fail-fast cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: store integer keys unboxed in one flat table and still offer the
//!   surface of a generic keyed collection (views, object-typed keys,
//!   compute/merge, equality with other maps).
//! - Layers:
//!   - `hash_table`: the table itself. Parallel `keys`/`values` slices,
//!     linear probing, backward-shift deletion, growth and shrinking, and
//!     the default-value policy.
//!   - `iter`: borrowing iterators plus detached cursors that can remove
//!     while iterating and detect interleaved structural changes.
//!   - `views`: key, value and entry collections that forward to the map.
//!   - `functional`: compute, merge and conditional updates built on a
//!     single probe.
//!   - `generic`: object-typed keys, equality and conversions.
//!
//! Table layout
//! - Capacity `n` is a power of two; both slices have length `n + 1`.
//! - A key slot holding `0` is empty. Key `0` itself lives in slot `n`,
//!   outside the probe sequence, and a flag records whether it is present.
//! - Keys are scrambled with a multiplicative mix (`k * 0x9E3779B9`, high
//!   half folded into the low half) before masking.
//! - The table grows when an insertion finds `size >= max_fill`, where
//!   `max_fill = min(ceil(n * load_factor), n - 1)`. At least one slot is
//!   always empty, so every probe terminates.
//!
//! Deletion
//! - No tombstones. Removing a key walks the cluster forward and pulls back
//!   every entry whose ideal slot does not lie cyclically between the hole
//!   and the entry, until an empty slot is reached.
//! - Removal through the map shrinks the table by half when it becomes
//!   sparse, never below the capacity it was created with. Removal through
//!   a cursor never shrinks.
//!
//! Default return value
//! - `get`, `put`, `remove` and the compute family report the map's default
//!   return value on a miss. `insert`, `take`, `get_mut` and the `*_obj`
//!   lookups report plain absence instead.
//!
//! Cursors and the epoch
//! - Borrowing iterators (`iter`, `keys`, ...) hold a borrow of the map, so
//!   the compiler rules out modification while they live.
//! - Cursors (`entry_cursor`, `fast_cursor`, ...) hold no borrow; they are
//!   handed the map on each call. Every structural change bumps the map's
//!   epoch, and a cursor that sees an epoch other than its own reports
//!   `Error::ConcurrentModification`. Overwriting a value is not a
//!   structural change.
//! - A cursor visits key `0` first, then the table from the highest slot
//!   down. Entries that a removal wraps from the start of the table into
//!   the already visited end are queued and returned at the end, so every
//!   entry is seen exactly once.
//!
//! Notes and non-goals
//! - Single owner; `IntOpenHashMap<V>` is `Send`/`Sync` when `V` is, with no
//!   internal locking.
//! - Iteration order is unspecified and changes on rehash.
//! - Closures passed to the compute family receive `&V` while the map is
//!   mutably borrowed, so they cannot reenter it.

mod cfg;
mod config;
mod entry;
mod error;
mod functional;
mod generic;
mod hash_table;
mod hash_table_proptest;
mod iter;
#[cfg(feature = "serde")]
mod serde_impls;
mod views;

// Public surface
pub use config::{IntOpenHashMapBuilder, MapConfig, DEFAULT_EXPECTED_SIZE, DEFAULT_LOAD_FACTOR};
pub use entry::{Entry, FastEntry};
pub use error::{Error, Result};
pub use generic::IntFunction;
pub use hash_table::IntOpenHashMap;
pub use iter::{
    EntryCursor, FastEntryCursor, IntoIter, Iter, IterMut, KeyCursor, Keys, ValueCursor, Values,
    ValuesMut,
};
pub use views::{EntrySet, KeySet, ValueCollection};
