//! Error types for IntOpenHashMap.

use thiserror::Error;

/// Result type alias for map operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the map, its views and its cursors.
///
/// Every variant is recoverable: the map is left in a consistent state
/// and the caller decides what to do next.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A null key was given to an operation that must associate it.
    #[error("null key")]
    NullKey,

    /// A null value was given to an operation that must store it.
    #[error("null value")]
    NullValue,

    /// The load factor is not strictly between 0 and 1.
    #[error("load factor must be greater than 0 and smaller than 1, got {0}")]
    InvalidLoadFactor(f32),

    /// The requested size cannot be backed by a power-of-two table.
    #[error("too large ({expected} expected elements with load factor {load_factor})")]
    CapacityOverflow { expected: usize, load_factor: f32 },

    /// An object-typed argument has the wrong dynamic type.
    #[error("type mismatch: expected {expected}")]
    TypeMismatch { expected: &'static str },

    /// The map was structurally modified behind a cursor's back.
    #[error("concurrent modification: cursor saw epoch {expected}, map is at {found}")]
    ConcurrentModification { expected: u64, found: u64 },

    /// `remove` was called before the first advance or twice in a row.
    #[error("illegal iterator state: no element to remove")]
    IllegalIteratorState,

    /// A cursor was handed a map other than the one it was created from.
    #[error("cursor used with a map it does not belong to")]
    WrongMap,
}
