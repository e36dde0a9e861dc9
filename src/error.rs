//! The single failure channel shared by every check in the crate.
//!
//! Fallible operations return [`Result`]. Operator-shaped APIs that have no
//! way to return an error (`Index`, `Deref`, iterator arithmetic) hand the
//! same [`PointerError`] to [`raise`], which panics with its message.

use thiserror::Error;

/// Shorthand for results whose error is a [`PointerError`].
pub type Result<T, E = PointerError> = std::result::Result<T, E>;

/// Every runtime-detected invariant violation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum PointerError {
    /// A raw address handed to a checked constructor was null.
    #[error("null pointer passed to `{0}`")]
    NullPointer(&'static str),

    /// An erased pointer was recovered as a type other than the one it was
    /// erased from.
    #[error("type mismatch: pointer to `{found}` cannot be recovered as `{expected}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Indexing, stepping or offsetting outside of the valid range.
    #[error("bounds check failed: {0}")]
    Bounds(#[from] BoundsViolation),

    /// The explicitly range-checked accessor was given a bad index.
    #[error("index {index} is out of range for a slice of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// An absent [`Nullable`](crate::Nullable) was dereferenced.
    #[error("bad access: nullable pointer holds no value")]
    BadAccess,
}

/// The individual ways a bounds check can fail.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum BoundsViolation {
    #[error("index {index} out of bounds for length {len}")]
    Index { index: usize, len: usize },

    #[error("`{0}` called on an empty slice")]
    Empty(&'static str),

    #[error("cannot increment iterator past the end (length {len})")]
    Increment { len: usize },

    #[error("cannot decrement iterator before the start")]
    Decrement,

    #[error("offset {offset} from index {index} leaves the range 0..={len}")]
    Offset { index: usize, offset: isize, len: usize },

    #[error("offset {offset} from index {index} overflows")]
    Overflow { index: usize, offset: isize },

    #[error("cannot dereference iterator at index {index} (length {len})")]
    Dereference { index: usize, len: usize },
}

impl PointerError {
    /// Returns `true` for every member of the bounds-error family.
    #[inline]
    pub const fn is_bounds(&self) -> bool {
        matches!(self, PointerError::Bounds(_))
    }
}

/// Records a rejected check and hands the error back as an `Err`.
#[inline]
pub(crate) fn reject<T>(err: impl Into<PointerError>) -> Result<T> {
    let err = err.into();
    log::debug!(target: "crust_ptr", "rejected: {err}");
    Err(err)
}

/// Panics with `err`. Used where an operator cannot return a [`Result`].
#[cold]
#[track_caller]
pub fn raise(err: PointerError) -> ! {
    log::error!(target: "crust_ptr", "{err}");
    panic!("{err}")
}
