//! Tracking `*const` vs `*mut` through the type system.
//!
//! Every pointer in this crate carries an `M: Mutability` parameter. [`Const`]
//! pointers may only read; [`Mut`] pointers may also hand out unique
//! references (unsafely). Lowering `Mut` to `Const` is free and implicit,
//! raising `Const` to `Mut` always goes through an `unsafe` cast.

use std::fmt::Debug;
use std::hash::Hash;
use std::ptr::NonNull;

/// Marker trait for the constness of a pointer.
pub trait Mutability: 'static + Copy + Debug + Eq + Ord + Hash + seal::Sealed {
    /// `true` for [`Mut`].
    const MUTABLE: bool;

    /// The raw pointer type with this constness: `*const T` or `*mut T`.
    type Raw<T: ?Sized>: Copy;

    #[doc(hidden)]
    fn raw_to_non_null<T: ?Sized>(raw: Self::Raw<T>) -> Option<NonNull<T>>;

    #[doc(hidden)]
    fn non_null_to_raw<T: ?Sized>(ptr: NonNull<T>) -> Self::Raw<T>;
}

/// A pointer to an object that must not be written through.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Const;

impl Mutability for Const {
    const MUTABLE: bool = false;

    type Raw<T: ?Sized> = *const T;

    #[inline(always)]
    fn raw_to_non_null<T: ?Sized>(raw: *const T) -> Option<NonNull<T>> {
        NonNull::new(raw.cast_mut())
    }

    #[inline(always)]
    fn non_null_to_raw<T: ?Sized>(ptr: NonNull<T>) -> *const T {
        ptr.as_ptr()
    }
}

/// A pointer that may be written through. Contexts holding `Mut` may lower
/// to `Const`; contexts holding `Const` may not raise to `Mut` on their own.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Mut;

impl Mutability for Mut {
    const MUTABLE: bool = true;

    type Raw<T: ?Sized> = *mut T;

    #[inline(always)]
    fn raw_to_non_null<T: ?Sized>(raw: *mut T) -> Option<NonNull<T>> {
        NonNull::new(raw)
    }

    #[inline(always)]
    fn non_null_to_raw<T: ?Sized>(ptr: NonNull<T>) -> *mut T {
        ptr.as_ptr()
    }
}

/// `Self` may be implicitly viewed as `To`: `Const -> Const`, `Mut -> Mut`
/// and `Mut -> Const`. There is no `Const -> Mut`.
pub trait Weaken<To: Mutability>: Mutability {}

impl Weaken<Const> for Const {}
impl Weaken<Const> for Mut {}
impl Weaken<Mut> for Mut {}

#[doc(hidden)]
mod seal {
    #[doc(hidden)]
    pub trait Sealed {}

    impl Sealed for super::Const {}
    impl Sealed for super::Mut {}
}
