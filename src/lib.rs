//! Non-null, const-correct pointers with checked casts and bounds-checked
//! arrays.
//!
//! * [`Pointer`] is a non-null pointer to one object that remembers whether
//!   it may be written through ([`Const`] or [`Mut`]).
//! * [`AnyPointer`] is a pointer whose type was erased; it keeps a type tag
//!   so it can only be recovered as the type it was made from.
//! * [`ArrayPointer`] points to a run of elements and dereferences to a
//!   [`SliceView`], whose accesses and [`CheckedIterator`]s are bounds
//!   checked.
//! * [`Nullable`] adds an absent state to any of them without growing them.
//!
//! Every runtime check reports a [`PointerError`].
//!
//! ```
//! use crust_ptr::{pointer_to, pointer_to_array, AnyPointer, PointerError};
//!
//! let x = 7i32;
//! let erased: AnyPointer<'_> = pointer_to(&x).into();
//! assert_eq!(*erased.downcast::<i32>().unwrap(), 7);
//! assert!(matches!(
//!     erased.downcast::<f64>(),
//!     Err(PointerError::TypeMismatch { .. })
//! ));
//!
//! let values = [1, 2, 3, 4, 5];
//! let view = &*pointer_to_array(&values);
//! assert_eq!(view[4], 5);
//! assert!(view.at(5).is_err());
//! ```

mod any;
mod array;
mod error;
mod iter;
mod mutability;
mod nullable;
mod pointer;
mod slice;
mod traits;

#[cfg(feature = "ffi")]
pub mod ffi;
#[cfg(feature = "serde")]
mod serde_impls;

pub use crate::any::AnyPointer;
pub use crate::array::{pointer_to_array, pointer_to_mut_array, ArrayPointer};
pub use crate::error::{raise, BoundsViolation, PointerError, Result};
pub use crate::iter::{CheckedIterator, Iter, IterMut};
pub use crate::mutability::{Const, Mut, Mutability, Weaken};
pub use crate::nullable::{Absent, Nullable, NullablePointer};
pub use crate::pointer::{pointer_to, pointer_to_mut, Pointer, Polymorphic};
pub use crate::slice::SliceView;
pub use crate::traits::{to_address, PointerTo, PointerTraits};

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::{assert_eq_size, assert_impl_all, assert_not_impl_any};
    use std::any::Any;
    use std::cell::Cell;
    use std::ptr::NonNull;

    assert_eq_size!(Pointer<'static, i32>, *const i32);
    assert_eq_size!(Pointer<'static, i32, Mut>, *mut i32);
    assert_eq_size!(Pointer<'static, dyn Any>, *const dyn Any);
    assert_eq_size!(ArrayPointer<'static, u16>, *const [u16]);
    assert_eq_size!(Option<Pointer<'static, i32>>, Pointer<'static, i32>);

    assert_impl_all!(Pointer<'static, i32>: Copy, Send, Sync, Eq, Ord, std::hash::Hash);
    assert_impl_all!(Pointer<'static, i32, Mut>: Copy, Send, Sync, Into<Pointer<'static, i32>>);
    assert_impl_all!(ArrayPointer<'static, i32>: Copy, Send, Sync, Eq, Ord, std::hash::Hash);
    assert_impl_all!(AnyPointer<'static>: Copy, Eq, Ord, std::hash::Hash);
    assert_impl_all!(CheckedIterator<'static, i32>: Copy, PartialOrd);
    assert_impl_all!(Iter<'static, i32>: Clone, DoubleEndedIterator, ExactSizeIterator);
    assert_impl_all!(Pointer<'static, i32>: Into<NonNull<i32>>);

    // A shared pointer is `Send` exactly when `&T` is. A writable pointer
    // still hands out `&T` from every copy, so it needs `Sync` as well.
    assert_not_impl_any!(Pointer<'static, Cell<i32>>: Send, Sync);
    assert_not_impl_any!(Pointer<'static, Cell<i32>, Mut>: Send, Sync);
    assert_not_impl_any!(ArrayPointer<'static, Cell<i32>, Mut>: Send, Sync);
    assert_not_impl_any!(Iter<'static, Cell<i32>>: Send, Sync);
    assert_impl_all!(Pointer<'static, i32, Mut>: Send, Sync);
    assert_impl_all!(ArrayPointer<'static, i32, Mut>: Send, Sync);
    assert_impl_all!(IterMut<'static, Cell<i32>>: Send);
    assert_not_impl_any!(AnyPointer<'static>: Send, Sync);

    // Pointee shapes every pointer kind has to handle the same way.
    #[allow(dead_code)]
    trait Shape {
        fn area(&self) -> f64;
    }

    #[allow(dead_code)]
    #[derive(Clone, Copy)]
    #[repr(C)]
    union Bits {
        int: u32,
        float: f32,
    }

    #[allow(dead_code)]
    enum Suit {
        Hearts,
        Spades,
    }

    #[allow(dead_code)]
    enum Token {
        Number(i64),
        Word(String),
    }

    #[allow(dead_code)]
    struct Unit;

    macro_rules! pointer_conformance {
        ($($t:ty),* $(,)?) => {$(
            assert_eq_size!(Pointer<'static, $t>, *const $t);
            assert_eq_size!(Nullable<Pointer<'static, $t>>, Pointer<'static, $t>);
            assert_eq_size!(Nullable<Pointer<'static, $t, Mut>>, Pointer<'static, $t, Mut>);
            assert_impl_all!(Pointer<'static, $t>: Copy, Eq, Ord, std::hash::Hash, From<Pointer<'static, $t, Mut>>);
            assert_impl_all!(Pointer<'static, $t, Mut>: Copy, Eq, Ord, std::hash::Hash);
            assert_not_impl_any!(Pointer<'static, $t, Mut>: From<Pointer<'static, $t>>);
            assert_impl_all!(
                Nullable<Pointer<'static, $t>>:
                    Copy, Eq, From<Pointer<'static, $t, Mut>>, From<Nullable<Pointer<'static, $t, Mut>>>
            );
            assert_not_impl_any!(
                Nullable<Pointer<'static, $t, Mut>>:
                    From<Pointer<'static, $t>>, From<Nullable<Pointer<'static, $t>>>
            );
        )*};
    }

    macro_rules! element_conformance {
        ($($t:ty),* $(,)?) => {$(
            assert_eq_size!(ArrayPointer<'static, $t>, *const [$t]);
            assert_eq_size!(Nullable<ArrayPointer<'static, $t>>, ArrayPointer<'static, $t>);
            assert_impl_all!(ArrayPointer<'static, $t>: From<ArrayPointer<'static, $t, Mut>>);
            assert_not_impl_any!(ArrayPointer<'static, $t, Mut>: From<ArrayPointer<'static, $t>>);
            assert_impl_all!(AnyPointer<'static>: From<Pointer<'static, $t>>, From<Pointer<'static, $t, Mut>>);
            assert_impl_all!(AnyPointer<'static, Mut>: From<Pointer<'static, $t, Mut>>);
            assert_not_impl_any!(AnyPointer<'static, Mut>: From<Pointer<'static, $t>>);
            assert_not_impl_any!(Pointer<'static, $t>: From<AnyPointer<'static>>);
            assert_impl_all!(Nullable<AnyPointer<'static>>: From<Nullable<Pointer<'static, $t, Mut>>>);
            assert_not_impl_any!(Nullable<AnyPointer<'static, Mut>>: From<Nullable<Pointer<'static, $t>>>);
        )*};
    }

    pointer_conformance!(
        i32,
        Vec<i32>,
        String,
        Bits,
        Suit,
        Token,
        Unit,
        [i32; 5],
        [[i32; 3]; 2],
        *const i32,
        Pointer<'static, Pointer<'static, i32>>,
        Nullable<Pointer<'static, i32>>,
        dyn Shape,
        dyn Any,
        str,
        [u8],
    );

    element_conformance!(
        i32,
        Vec<i32>,
        Bits,
        Suit,
        Token,
        Unit,
        [i32; 5],
        *const i32,
        Pointer<'static, Pointer<'static, i32>>,
    );

    // No implicit constness removal, and erased pointers only keep or lower
    // their constness.
    assert_not_impl_any!(Pointer<'static, i32, Mut>: From<Pointer<'static, i32, Const>>);
    assert_not_impl_any!(ArrayPointer<'static, i32, Mut>: From<ArrayPointer<'static, i32, Const>>);
    assert_not_impl_any!(AnyPointer<'static, Mut>: From<Pointer<'static, i32, Const>>, From<AnyPointer<'static, Const>>);
    assert_not_impl_any!(Pointer<'static, i32>: From<AnyPointer<'static>>);
    assert_not_impl_any!(ArrayPointer<'static, u8>: From<ArrayPointer<'static, i8>>);

    #[test]
    fn erased_seven() -> anyhow::Result<()> {
        let x = 7i32;
        let erased = pointer_to(&x).erase();
        assert_eq!(*erased.downcast::<i32>()?, 7);
        assert!(matches!(
            erased.downcast::<f64>(),
            Err(PointerError::TypeMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn raw_address_round_trip() -> anyhow::Result<()> {
        let mut x = 1;
        let raw: *mut i32 = &mut x;
        let p = unsafe { Pointer::<i32, Mut>::from_raw_address(raw)? };
        assert_eq!(to_address(p), raw);
        assert!(matches!(
            unsafe { Pointer::<i32, Mut>::from_raw_address(std::ptr::null_mut()) },
            Err(PointerError::NullPointer(_))
        ));
        Ok(())
    }

    #[test]
    fn slice_walk_through_every_layer() -> anyhow::Result<()> {
        let mut values = vec![3, 1, 2];
        let array = pointer_to_mut_array(&mut values);

        let mut it = unsafe { array.as_mut() }.begin_mut();
        while !it.is_end() {
            unsafe { *it.get_mut()? *= 10 };
            it.increment()?;
        }
        assert!(it.increment().is_err());

        let held: Nullable<ArrayPointer<'_, i32>> = Nullable::present(array).into();
        let sum: i32 = held.value()?.iter().sum();
        assert_eq!(sum, 60);
        Ok(())
    }
}
