use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use crate::any::AnyPointer;
use crate::array::ArrayPointer;
use crate::error::{raise, reject, PointerError, Result};
use crate::mutability::{Const, Mut, Mutability, Weaken};
use crate::pointer::Pointer;

mod seal {
    pub trait Sealed {}
}

/// The pointer kinds of this crate. Each one is non-null, so wrapping it in
/// a [`Nullable`] reuses the null bit pattern for the absent state.
pub trait NullablePointer: Copy + seal::Sealed {}

impl<T: ?Sized, M: Mutability> seal::Sealed for Pointer<'_, T, M> {}
impl<T: ?Sized, M: Mutability> NullablePointer for Pointer<'_, T, M> {}
impl<M: Mutability> seal::Sealed for AnyPointer<'_, M> {}
impl<M: Mutability> NullablePointer for AnyPointer<'_, M> {}
impl<T, M: Mutability> seal::Sealed for ArrayPointer<'_, T, M> {}
impl<T, M: Mutability> NullablePointer for ArrayPointer<'_, T, M> {}

/// Marker for the absent state, usable wherever a [`Nullable`] is expected.
///
/// ```
/// use crust_ptr::{Absent, Nullable, Pointer};
///
/// let n: Nullable<Pointer<'_, i32>> = Absent.into();
/// assert!(!n.has_value());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Absent;

/// A pointer that may be absent.
///
/// `Nullable<P>` has exactly the size of `P`: the absent state is stored in
/// the null address that `P` itself can never hold.
///
/// Conversions follow the pointer conversion graph edge for edge: a
/// `Nullable<Pointer<T, Mut>>` converts into a `Nullable<Pointer<T, Const>>`
/// or a `Nullable<AnyPointer<Mut>>`, never the other way.
///
/// # Examples
///
/// ```
/// use crust_ptr::{pointer_to, Nullable, Pointer, PointerError};
///
/// let value = 42;
/// let mut n: Nullable<Pointer<'_, i32>> = Nullable::new();
/// assert_eq!(n.value(), Err(PointerError::BadAccess));
///
/// n.assign(pointer_to(&value));
/// assert!(n.has_value());
/// assert_eq!(**n, 42);
/// ```
#[repr(transparent)]
pub struct Nullable<P: NullablePointer>(Option<P>);

impl<P: NullablePointer> Nullable<P> {
    /////////////////////////////////////////////////////////////////////////
    // Construction
    /////////////////////////////////////////////////////////////////////////

    /// An absent pointer.
    #[inline]
    pub const fn new() -> Self {
        Nullable(None)
    }

    /// An absent pointer. Same as [`Nullable::new`].
    #[inline]
    pub const fn absent() -> Self {
        Nullable(None)
    }

    /// A present pointer.
    #[inline]
    pub const fn present(ptr: P) -> Self {
        Nullable(Some(ptr))
    }

    /////////////////////////////////////////////////////////////////////////
    // Querying the contained pointer
    /////////////////////////////////////////////////////////////////////////

    /// Returns `true` if a pointer is present.
    ///
    /// ```
    /// use crust_ptr::{pointer_to, Nullable};
    ///
    /// let x = 2u32;
    /// assert!(Nullable::present(pointer_to(&x)).has_value());
    /// ```
    #[must_use]
    #[inline]
    pub const fn has_value(&self) -> bool {
        self.0.is_some()
    }

    /// The contained pointer.
    ///
    /// # Errors
    ///
    /// [`PointerError::BadAccess`] when absent.
    #[inline]
    pub fn value(&self) -> Result<&P> {
        match &self.0 {
            Some(ptr) => Ok(ptr),
            None => reject(PointerError::BadAccess),
        }
    }

    /// A copy of the contained pointer, if any.
    #[inline]
    pub const fn get(&self) -> Option<P> {
        self.0
    }

    /// Iterates over the contained pointer: one item if present, none if
    /// absent.
    ///
    /// ```
    /// use crust_ptr::{pointer_to, Nullable, Pointer};
    ///
    /// let x = 4;
    /// assert_eq!(Nullable::present(pointer_to(&x)).iter().count(), 1);
    /// assert_eq!(Nullable::<Pointer<'_, i32>>::new().iter().count(), 0);
    /// ```
    #[inline]
    pub fn iter(&self) -> std::option::Iter<'_, P> {
        self.0.iter()
    }

    /////////////////////////////////////////////////////////////////////////
    // Changing the contained pointer
    /////////////////////////////////////////////////////////////////////////

    /// Makes the pointer absent.
    #[inline]
    pub fn set_absent(&mut self) {
        self.0 = None;
    }

    /// Stores any pointer that converts into `P`.
    ///
    /// ```
    /// use crust_ptr::{pointer_to_mut, Nullable, Pointer};
    ///
    /// let mut x = 1;
    /// let mut n: Nullable<Pointer<'_, i32>> = Nullable::new();
    /// n.assign(pointer_to_mut(&mut x));
    /// assert!(n.has_value());
    /// ```
    #[inline]
    pub fn assign<Q: Into<P>>(&mut self, ptr: Q) {
        self.0 = Some(ptr.into());
    }

    /// Takes the pointer out, leaving the absent state behind.
    #[inline]
    pub fn take(&mut self) -> Option<P> {
        self.0.take()
    }

    /// Stores `ptr`, returning the previous pointer if any.
    #[inline]
    pub fn replace(&mut self, ptr: P) -> Option<P> {
        self.0.replace(ptr)
    }

    /////////////////////////////////////////////////////////////////////////
    // Transforming the contained pointer
    /////////////////////////////////////////////////////////////////////////

    /// Converts the pointer along the pointer conversion graph, keeping the
    /// absent state.
    ///
    /// ```
    /// use crust_ptr::{pointer_to_mut, AnyPointer, Mut, Nullable};
    ///
    /// let mut x = 7;
    /// let n = Nullable::present(pointer_to_mut(&mut x));
    /// let erased: Nullable<AnyPointer<'_, Mut>> = n.convert();
    /// assert!(erased.value().unwrap().is::<i32>());
    /// ```
    #[inline]
    pub fn convert<Q: NullablePointer + From<P>>(self) -> Nullable<Q> {
        Nullable(self.0.map(Q::from))
    }

    /// Maps a present pointer with `f`.
    #[inline]
    pub fn map<Q: NullablePointer, F: FnOnce(P) -> Q>(self, f: F) -> Nullable<Q> {
        Nullable(self.0.map(f))
    }

    #[inline]
    pub fn into_option(self) -> Option<P> {
        self.0
    }
}

impl<P: NullablePointer> Deref for Nullable<P> {
    type Target = P;

    /// # Panics
    ///
    /// With [`PointerError::BadAccess`] when absent. Use
    /// [`Nullable::value`] for a checked access.
    #[inline]
    #[track_caller]
    fn deref(&self) -> &P {
        match &self.0 {
            Some(ptr) => ptr,
            None => raise(PointerError::BadAccess),
        }
    }
}

impl<P: NullablePointer> Clone for Nullable<P> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: NullablePointer> Copy for Nullable<P> {}

impl<P: NullablePointer> Default for Nullable<P> {
    #[inline]
    fn default() -> Self {
        Nullable::new()
    }
}

impl<P: NullablePointer> From<P> for Nullable<P> {
    #[inline]
    fn from(ptr: P) -> Self {
        Nullable(Some(ptr))
    }
}

impl<P: NullablePointer> From<Absent> for Nullable<P> {
    #[inline]
    fn from(_: Absent) -> Self {
        Nullable(None)
    }
}

impl<P: NullablePointer> From<Option<P>> for Nullable<P> {
    #[inline]
    fn from(ptr: Option<P>) -> Self {
        Nullable(ptr)
    }
}

impl<P: NullablePointer> From<Nullable<P>> for Option<P> {
    #[inline]
    fn from(n: Nullable<P>) -> Self {
        n.0
    }
}

impl<'n, P: NullablePointer> IntoIterator for &'n Nullable<P> {
    type Item = &'n P;
    type IntoIter = std::option::Iter<'n, P>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<P: NullablePointer> IntoIterator for Nullable<P> {
    type Item = P;
    type IntoIter = std::option::IntoIter<P>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// Edges of the pointer conversion graph, lifted to `Nullable`. Each edge
// comes in two forms: from a bare pointer and from a nullable one.

macro_rules! nullable_edge {
    (<$($g:tt),*> $src:ty => $dst:ty $(where $($bound:tt)+)?) => {
        impl<$($g),*> From<$src> for Nullable<$dst> $(where $($bound)+)? {
            #[inline]
            fn from(ptr: $src) -> Self {
                Nullable(Some(<$dst>::from(ptr)))
            }
        }

        impl<$($g),*> From<Nullable<$src>> for Nullable<$dst> $(where $($bound)+)? {
            #[inline]
            fn from(n: Nullable<$src>) -> Self {
                n.convert()
            }
        }
    };
}

nullable_edge!(<'a, T> Pointer<'a, T, Mut> => Pointer<'a, T, Const> where T: ?Sized);
nullable_edge!(<'a, T> ArrayPointer<'a, T, Mut> => ArrayPointer<'a, T, Const>);
nullable_edge!(<'a> AnyPointer<'a, Mut> => AnyPointer<'a, Const>);
nullable_edge!(
    <'a, T, M, M2> Pointer<'a, T, M> => AnyPointer<'a, M2>
    where T: 'static, M: Weaken<M2>, M2: Mutability
);

impl<P: NullablePointer + PartialEq> PartialEq for Nullable<P> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<P: NullablePointer + Eq> Eq for Nullable<P> {}

impl<P: NullablePointer + PartialEq> PartialEq<P> for Nullable<P> {
    #[inline]
    fn eq(&self, other: &P) -> bool {
        self.0.as_ref() == Some(other)
    }
}

impl<P: NullablePointer + PartialEq> PartialEq<Absent> for Nullable<P> {
    #[inline]
    fn eq(&self, _: &Absent) -> bool {
        self.0.is_none()
    }
}

/// The absent state orders before every present pointer.
impl<P: NullablePointer + PartialOrd> PartialOrd for Nullable<P> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl<P: NullablePointer + Ord> Ord for Nullable<P> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<P: NullablePointer + Hash> Hash for Nullable<P> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<P: NullablePointer + fmt::Debug> fmt::Debug for Nullable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(ptr) => f.debug_tuple("Present").field(ptr).finish(),
            None => f.write_str("Absent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{pointer_to_array, pointer_to_mut_array};
    use crate::pointer::{pointer_to, pointer_to_mut};
    use static_assertions::{assert_eq_size, assert_impl_all, assert_not_impl_any};
    use std::any::Any;

    assert_eq_size!(Nullable<Pointer<'static, i32>>, Pointer<'static, i32>);
    assert_eq_size!(Nullable<Pointer<'static, i32, Mut>>, *mut i32);
    assert_eq_size!(Nullable<Pointer<'static, dyn Any>>, Pointer<'static, dyn Any>);
    assert_eq_size!(Nullable<Pointer<'static, str>>, *const str);
    assert_eq_size!(Nullable<AnyPointer<'static>>, AnyPointer<'static>);
    assert_eq_size!(Nullable<AnyPointer<'static, Mut>>, AnyPointer<'static, Mut>);
    assert_eq_size!(Nullable<ArrayPointer<'static, u8>>, ArrayPointer<'static, u8>);
    assert_eq_size!(Nullable<ArrayPointer<'static, u64, Mut>>, *mut [u64]);

    assert_impl_all!(
        Nullable<Pointer<'static, i32, Const>>:
        From<Pointer<'static, i32, Mut>>,
        From<Nullable<Pointer<'static, i32, Mut>>>,
        From<Absent>,
        Copy,
        Default
    );
    assert_impl_all!(
        Nullable<AnyPointer<'static, Const>>:
        From<Pointer<'static, i32, Const>>,
        From<Pointer<'static, i32, Mut>>,
        From<AnyPointer<'static, Mut>>,
        From<Nullable<Pointer<'static, i32, Mut>>>,
        From<Nullable<AnyPointer<'static, Mut>>>
    );
    assert_impl_all!(
        Nullable<AnyPointer<'static, Mut>>:
        From<Pointer<'static, i32, Mut>>,
        From<Nullable<Pointer<'static, i32, Mut>>>
    );
    assert_impl_all!(
        Nullable<ArrayPointer<'static, i32, Const>>:
        From<ArrayPointer<'static, i32, Mut>>,
        From<Nullable<ArrayPointer<'static, i32, Mut>>>
    );

    // Constness is never dropped, and erased pointers are never recovered
    // implicitly.
    assert_not_impl_any!(
        Nullable<Pointer<'static, i32, Mut>>:
        From<Pointer<'static, i32, Const>>,
        From<Nullable<Pointer<'static, i32, Const>>>,
        From<AnyPointer<'static, Mut>>
    );
    assert_not_impl_any!(
        Nullable<AnyPointer<'static, Mut>>:
        From<Pointer<'static, i32, Const>>,
        From<AnyPointer<'static, Const>>,
        From<Nullable<AnyPointer<'static, Const>>>
    );
    assert_not_impl_any!(
        Nullable<ArrayPointer<'static, i32, Mut>>:
        From<ArrayPointer<'static, i32, Const>>,
        From<Nullable<ArrayPointer<'static, i32, Const>>>
    );
    assert_not_impl_any!(Nullable<Pointer<'static, i64>>: From<Pointer<'static, i32>>);

    #[test]
    fn starts_absent_then_assigned() {
        let x = 42;
        let mut n: Nullable<Pointer<'_, i32>> = Nullable::new();
        assert!(!n.has_value());
        assert_eq!(n.value(), Err(PointerError::BadAccess));

        n.assign(pointer_to(&x));
        assert!(n.has_value());
        assert_eq!(**n, 42);
        assert_eq!(n.value().map(|p| **p), Ok(42));
    }

    #[test]
    #[should_panic(expected = "bad access")]
    fn deref_of_absent_panics() {
        let n: Nullable<Pointer<'_, i32>> = Nullable::default();
        let _ptr = *n;
    }

    #[test]
    fn absent_marker() {
        let x = 1;
        let mut n: Nullable<Pointer<'_, i32>> = pointer_to(&x).into();
        assert_ne!(n, Absent);
        n = Absent.into();
        assert_eq!(n, Absent);
        assert_eq!(n, Nullable::absent());

        n = Nullable::present(pointer_to(&x));
        n.set_absent();
        assert!(!n.has_value());
    }

    #[test]
    fn converting_constructors_follow_the_pointer_graph() -> anyhow::Result<()> {
        let mut x = 5;
        let m = pointer_to_mut(&mut x);

        let c: Nullable<Pointer<'_, i32>> = m.into();
        assert_eq!(c, m.into_const());

        let nm = Nullable::present(m);
        let c: Nullable<Pointer<'_, i32>> = nm.into();
        assert_eq!(c.value()?.addr(), m.addr());

        let erased: Nullable<AnyPointer<'_, Mut>> = nm.into();
        assert_eq!(erased.value()?.downcast::<i32>()?, m);

        let erased_const: Nullable<AnyPointer<'_>> = erased.into();
        assert!(erased_const.value()?.is::<i32>());

        let absent: Nullable<Pointer<'_, i32, Mut>> = Nullable::new();
        let still_absent: Nullable<AnyPointer<'_>> = absent.into();
        assert!(!still_absent.has_value());
        Ok(())
    }

    #[test]
    fn array_edges() {
        let mut arr = [1, 2, 3];
        let m = pointer_to_mut_array(&mut arr);
        let n: Nullable<ArrayPointer<'_, i32>> = Nullable::present(m).into();
        assert_eq!(n.value().map(|p| p.len()), Ok(3));
        assert_eq!(n.iter().next().map(|p| p[2]), Some(3));
    }

    #[test]
    fn convert_and_assign_take_any_source() {
        let mut x = 9;
        let mut n: Nullable<AnyPointer<'_>> = Nullable::new();
        n.assign(pointer_to_mut(&mut x));
        assert!(n.value().map(|p| p.is::<i32>()).unwrap_or(false));

        let arr = [1u8, 2];
        let n = Nullable::present(pointer_to_array(&arr));
        let converted: Nullable<ArrayPointer<'_, u8>> = n.convert();
        assert_eq!(converted, n);
    }

    #[test]
    fn iteration_yields_zero_or_one_item() {
        let x = 3;
        let present = Nullable::present(pointer_to(&x));
        let absent: Nullable<Pointer<'_, i32>> = Nullable::new();

        assert_eq!(present.into_iter().map(|p| *p).collect::<Vec<_>>(), [3]);
        assert_eq!(absent.into_iter().count(), 0);
        for p in &present {
            assert_eq!(**p, 3);
        }
        for _ in &absent {
            panic!("absent pointer yielded an item");
        }
    }

    #[test]
    fn take_replace_and_option_interop() {
        let (a, b) = (1, 2);
        let mut n = Nullable::present(pointer_to(&a));

        assert_eq!(n.replace(pointer_to(&b)), Some(pointer_to(&a)));
        assert_eq!(n.take(), Some(pointer_to(&b)));
        assert!(!n.has_value());

        let n: Nullable<Pointer<'_, i32>> = Some(pointer_to(&a)).into();
        assert_eq!(n.into_option(), Some(pointer_to(&a)));
        let opt: Option<Pointer<'_, i32>> = n.into();
        assert_eq!(opt.map(|p| *p), Some(1));
        assert_eq!(n.get(), opt);

        let mapped = n.map(|p| p.erase());
        assert!(mapped.value().map(|p| p.is::<i32>()).unwrap_or(false));
    }

    #[test]
    fn dynamic_cast_results() {
        let value: Box<dyn Any> = Box::new(5u16);
        let p = pointer_to(&*value);

        let hit = p.dynamic_cast::<u16>();
        assert_eq!(hit.value().map(|p| **p), Ok(5));

        let miss = p.dynamic_cast::<u32>();
        assert_eq!(miss, Absent);
    }

    #[test]
    fn absent_orders_first() {
        let x = 0;
        let present = Nullable::present(pointer_to(&x));
        let absent = Nullable::new();
        assert!(absent < present);
        assert_eq!(format!("{absent:?}"), "Absent");
        assert!(format!("{present:?}").starts_with("Present(Pointer<Const>("));
    }
}
