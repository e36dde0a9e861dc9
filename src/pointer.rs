//! The non-null object pointer.

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::{self, NonNull};

use crate::error::{reject, PointerError, Result};
use crate::mutability::{Const, Mut, Mutability};
use crate::nullable::Nullable;

/// A non-null, non-owning pointer to a single `T`.
///
/// `M` is [`Const`] (the default) or [`Mut`]. A `Pointer<T, Mut>` converts
/// into a `Pointer<T, Const>` with `From`; going the other way needs the
/// `unsafe` [`cast_mut`](Pointer::cast_mut).
///
/// The lifetime `'a` is the borrow the pointer was created from. Pointers
/// built from raw addresses pick an unbounded lifetime, and keeping the
/// referent alive for as long as the pointer is used is then up to the
/// caller.
///
/// There is no null state and no arithmetic. Use
/// [`Nullable`](crate::Nullable) for "maybe no pointer" and
/// [`ArrayPointer`](crate::ArrayPointer) for runs of elements.
///
/// # Examples
///
/// ```
/// use crust_ptr::{pointer_to, pointer_to_mut, Const, Pointer};
///
/// let mut x = 10;
/// let p = pointer_to_mut(&mut x);
/// let c: Pointer<'_, i32, Const> = p.into();
///
/// assert_eq!(*c, 10);
/// assert_eq!(p, c);
/// ```
#[repr(transparent)]
pub struct Pointer<'a, T: ?Sized, M: Mutability = Const> {
    addr: NonNull<T>,
    _marker: PhantomData<(&'a T, M)>,
}

// SAFETY: a `Const` pointer behaves like `&T`.
unsafe impl<T: ?Sized + Sync> Send for Pointer<'_, T, Const> {}
unsafe impl<T: ?Sized + Sync> Sync for Pointer<'_, T, Const> {}

// SAFETY: a `Mut` pointer hands out `&T` safely and stays behind when a copy
// is sent, so sending one needs both `T: Send` and `T: Sync`.
unsafe impl<T: ?Sized + Send + Sync> Send for Pointer<'_, T, Mut> {}
unsafe impl<T: ?Sized + Sync> Sync for Pointer<'_, T, Mut> {}

impl<'a, T: ?Sized, M: Mutability> Pointer<'a, T, M> {
    #[inline(always)]
    pub(crate) const unsafe fn new_unchecked(addr: NonNull<T>) -> Self {
        Pointer {
            addr,
            _marker: PhantomData,
        }
    }

    /// Creates a pointer from a raw address.
    ///
    /// Only addresses of exactly `T` are accepted, and only with matching
    /// constness: a `*const T` can never become a `Pointer<T, Mut>`.
    ///
    /// # Errors
    ///
    /// [`PointerError::NullPointer`] if `addr` is null.
    ///
    /// # Safety
    ///
    /// `addr` must point to a live, properly aligned `T` that stays valid for
    /// `'a`. For `Mut` pointers the usual aliasing rules for `&mut T` apply
    /// whenever a unique reference is taken.
    #[inline]
    pub unsafe fn from_raw_address(addr: M::Raw<T>) -> Result<Self> {
        match M::raw_to_non_null(addr) {
            // SAFETY: the address was checked above.
            Some(addr) => Ok(unsafe { Self::new_unchecked(addr) }),
            None => reject(PointerError::NullPointer("Pointer::from_raw_address")),
        }
    }

    /// Creates a pointer from a [`NonNull`].
    ///
    /// # Safety
    ///
    /// Same as [`from_raw_address`](Self::from_raw_address), minus the null
    /// check which `NonNull` already guarantees.
    #[inline(always)]
    pub const unsafe fn from_non_null(addr: NonNull<T>) -> Self {
        unsafe { Self::new_unchecked(addr) }
    }

    /// The address this pointer was created from, as `*const T` or `*mut T`.
    #[inline(always)]
    pub fn to_address(self) -> M::Raw<T> {
        M::non_null_to_raw(self.addr)
    }

    #[inline(always)]
    pub const fn as_ptr(self) -> *const T {
        self.addr.as_ptr()
    }

    #[inline(always)]
    pub const fn as_non_null(self) -> NonNull<T> {
        self.addr
    }

    /// The integer address, without exposing provenance.
    #[inline]
    pub fn addr(self) -> usize {
        sptr::Strict::addr(self.addr.as_ptr().cast::<()>())
    }

    /// Returns a shared reference with the full lifetime `'a`.
    #[inline(always)]
    pub fn as_ref(&self) -> &'a T {
        // SAFETY: every safe constructor borrows a live `T` for `'a`; unsafe
        // constructors make the caller promise the same.
        unsafe { self.addr.as_ref() }
    }

    /// Reinterprets the pointee as a `U`, like a `static_cast`.
    ///
    /// Works for any source, including trait objects (base to derived).
    ///
    /// # Safety
    ///
    /// The pointee must really be a `U`. Nothing is checked; for a checked
    /// version see [`dynamic_cast`](Self::dynamic_cast) and
    /// [`AnyPointer::downcast`](crate::AnyPointer::downcast).
    #[inline(always)]
    pub const unsafe fn cast<U>(self) -> Pointer<'a, U, M> {
        unsafe { Pointer::new_unchecked(self.addr.cast()) }
    }

    /// Changes constness without touching address or type.
    ///
    /// # Safety
    ///
    /// Raising to [`Mut`] is sound only if the referent may be mutated:
    /// writing to an object that was immutable at its origin is undefined
    /// behavior.
    #[inline(always)]
    pub const unsafe fn cast_mutability<M2: Mutability>(self) -> Pointer<'a, T, M2> {
        unsafe { Pointer::new_unchecked(self.addr) }
    }

    /// Removes constness. See [`cast_mutability`](Self::cast_mutability).
    ///
    /// # Safety
    ///
    /// Same as [`cast_mutability`](Self::cast_mutability).
    #[inline(always)]
    pub const unsafe fn cast_mut(self) -> Pointer<'a, T, Mut> {
        unsafe { self.cast_mutability() }
    }

    /// Adds constness. Always safe.
    #[inline(always)]
    pub const fn into_const(self) -> Pointer<'a, T, Const> {
        // SAFETY: lowering to `Const` only removes capabilities.
        unsafe { self.cast_mutability() }
    }

    /// Rewrites the address with `f`. Backs [`upcast!`](crate::upcast).
    ///
    /// # Safety
    ///
    /// `f` must return an address of a live `U` valid for `'a` with the same
    /// provenance as its argument.
    #[doc(hidden)]
    #[inline(always)]
    pub unsafe fn map_address<U: ?Sized>(
        self,
        f: impl FnOnce(NonNull<T>) -> NonNull<U>,
    ) -> Pointer<'a, U, M> {
        unsafe { Pointer::new_unchecked(f(self.addr)) }
    }
}

impl<'a, T: ?Sized> Pointer<'a, T, Const> {
    /// Points to an existing object. Always succeeds.
    #[inline(always)]
    pub fn from_ref(r: &'a T) -> Self {
        // SAFETY: a reference is never null.
        unsafe { Self::new_unchecked(NonNull::from(r)) }
    }
}

impl<'a, T: ?Sized> Pointer<'a, T, Mut> {
    /// Points to an existing object through which the caller may write.
    #[inline(always)]
    pub fn from_mut(r: &'a mut T) -> Self {
        // SAFETY: a reference is never null.
        unsafe { Self::new_unchecked(NonNull::from(r)) }
    }

    /// Returns a unique reference with the full lifetime `'a`.
    ///
    /// # Safety
    ///
    /// No other reference to the pointee may be alive while the returned
    /// one is used, including those obtained from copies of this pointer,
    /// and the pointee must not have been immutable at its origin.
    #[inline(always)]
    pub unsafe fn as_mut(&self) -> &'a mut T {
        let mut addr = self.addr;
        unsafe { addr.as_mut() }
    }
}

/// Trait objects that can report the concrete type behind them, which is
/// what [`Pointer::dynamic_cast`] checks against.
///
/// Implemented for `dyn Any` and its `Send`/`Sync` forms. A user trait with
/// `Any` as a supertrait can opt in:
///
/// ```
/// use std::any::{Any, TypeId};
/// use crust_ptr::Polymorphic;
///
/// trait Shape: Any {}
///
/// impl Polymorphic for dyn Shape {
///     fn concrete_type_id(&self) -> TypeId {
///         let any: &dyn Any = self;
///         any.type_id()
///     }
/// }
/// ```
pub trait Polymorphic: 'static {
    fn concrete_type_id(&self) -> TypeId;
}

impl Polymorphic for dyn Any {
    #[inline]
    fn concrete_type_id(&self) -> TypeId {
        self.type_id()
    }
}

impl Polymorphic for dyn Any + Send {
    #[inline]
    fn concrete_type_id(&self) -> TypeId {
        let any: &dyn Any = self;
        any.type_id()
    }
}

impl Polymorphic for dyn Any + Send + Sync {
    #[inline]
    fn concrete_type_id(&self) -> TypeId {
        let any: &dyn Any = self;
        any.type_id()
    }
}

impl<'a, T: ?Sized + Polymorphic, M: Mutability> Pointer<'a, T, M> {
    /// Checked base-to-derived cast.
    ///
    /// Present with the derived pointer if the object behind `self` really is
    /// a `U`, absent otherwise.
    pub fn dynamic_cast<U: Any>(self) -> Nullable<Pointer<'a, U, M>> {
        if self.as_ref().concrete_type_id() == TypeId::of::<U>() {
            // SAFETY: the runtime type was just checked.
            Nullable::present(unsafe { self.cast::<U>() })
        } else {
            log::debug!(
                target: "crust_ptr",
                "dynamic_cast to `{}` failed",
                std::any::type_name::<U>()
            );
            Nullable::new()
        }
    }
}

/// Performs the derived-to-base conversion of a [`Pointer`]: an unsizing
/// coercion to a trait object (or any other unsized target the compiler
/// accepts), keeping constness and lifetime.
///
/// ```
/// use std::fmt::Debug;
/// use crust_ptr::{pointer_to, upcast, Pointer};
///
/// let x = 5u8;
/// let p: Pointer<'_, dyn Debug> = upcast!(pointer_to(&x) => dyn Debug);
/// assert_eq!(format!("{:?}", &*p), "5");
/// ```
#[macro_export]
macro_rules! upcast {
    ($ptr:expr => $target:ty) => {
        // SAFETY: the closure is an unsizing coercion checked by the compiler.
        unsafe {
            $crate::Pointer::map_address($ptr, |addr| -> ::core::ptr::NonNull<$target> { addr })
        }
    };
}

/// Points to an existing object, read-only.
#[inline(always)]
pub fn pointer_to<T: ?Sized>(r: &T) -> Pointer<'_, T, Const> {
    Pointer::from_ref(r)
}

/// Points to an existing object, allowing writes.
#[inline(always)]
pub fn pointer_to_mut<T: ?Sized>(r: &mut T) -> Pointer<'_, T, Mut> {
    Pointer::from_mut(r)
}

impl<T: ?Sized, M: Mutability> Deref for Pointer<'_, T, M> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        self.as_ref()
    }
}

impl<T: ?Sized, M: Mutability> Clone for Pointer<'_, T, M> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized, M: Mutability> Copy for Pointer<'_, T, M> {}

impl<'a, T: ?Sized> From<&'a T> for Pointer<'a, T, Const> {
    #[inline]
    fn from(r: &'a T) -> Self {
        Pointer::from_ref(r)
    }
}

impl<'a, T: ?Sized> From<&'a mut T> for Pointer<'a, T, Mut> {
    #[inline]
    fn from(r: &'a mut T) -> Self {
        Pointer::from_mut(r)
    }
}

impl<'a, T: ?Sized> From<Pointer<'a, T, Mut>> for Pointer<'a, T, Const> {
    #[inline(always)]
    fn from(p: Pointer<'a, T, Mut>) -> Self {
        p.into_const()
    }
}

impl<T: ?Sized, M: Mutability> From<Pointer<'_, T, M>> for NonNull<T> {
    #[inline(always)]
    fn from(p: Pointer<'_, T, M>) -> Self {
        p.addr
    }
}

// Comparisons only look at the address: trait object metadata never takes
// part, so equal pointers always hash and order the same way.

impl<T: ?Sized, U: ?Sized, M: Mutability, M2: Mutability> PartialEq<Pointer<'_, U, M2>>
    for Pointer<'_, T, M>
{
    #[inline]
    fn eq(&self, other: &Pointer<'_, U, M2>) -> bool {
        ptr::addr_eq(self.as_ptr(), other.as_ptr())
    }
}

impl<T: ?Sized, M: Mutability> Eq for Pointer<'_, T, M> {}

impl<T: ?Sized, M: Mutability> PartialOrd for Pointer<'_, T, M> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ?Sized, M: Mutability> Ord for Pointer<'_, T, M> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_ptr().cast::<()>().cmp(&other.as_ptr().cast::<()>())
    }
}

impl<T: ?Sized, M: Mutability> Hash for Pointer<'_, T, M> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_ptr().cast::<()>().hash(state)
    }
}

impl<T: ?Sized, M: Mutability> fmt::Pointer for Pointer<'_, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}

impl<T: ?Sized, M: Mutability> fmt::Debug for Pointer<'_, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if M::MUTABLE { "Mut" } else { "Const" };
        write!(f, "Pointer<{kind}>({:p})", self.as_ptr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::RandomState;
    use std::collections::{BTreeSet, HashSet};
    use std::hash::BuildHasher;

    trait Base: Any {
        fn name(&self) -> char;
    }

    impl Polymorphic for dyn Base {
        fn concrete_type_id(&self) -> TypeId {
            let any: &dyn Any = self;
            any.type_id()
        }
    }

    struct Plain;
    struct Derived;
    struct OtherDerived;

    impl Base for Plain {
        fn name(&self) -> char {
            'B'
        }
    }

    impl Base for Derived {
        fn name(&self) -> char {
            'D'
        }
    }

    impl Base for OtherDerived {
        fn name(&self) -> char {
            'O'
        }
    }

    #[test]
    fn to_address_returns_the_object_address() {
        let mut i = 0;
        let expected: *mut i32 = &mut i;
        let p = pointer_to_mut(&mut i);
        assert_eq!(p.to_address(), expected);
        assert_eq!(p.as_ptr(), expected.cast_const());
        assert_eq!(*p, 0);
        unsafe { *p.as_mut() = 1 };
        assert_eq!(i, 1);
    }

    #[test]
    fn from_raw_address_round_trips() -> anyhow::Result<()> {
        let mut i = 7;
        let raw: *mut i32 = &mut i;
        let p = unsafe { Pointer::<i32, Mut>::from_raw_address(raw)? };
        assert_eq!(p.to_address(), raw);

        let c = unsafe { Pointer::<i32>::from_raw_address(raw.cast_const())? };
        assert_eq!(c.to_address(), raw.cast_const());
        assert_eq!(*c, 7);
        Ok(())
    }

    #[test]
    fn from_raw_address_rejects_null() {
        let err = unsafe { Pointer::<i32, Mut>::from_raw_address(ptr::null_mut()) }.unwrap_err();
        assert!(matches!(err, PointerError::NullPointer(_)));
        let err = unsafe { Pointer::<i32>::from_raw_address(ptr::null()) }.unwrap_err();
        assert!(matches!(err, PointerError::NullPointer(_)));
    }

    #[test]
    fn mut_converts_to_const() {
        let mut i = 3;
        let p = pointer_to_mut(&mut i);
        let c: Pointer<'_, i32> = p.into();
        assert_eq!(c, p);
        assert_eq!(*c, 3);
    }

    #[test]
    fn const_cast_removes_and_adds_constness() {
        let mut i = 0;
        let c: Pointer<'_, i32> = pointer_to_mut(&mut i).into();
        let m = unsafe { c.cast_mut() };
        unsafe { *m.as_mut() = 3 };
        assert_eq!(i, 3);
    }

    #[test]
    fn casting_to_own_type_is_identity() {
        let i = 4;
        let p = pointer_to(&i);
        assert_eq!(unsafe { p.cast_mutability::<Const>() }, p);
        assert_eq!(unsafe { p.cast::<i32>() }, p);
        assert_eq!(p.into_const(), p);
    }

    #[test]
    fn upcast_keeps_dynamic_dispatch() {
        let mut d = Derived;
        let pb: Pointer<'_, dyn Base, Mut> = upcast!(pointer_to_mut(&mut d) => dyn Base);
        assert_eq!(pb.name(), 'D');
        let addr = pb.addr();
        assert_eq!(addr, pointer_to(&d).addr());
    }

    #[test]
    fn static_cast_from_base_to_derived() {
        let d = Derived;
        let pb: Pointer<'_, dyn Base> = upcast!(pointer_to(&d) => dyn Base);
        let pd = unsafe { pb.cast::<Derived>() };
        assert_eq!(pd.as_ptr(), &d as *const Derived);
    }

    #[test]
    fn dynamic_cast_checks_the_runtime_type() {
        let d = Derived;
        let pb: Pointer<'_, dyn Base> = upcast!(pointer_to(&d) => dyn Base);

        let ok = pb.dynamic_cast::<Derived>();
        assert!(ok.has_value());
        assert_eq!(ok.value().map(|p| p.as_ptr()), Ok(&d as *const Derived));

        assert!(!pb.dynamic_cast::<OtherDerived>().has_value());

        let b = Plain;
        let pb: Pointer<'_, dyn Base> = upcast!(pointer_to(&b) => dyn Base);
        assert_eq!(pb.name(), 'B');
        assert!(!pb.dynamic_cast::<Derived>().has_value());
    }

    #[test]
    fn dynamic_cast_on_dyn_any() {
        let mut x = 5u16;
        let p: Pointer<'_, dyn Any, Mut> = upcast!(pointer_to_mut(&mut x) => dyn Any);
        let back = p.dynamic_cast::<u16>();
        assert!(back.has_value());
        assert!(!p.dynamic_cast::<i16>().has_value());
        unsafe { *back.value().expect("present").as_mut() = 6 };
        assert_eq!(x, 6);
    }

    #[test]
    fn comparisons_follow_the_address() {
        let arr = [1, 2, 3, 4, 5];
        let p0 = pointer_to(&arr[0]);
        let p4 = pointer_to(&arr[4]);

        assert_eq!(p0, p0);
        assert_ne!(p0, p4);
        assert_eq!(p0.cmp(&p0), Ordering::Equal);
        assert_eq!(p0.cmp(&p4), Ordering::Less);
        assert_eq!(p4.cmp(&p0), Ordering::Greater);
        assert!(p0 < p4);
    }

    #[test]
    fn hash_matches_the_raw_address() {
        let i = 0;
        let state = RandomState::new();
        assert_eq!(
            state.hash_one(pointer_to(&i)),
            state.hash_one(&i as *const i32)
        );
    }

    #[test]
    fn usable_as_container_keys() {
        let (a, b) = (1, 2);
        let set: HashSet<Pointer<'_, i32>> = [pointer_to(&a), pointer_to(&b), pointer_to(&a)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);

        let ordered: BTreeSet<_> = set.into_iter().collect();
        assert_eq!(ordered.len(), 2);
    }

    #[test]
    fn pointer_to_pointer() {
        let mut i = 0;
        let mut inner = pointer_to_mut(&mut i);
        let outer = pointer_to_mut(&mut inner);
        unsafe { *outer.as_ref().as_mut() = 99 };
        assert_eq!(i, 99);
    }

    #[test]
    fn debug_names_the_constness() {
        let i = 0;
        assert!(format!("{:?}", pointer_to(&i)).starts_with("Pointer<Const>(0x"));
    }
}
