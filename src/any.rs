//! The type-erased pointer.
//!
//! Erasing a [`Pointer`] keeps its address and constness and records the
//! [`TypeId`] of the pointee. Recovering a typed pointer checks that tag, so
//! the round trip through `AnyPointer` is always safe.

use std::any::{type_name, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::{reject, PointerError, Result};
use crate::mutability::{Const, Mut, Mutability, Weaken};
use crate::pointer::Pointer;

/// A non-null pointer whose element type has been erased, the `void*` of
/// this crate.
///
/// Constness survives erasure: a `Pointer<T, Const>` can only become an
/// `AnyPointer<Const>`, and recovering through it only yields `Const`
/// pointers.
///
/// # Examples
///
/// ```
/// use crust_ptr::{pointer_to_mut, AnyPointer, Mut, PointerError};
///
/// let mut i = 7;
/// let any: AnyPointer<'_, Mut> = pointer_to_mut(&mut i).into();
///
/// assert!(matches!(any.downcast::<f32>(), Err(PointerError::TypeMismatch { .. })));
/// assert_eq!(*any.downcast::<i32>().unwrap(), 7);
/// ```
pub struct AnyPointer<'a, M: Mutability = Const> {
    addr: NonNull<()>,
    type_id: TypeId,
    type_name: &'static str,
    _marker: PhantomData<(&'a (), M)>,
}

impl<'a, T: 'static, M: Mutability> Pointer<'a, T, M> {
    /// Erases the element type, keeping the constness.
    #[inline]
    pub fn erase(self) -> AnyPointer<'a, M> {
        AnyPointer {
            addr: self.as_non_null().cast(),
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            _marker: PhantomData,
        }
    }
}

impl<'a> AnyPointer<'a, Const> {
    #[inline]
    pub fn from_ref<T: 'static>(r: &'a T) -> Self {
        Pointer::from_ref(r).erase()
    }
}

impl<'a> AnyPointer<'a, Mut> {
    #[inline]
    pub fn from_mut<T: 'static>(r: &'a mut T) -> Self {
        Pointer::from_mut(r).erase()
    }
}

impl<'a, M: Mutability> AnyPointer<'a, M> {
    /// Erases a raw address of a `T`.
    ///
    /// # Errors
    ///
    /// [`PointerError::NullPointer`] if `addr` is null.
    ///
    /// # Safety
    ///
    /// As for [`Pointer::from_raw_address`].
    pub unsafe fn from_raw_address<T: 'static>(addr: M::Raw<T>) -> Result<Self> {
        match M::raw_to_non_null(addr) {
            // SAFETY: checked non-null, the rest is on the caller.
            Some(addr) => Ok(unsafe { Pointer::<T, M>::from_non_null(addr) }.erase()),
            None => reject(PointerError::NullPointer("AnyPointer::from_raw_address")),
        }
    }

    #[inline(always)]
    pub fn to_address(self) -> M::Raw<()> {
        M::non_null_to_raw(self.addr)
    }

    #[inline(always)]
    pub const fn as_ptr(self) -> *const () {
        self.addr.as_ptr()
    }

    #[inline]
    pub fn addr(self) -> usize {
        sptr::Strict::addr(self.as_ptr())
    }

    /// The tag recorded at erasure.
    #[inline(always)]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline(always)]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if this pointer was erased from a pointer to `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Recovers the typed pointer.
    ///
    /// # Errors
    ///
    /// [`PointerError::TypeMismatch`] unless `T` is exactly the type this
    /// pointer was erased from.
    pub fn downcast<T: 'static>(self) -> Result<Pointer<'a, T, M>> {
        if self.is::<T>() {
            // SAFETY: the erasure tag matches `T`.
            Ok(unsafe { self.cast::<T>() })
        } else {
            reject(PointerError::TypeMismatch {
                expected: type_name::<T>(),
                found: self.type_name,
            })
        }
    }

    /// Recovers the typed pointer while adding constness.
    ///
    /// # Errors
    ///
    /// Same as [`downcast`](Self::downcast).
    #[inline]
    pub fn downcast_const<T: 'static>(self) -> Result<Pointer<'a, T, Const>> {
        self.downcast().map(Pointer::into_const)
    }

    /// Recovers a raw address of the original type.
    ///
    /// # Errors
    ///
    /// Same as [`downcast`](Self::downcast).
    #[inline]
    pub fn downcast_address<T: 'static>(self) -> Result<M::Raw<T>> {
        self.downcast::<T>().map(Pointer::to_address)
    }

    /// Reinterprets the pointee as a `T` without looking at the tag.
    ///
    /// # Safety
    ///
    /// The pointee must really be a `T`.
    #[inline(always)]
    pub unsafe fn cast<T>(self) -> Pointer<'a, T, M> {
        unsafe { Pointer::from_non_null(self.addr.cast()) }
    }

    /// Changes constness, keeping the tag.
    ///
    /// # Safety
    ///
    /// As for [`Pointer::cast_mutability`].
    #[inline(always)]
    pub unsafe fn cast_mutability<M2: Mutability>(self) -> AnyPointer<'a, M2> {
        AnyPointer {
            addr: self.addr,
            type_id: self.type_id,
            type_name: self.type_name,
            _marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// As for [`Pointer::cast_mutability`].
    #[inline(always)]
    pub unsafe fn cast_mut(self) -> AnyPointer<'a, Mut> {
        unsafe { self.cast_mutability() }
    }

    #[inline(always)]
    pub fn into_const(self) -> AnyPointer<'a, Const> {
        // SAFETY: lowering to `Const` only removes capabilities.
        unsafe { self.cast_mutability() }
    }
}

impl<'a, T: 'static, M: Weaken<M2>, M2: Mutability> From<Pointer<'a, T, M>> for AnyPointer<'a, M2> {
    #[inline]
    fn from(p: Pointer<'a, T, M>) -> Self {
        // SAFETY: `M: Weaken<M2>` never raises constness.
        unsafe { p.erase().cast_mutability() }
    }
}

impl<'a> From<AnyPointer<'a, Mut>> for AnyPointer<'a, Const> {
    #[inline(always)]
    fn from(p: AnyPointer<'a, Mut>) -> Self {
        p.into_const()
    }
}

impl<'a, T: 'static, M: Mutability> TryFrom<AnyPointer<'a, M>> for Pointer<'a, T, M> {
    type Error = PointerError;

    #[inline]
    fn try_from(p: AnyPointer<'a, M>) -> Result<Self> {
        p.downcast()
    }
}

impl<M: Mutability> Clone for AnyPointer<'_, M> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: Mutability> Copy for AnyPointer<'_, M> {}

// The tag is not part of the identity: two erased pointers are equal when
// their addresses are.

impl<M: Mutability, M2: Mutability> PartialEq<AnyPointer<'_, M2>> for AnyPointer<'_, M> {
    #[inline]
    fn eq(&self, other: &AnyPointer<'_, M2>) -> bool {
        self.addr == other.addr
    }
}

impl<T: ?Sized, M: Mutability, M2: Mutability> PartialEq<Pointer<'_, T, M2>> for AnyPointer<'_, M> {
    #[inline]
    fn eq(&self, other: &Pointer<'_, T, M2>) -> bool {
        std::ptr::addr_eq(self.as_ptr(), other.as_ptr())
    }
}

impl<M: Mutability> Eq for AnyPointer<'_, M> {}

impl<M: Mutability> PartialOrd for AnyPointer<'_, M> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M: Mutability> Ord for AnyPointer<'_, M> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_ptr().cmp(&other.as_ptr())
    }
}

impl<M: Mutability> Hash for AnyPointer<'_, M> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_ptr().hash(state)
    }
}

impl<M: Mutability> fmt::Pointer for AnyPointer<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}

impl<M: Mutability> fmt::Debug for AnyPointer<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if M::MUTABLE { "Mut" } else { "Const" };
        write!(f, "AnyPointer<{kind}>({:p}: {})", self.as_ptr(), self.type_name)
    }
}
