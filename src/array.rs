//! Fat pointers to runs of elements.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::{self, NonNull};

use crate::error::{reject, PointerError, Result};
use crate::mutability::{Const, Mut, Mutability};
use crate::pointer::Pointer;
use crate::slice::SliceView;

/// A non-null pointer to `len` contiguous `T`s whose length is only known at
/// runtime.
///
/// Dereferencing yields a [`SliceView`], never an element. Like
/// [`Pointer`], it is `Copy`, compares by identity (base address and
/// length) and never owns its elements.
///
/// An `ArrayPointer<T, Mut>` converts into an `ArrayPointer<T, Const>`. There
/// is no conversion between arrays of different element types at all, so an
/// array of a derived type can never be walked with the stride of a base
/// type.
#[repr(transparent)]
pub struct ArrayPointer<'a, T, M: Mutability = Const> {
    addr: NonNull<[T]>,
    _marker: PhantomData<(&'a [T], M)>,
}

// SAFETY: same reasoning as for `Pointer`.
unsafe impl<T: Sync> Send for ArrayPointer<'_, T, Const> {}
unsafe impl<T: Sync> Sync for ArrayPointer<'_, T, Const> {}
unsafe impl<T: Send + Sync> Send for ArrayPointer<'_, T, Mut> {}
unsafe impl<T: Sync> Sync for ArrayPointer<'_, T, Mut> {}

impl<'a, T> ArrayPointer<'a, T, Const> {
    /// Points to the elements of any contiguous container: arrays, `Vec`s,
    /// slices, views.
    #[inline]
    pub fn pointer_to_array<R: AsRef<[T]> + ?Sized>(range: &'a R) -> Self {
        // SAFETY: built from a live borrow.
        unsafe { Self::new_unchecked(NonNull::from(range.as_ref())) }
    }
}

impl<'a, T> ArrayPointer<'a, T, Mut> {
    /// Points to the elements of a contiguous container for writing.
    #[inline]
    pub fn pointer_to_mut_array<R: AsMut<[T]> + ?Sized>(range: &'a mut R) -> Self {
        // SAFETY: built from a live unique borrow.
        unsafe { Self::new_unchecked(NonNull::from(range.as_mut())) }
    }

    /// The elements as a writable view with the full lifetime `'a`.
    ///
    /// # Safety
    ///
    /// No other reference into the elements may be alive while the returned
    /// view is used, including through copies of this pointer.
    #[inline(always)]
    pub unsafe fn as_mut(&self) -> &'a mut SliceView<T> {
        let mut addr = self.addr;
        SliceView::new_mut(unsafe { addr.as_mut() })
    }
}

impl<'a, T, M: Mutability> ArrayPointer<'a, T, M> {
    #[inline(always)]
    const unsafe fn new_unchecked(addr: NonNull<[T]>) -> Self {
        ArrayPointer {
            addr,
            _marker: PhantomData,
        }
    }

    /// Builds an array pointer from the address of the first element and an
    /// element count.
    ///
    /// # Errors
    ///
    /// [`PointerError::NullPointer`] if `addr` is null. The count is not
    /// checked.
    ///
    /// # Safety
    ///
    /// `addr` must point to at least `len` live, initialized `T`s that stay
    /// valid for `'a`. An inconsistent `len` is undefined behavior.
    pub unsafe fn from_address_with_size(addr: M::Raw<T>, len: usize) -> Result<Self> {
        match M::raw_to_non_null(addr) {
            Some(addr) => Ok(unsafe { Self::new_unchecked(NonNull::slice_from_raw_parts(addr, len)) }),
            None => reject(PointerError::NullPointer("ArrayPointer::from_address_with_size")),
        }
    }

    /// Address of the first element.
    #[inline(always)]
    pub fn to_address(self) -> M::Raw<T> {
        M::non_null_to_raw(self.addr.cast())
    }

    #[inline(always)]
    pub const fn as_ptr(self) -> *const T {
        self.addr.as_ptr() as *const T
    }

    #[inline(always)]
    pub const fn len(self) -> usize {
        self.addr.len()
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub const fn as_non_null(self) -> NonNull<[T]> {
        self.addr
    }

    /// The elements as a read-only view with the full lifetime `'a`.
    #[inline(always)]
    pub fn as_ref(&self) -> &'a SliceView<T> {
        // SAFETY: every safe constructor borrows the elements for `'a`;
        // unsafe ones make the caller promise the same.
        SliceView::new(unsafe { self.addr.as_ref() })
    }

    /// A pointer to the `index`th element.
    ///
    /// # Errors
    ///
    /// [`BoundsViolation::Index`](crate::BoundsViolation::Index) when
    /// `index >= len`.
    pub fn element(self, index: usize) -> Result<Pointer<'a, T, M>> {
        self.as_ref().try_index(index)?;
        // SAFETY: in bounds, so the address is non-null and live for `'a`.
        Ok(unsafe { Pointer::from_non_null(self.addr.cast::<T>().add(index)) })
    }

    /// # Safety
    ///
    /// As for [`Pointer::cast_mutability`].
    #[inline(always)]
    pub const unsafe fn cast_mutability<M2: Mutability>(self) -> ArrayPointer<'a, T, M2> {
        unsafe { ArrayPointer::new_unchecked(self.addr) }
    }

    /// # Safety
    ///
    /// As for [`Pointer::cast_mutability`].
    #[inline(always)]
    pub const unsafe fn cast_mut(self) -> ArrayPointer<'a, T, Mut> {
        unsafe { self.cast_mutability() }
    }

    #[inline(always)]
    pub const fn into_const(self) -> ArrayPointer<'a, T, Const> {
        // SAFETY: lowering to `Const` only removes capabilities.
        unsafe { self.cast_mutability() }
    }
}

impl<'a, R: ?Sized> Pointer<'a, R, Const> {
    /// Turns a pointer to a contiguous container into a pointer to its
    /// elements.
    #[inline]
    pub fn to_array<T>(self) -> ArrayPointer<'a, T, Const>
    where
        R: AsRef<[T]>,
    {
        ArrayPointer::pointer_to_array(self.as_ref())
    }
}

impl<'a, R: ?Sized> Pointer<'a, R, Mut> {
    /// Turns a writable pointer to a contiguous container into a writable
    /// pointer to its elements.
    ///
    /// # Safety
    ///
    /// The container is borrowed mutably for the call: no reference obtained
    /// through a copy of `self` may be alive.
    #[inline]
    pub unsafe fn to_array_mut<T>(self) -> ArrayPointer<'a, T, Mut>
    where
        R: AsMut<[T]>,
    {
        ArrayPointer::pointer_to_mut_array(unsafe { self.as_mut() })
    }
}

/// Points to the elements of a contiguous container, read-only.
#[inline]
pub fn pointer_to_array<T, R: AsRef<[T]> + ?Sized>(range: &R) -> ArrayPointer<'_, T, Const> {
    ArrayPointer::pointer_to_array(range)
}

/// Points to the elements of a contiguous container, allowing writes.
#[inline]
pub fn pointer_to_mut_array<T, R: AsMut<[T]> + ?Sized>(range: &mut R) -> ArrayPointer<'_, T, Mut> {
    ArrayPointer::pointer_to_mut_array(range)
}

impl<T, M: Mutability> Deref for ArrayPointer<'_, T, M> {
    type Target = SliceView<T>;

    #[inline(always)]
    fn deref(&self) -> &SliceView<T> {
        self.as_ref()
    }
}

impl<T, M: Mutability> Clone for ArrayPointer<'_, T, M> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, M: Mutability> Copy for ArrayPointer<'_, T, M> {}

impl<'a, T> From<ArrayPointer<'a, T, Mut>> for ArrayPointer<'a, T, Const> {
    #[inline(always)]
    fn from(p: ArrayPointer<'a, T, Mut>) -> Self {
        p.into_const()
    }
}

impl<'a, T> From<&'a [T]> for ArrayPointer<'a, T, Const> {
    #[inline]
    fn from(slice: &'a [T]) -> Self {
        ArrayPointer::pointer_to_array(slice)
    }
}

impl<'a, T> From<&'a mut [T]> for ArrayPointer<'a, T, Mut> {
    #[inline]
    fn from(slice: &'a mut [T]) -> Self {
        ArrayPointer::pointer_to_mut_array(slice)
    }
}

// Identity is (base, len): views of the same elements with different lengths
// are different pointers and hash differently.

impl<T, M: Mutability, M2: Mutability> PartialEq<ArrayPointer<'_, T, M2>> for ArrayPointer<'_, T, M> {
    #[inline]
    fn eq(&self, other: &ArrayPointer<'_, T, M2>) -> bool {
        ptr::eq(self.addr.as_ptr(), other.addr.as_ptr())
    }
}

impl<T, M: Mutability> Eq for ArrayPointer<'_, T, M> {}

impl<T, M: Mutability> PartialOrd for ArrayPointer<'_, T, M> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, M: Mutability> Ord for ArrayPointer<'_, T, M> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_ptr()
            .cmp(&other.as_ptr())
            .then(self.len().cmp(&other.len()))
    }
}

impl<T, M: Mutability> Hash for ArrayPointer<'_, T, M> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.as_ptr().hash(state)
    }
}

impl<T, M: Mutability> fmt::Pointer for ArrayPointer<'_, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}

impl<T, M: Mutability> fmt::Debug for ArrayPointer<'_, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if M::MUTABLE { "Mut" } else { "Const" };
        write!(f, "ArrayPointer<{kind}>({:p}; {})", self.as_ptr(), self.len())
    }
}
