//! The view an [`ArrayPointer`](crate::ArrayPointer) dereferences to.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};
use std::ptr::NonNull;

use crate::error::{raise, reject, BoundsViolation, PointerError, Result};
use crate::iter::{CheckedIterator, Iter, IterMut};
use crate::mutability::{Const, Mut};

/// A bounds-checked, non-owning run of `T`s.
///
/// `SliceView` is unsized, so it only ever exists behind a reference: it
/// can't be held by value, copied or moved, and it has no identity of its
/// own. Constness is deep: through `&SliceView<T>` the elements are
/// read-only, through `&mut SliceView<T>` they are writable.
///
/// Indexing with `[]` panics on a bad index (a programming error);
/// [`at`](SliceView::at) reports the same condition as
/// [`PointerError::OutOfRange`] for callers that expect it.
///
/// # Examples
///
/// ```
/// use crust_ptr::{pointer_to_array, PointerError};
///
/// let arr = [1, 2, 3, 4, 5];
/// let p = pointer_to_array(&arr);
/// let v = &*p;
///
/// assert_eq!(v[4], 5);
/// assert_eq!(v.at(5), Err(PointerError::OutOfRange { index: 5, len: 5 }));
/// assert!(v.iter().rev().copied().eq([5, 4, 3, 2, 1]));
/// ```
#[repr(transparent)]
pub struct SliceView<T> {
    elements: [T],
}

impl<T> SliceView<T> {
    /// Views an existing slice. Views are handed out by [`ArrayPointer`].
    ///
    /// [`ArrayPointer`]: crate::ArrayPointer
    #[inline(always)]
    pub(crate) fn new(slice: &[T]) -> &SliceView<T> {
        // SAFETY: `SliceView<T>` is a transparent wrapper around `[T]`.
        unsafe { &*(slice as *const [T] as *const SliceView<T>) }
    }

    #[inline(always)]
    pub(crate) fn new_mut(slice: &mut [T]) -> &mut SliceView<T> {
        // SAFETY: as above.
        unsafe { &mut *(slice as *mut [T] as *mut SliceView<T>) }
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Address of the first element (dangling but non-null when empty).
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.elements.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.elements.as_mut_ptr()
    }

    #[inline(always)]
    pub const fn as_slice(&self) -> &[T] {
        &self.elements
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.elements
    }

    #[inline]
    fn index_violation(&self, index: usize) -> BoundsViolation {
        BoundsViolation::Index {
            index,
            len: self.len(),
        }
    }

    /// The checked element access behind `view[index]`.
    ///
    /// # Errors
    ///
    /// [`BoundsViolation::Index`] when `index >= len`.
    #[inline]
    pub fn try_index(&self, index: usize) -> Result<&T> {
        match self.elements.get(index) {
            Some(element) => Ok(element),
            None => reject(self.index_violation(index)),
        }
    }

    #[inline]
    pub fn try_index_mut(&mut self, index: usize) -> Result<&mut T> {
        let violation = self.index_violation(index);
        match self.elements.get_mut(index) {
            Some(element) => Ok(element),
            None => reject(violation),
        }
    }

    /// The explicitly range-checked accessor.
    ///
    /// # Errors
    ///
    /// [`PointerError::OutOfRange`] when `index >= len`.
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len();
        match self.elements.get(index) {
            Some(element) => Ok(element),
            None => reject(PointerError::OutOfRange { index, len }),
        }
    }

    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len();
        match self.elements.get_mut(index) {
            Some(element) => Ok(element),
            None => reject(PointerError::OutOfRange { index, len }),
        }
    }

    /// # Errors
    ///
    /// [`BoundsViolation::Empty`] on an empty view.
    #[inline]
    pub fn front(&self) -> Result<&T> {
        match self.elements.first() {
            Some(element) => Ok(element),
            None => reject(BoundsViolation::Empty("front")),
        }
    }

    #[inline]
    pub fn front_mut(&mut self) -> Result<&mut T> {
        match self.elements.first_mut() {
            Some(element) => Ok(element),
            None => reject(BoundsViolation::Empty("front_mut")),
        }
    }

    /// # Errors
    ///
    /// [`BoundsViolation::Empty`] on an empty view.
    #[inline]
    pub fn back(&self) -> Result<&T> {
        match self.elements.last() {
            Some(element) => Ok(element),
            None => reject(BoundsViolation::Empty("back")),
        }
    }

    #[inline]
    pub fn back_mut(&mut self) -> Result<&mut T> {
        match self.elements.last_mut() {
            Some(element) => Ok(element),
            None => reject(BoundsViolation::Empty("back_mut")),
        }
    }

    #[inline(always)]
    fn base(&self) -> NonNull<T> {
        NonNull::from(&self.elements).cast()
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.base(), self.len())
    }

    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let base = NonNull::from(&mut self.elements).cast();
        IterMut::new(base, self.len())
    }

    /// A checked cursor at the first element.
    #[inline]
    pub fn begin(&self) -> CheckedIterator<'_, T, Const> {
        self.iter().front()
    }

    /// A checked cursor at the one-past-the-end position.
    #[inline]
    pub fn end(&self) -> CheckedIterator<'_, T, Const> {
        self.iter().back()
    }

    #[inline]
    pub fn begin_mut(&mut self) -> CheckedIterator<'_, T, Mut> {
        let len = self.len();
        CheckedIterator::new(NonNull::from(&mut self.elements).cast(), 0, len)
    }

    #[inline]
    pub fn end_mut(&mut self) -> CheckedIterator<'_, T, Mut> {
        let len = self.len();
        CheckedIterator::new(NonNull::from(&mut self.elements).cast(), len, len)
    }

    /// Lexicographic comparison for element types that only offer a
    /// less-than: elements neither less nor greater are equivalent, and a
    /// shorter view sorts first when it is a prefix of the longer one.
    pub fn weak_cmp_by<F>(&self, other: &Self, mut less: F) -> Ordering
    where
        F: FnMut(&T, &T) -> bool,
    {
        for (a, b) in self.elements.iter().zip(&other.elements) {
            if less(a, b) {
                return Ordering::Less;
            }
            if less(b, a) {
                return Ordering::Greater;
            }
        }
        self.len().cmp(&other.len())
    }
}

impl<T> Index<usize> for SliceView<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        self.try_index(index).unwrap_or_else(|err| raise(err))
    }
}

impl<T> IndexMut<usize> for SliceView<T> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.try_index_mut(index) {
            Ok(element) => element,
            Err(err) => raise(err),
        }
    }
}

impl<T> AsRef<[T]> for SliceView<T> {
    #[inline(always)]
    fn as_ref(&self) -> &[T] {
        &self.elements
    }
}

impl<T> AsMut<[T]> for SliceView<T> {
    #[inline(always)]
    fn as_mut(&mut self) -> &mut [T] {
        &mut self.elements
    }
}

impl<'a, T> IntoIterator for &'a SliceView<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut SliceView<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T: PartialEq<U>, U> PartialEq<SliceView<U>> for SliceView<T> {
    #[inline]
    fn eq(&self, other: &SliceView<U>) -> bool {
        self.elements == other.elements
    }
}

impl<T: Eq> Eq for SliceView<T> {}

// `[T]`'s comparisons already are lexicographic-then-length, and propagate
// `None` from unordered elements such as NaN.

impl<T: PartialOrd> PartialOrd for SliceView<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.elements.partial_cmp(&other.elements)
    }
}

impl<T: Ord> Ord for SliceView<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.elements.cmp(&other.elements)
    }
}

impl<T: Hash> Hash for SliceView<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements.hash(state)
    }
}

impl<T: fmt::Debug> fmt::Debug for SliceView<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        self.elements.fmt(formatter)
    }
}
