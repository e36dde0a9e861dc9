//! Bounds-checked iteration over a [`SliceView`](crate::SliceView).
//!
//! [`CheckedIterator`] is a random-access cursor: a base address, an index
//! and a length with `0 <= index <= len` at all times. Every step is
//! validated before the index moves, and a rejected step leaves the cursor
//! untouched. [`Iter`] and [`IterMut`] drive a begin/end pair of cursors to
//! plug into Rust's iterator protocol.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::ptr::NonNull;

use crate::error::{raise, reject, BoundsViolation, Result};
use crate::mutability::{Const, Mut, Mutability};

/// A random-access cursor into a run of `len` elements.
///
/// The position `len` is the one-past-the-end position: reachable, never
/// dereferenceable.
///
/// Cursors over different bases have no meaningful order: `partial_cmp`
/// returns `None` for them and `==` is `false`.
pub struct CheckedIterator<'a, T, M: Mutability = Const> {
    base: NonNull<T>,
    index: usize,
    len: usize,
    _marker: PhantomData<(&'a [T], M)>,
}

impl<'a, T, M: Mutability> CheckedIterator<'a, T, M> {
    #[inline(always)]
    pub(crate) fn new(base: NonNull<T>, index: usize, len: usize) -> Self {
        debug_assert!(index <= len);
        CheckedIterator {
            base,
            index,
            len,
            _marker: PhantomData,
        }
    }

    /// Builds a cursor from its parts.
    ///
    /// # Errors
    ///
    /// [`BoundsViolation::Index`] if `index > len`.
    ///
    /// # Safety
    ///
    /// `base` must point to `len` live, initialized elements valid for `'a`.
    pub unsafe fn from_raw_parts(base: NonNull<T>, index: usize, len: usize) -> Result<Self> {
        if index > len {
            return reject(BoundsViolation::Index { index, len });
        }
        Ok(Self::new(base, index, len))
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub const fn is_end(&self) -> bool {
        self.index == self.len
    }

    /// The address of the current position; at the end this is the
    /// one-past-the-end address.
    #[inline]
    pub fn to_address(&self) -> M::Raw<T> {
        M::non_null_to_raw(self.current())
    }

    #[inline(always)]
    fn current(&self) -> NonNull<T> {
        // SAFETY: `index <= len`, so this stays within (or one past) the run.
        unsafe { self.base.add(self.index) }
    }

    /// `++it`.
    pub fn increment(&mut self) -> Result<()> {
        if self.index >= self.len {
            return reject(BoundsViolation::Increment { len: self.len });
        }
        self.index += 1;
        Ok(())
    }

    /// `--it`.
    pub fn decrement(&mut self) -> Result<()> {
        if self.index == 0 {
            return reject(BoundsViolation::Decrement);
        }
        self.index -= 1;
        Ok(())
    }

    fn checked_position(&self, offset: isize) -> Result<usize> {
        let overflow = BoundsViolation::Overflow {
            index: self.index,
            offset,
        };
        let Ok(index) = isize::try_from(self.index) else {
            return reject(overflow);
        };
        let Some(target) = index.checked_add(offset) else {
            return reject(overflow);
        };
        match usize::try_from(target) {
            Ok(target) if target <= self.len => Ok(target),
            _ => reject(BoundsViolation::Offset {
                index: self.index,
                offset,
                len: self.len,
            }),
        }
    }

    /// `it + offset`.
    pub fn offset(&self, offset: isize) -> Result<Self> {
        let index = self.checked_position(offset)?;
        Ok(Self::new(self.base, index, self.len))
    }

    /// `it - offset`.
    pub fn offset_back(&self, offset: isize) -> Result<Self> {
        match offset.checked_neg() {
            Some(neg) => self.offset(neg),
            None => reject(BoundsViolation::Overflow {
                index: self.index,
                offset,
            }),
        }
    }

    /// `it += offset`.
    pub fn advance(&mut self, offset: isize) -> Result<()> {
        self.index = self.checked_position(offset)?;
        Ok(())
    }

    /// `it -= offset`.
    pub fn retreat(&mut self, offset: isize) -> Result<()> {
        *self = self.offset_back(offset)?;
        Ok(())
    }

    /// `*it`.
    pub fn get(&self) -> Result<&'a T> {
        if self.index >= self.len {
            return reject(BoundsViolation::Dereference {
                index: self.index,
                len: self.len,
            });
        }
        // SAFETY: `index < len` and the run is live for `'a`.
        Ok(unsafe { self.current().as_ref() })
    }

    /// `it[offset]`.
    pub fn get_at(&self, offset: isize) -> Result<&'a T> {
        self.offset(offset)?.get()
    }

    /// `other - self`, in elements.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> isize {
        other.index as isize - self.index as isize
    }

    #[inline(always)]
    fn same_base(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl<'a, T> CheckedIterator<'a, T, Mut> {
    /// `*it`, writable.
    ///
    /// # Errors
    ///
    /// As for [`get`](Self::get).
    ///
    /// # Safety
    ///
    /// No other reference to the element may be alive while the returned one
    /// is used.
    pub unsafe fn get_mut(&self) -> Result<&'a mut T> {
        if self.index >= self.len {
            return reject(BoundsViolation::Dereference {
                index: self.index,
                len: self.len,
            });
        }
        Ok(unsafe { self.current().as_mut() })
    }

    #[inline]
    pub fn into_const(self) -> CheckedIterator<'a, T, Const> {
        CheckedIterator::new(self.base, self.index, self.len)
    }
}

impl<'a, T> From<CheckedIterator<'a, T, Mut>> for CheckedIterator<'a, T, Const> {
    #[inline]
    fn from(it: CheckedIterator<'a, T, Mut>) -> Self {
        it.into_const()
    }
}

impl<T, M: Mutability> Clone for CheckedIterator<'_, T, M> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, M: Mutability> Copy for CheckedIterator<'_, T, M> {}

impl<T, M: Mutability> PartialEq for CheckedIterator<'_, T, M> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.same_base(other) && self.index == other.index
    }
}

impl<T, M: Mutability> PartialOrd for CheckedIterator<'_, T, M> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.same_base(other) {
            Some(self.index.cmp(&other.index))
        } else {
            None
        }
    }
}

impl<T, M: Mutability> Add<isize> for CheckedIterator<'_, T, M> {
    type Output = Self;

    #[track_caller]
    fn add(self, offset: isize) -> Self {
        self.offset(offset).unwrap_or_else(|err| raise(err))
    }
}

impl<T, M: Mutability> Sub<isize> for CheckedIterator<'_, T, M> {
    type Output = Self;

    #[track_caller]
    fn sub(self, offset: isize) -> Self {
        self.offset_back(offset).unwrap_or_else(|err| raise(err))
    }
}

impl<T, M: Mutability> Sub for CheckedIterator<'_, T, M> {
    type Output = isize;

    #[inline]
    fn sub(self, other: Self) -> isize {
        other.distance_to(&self)
    }
}

impl<T, M: Mutability> AddAssign<isize> for CheckedIterator<'_, T, M> {
    #[track_caller]
    fn add_assign(&mut self, offset: isize) {
        if let Err(err) = self.advance(offset) {
            raise(err)
        }
    }
}

impl<T, M: Mutability> SubAssign<isize> for CheckedIterator<'_, T, M> {
    #[track_caller]
    fn sub_assign(&mut self, offset: isize) {
        if let Err(err) = self.retreat(offset) {
            raise(err)
        }
    }
}

impl<T, M: Mutability> fmt::Debug for CheckedIterator<'_, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckedIterator")
            .field("base", &self.base)
            .field("index", &self.index)
            .field("len", &self.len)
            .finish()
    }
}

// Both adapters walk `front` towards `back`. Once `front != back` neither
// cursor step can fail, so the `?`s below never fire.

macro_rules! checked_range_iter {
    ($name:ident, $m:ty, $item:ty, $get:ident) => {
        impl<'a, T> $name<'a, T> {
            #[inline]
            pub(crate) fn new(base: NonNull<T>, len: usize) -> Self {
                $name {
                    front: CheckedIterator::new(base, 0, len),
                    back: CheckedIterator::new(base, len, len),
                }
            }
        }

        impl<'a, T> Iterator for $name<'a, T> {
            type Item = $item;

            fn next(&mut self) -> Option<$item> {
                if self.front == self.back {
                    return None;
                }
                #[allow(unused_unsafe)]
                let item = unsafe { self.front.$get() }.ok()?;
                self.front.increment().ok()?;
                Some(item)
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                let len = self.front.distance_to(&self.back) as usize;
                (len, Some(len))
            }
        }

        impl<'a, T> DoubleEndedIterator for $name<'a, T> {
            fn next_back(&mut self) -> Option<$item> {
                if self.front == self.back {
                    return None;
                }
                self.back.decrement().ok()?;
                #[allow(unused_unsafe)]
                let item = unsafe { self.back.$get() }.ok()?;
                Some(item)
            }
        }

        impl<T> ExactSizeIterator for $name<'_, T> {}

        impl<T> FusedIterator for $name<'_, T> {}
    };
}

/// Shared iteration over a [`SliceView`](crate::SliceView).
pub struct Iter<'a, T> {
    front: CheckedIterator<'a, T, Const>,
    back: CheckedIterator<'a, T, Const>,
}

/// Unique iteration over a [`SliceView`](crate::SliceView).
///
/// Each element is handed out at most once, so the `&mut T` never alias.
pub struct IterMut<'a, T> {
    front: CheckedIterator<'a, T, Mut>,
    back: CheckedIterator<'a, T, Mut>,
}

checked_range_iter!(Iter, Const, &'a T, get);

// `IterMut` keeps its cursors private: a copied cursor would alias the
// `&mut` items already handed out.
impl<'a, T> Iter<'a, T> {
    /// The cursor of the next element from the front.
    #[inline]
    pub fn front(&self) -> CheckedIterator<'a, T, Const> {
        self.front
    }

    /// The cursor one past the next element from the back.
    #[inline]
    pub fn back(&self) -> CheckedIterator<'a, T, Const> {
        self.back
    }
}
checked_range_iter!(IterMut, Mut, &'a mut T, get_mut);

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            front: self.front,
            back: self.back,
        }
    }
}

// SAFETY: `Iter` behaves like `&[T]`, `IterMut` like `&mut [T]`.
unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}
unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
