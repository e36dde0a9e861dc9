//! Generic access to the pointer kinds of this crate.

use crate::any::AnyPointer;
use crate::mutability::{Const, Mutability};
use crate::pointer::Pointer;

/// Properties shared by the single-object pointers of this crate, for code
/// that is generic over which of them it receives.
pub trait PointerTraits: Copy {
    /// The pointee type. `()` for erased pointers.
    type Element: ?Sized;

    /// The constness of the pointer.
    type Mutability: Mutability;

    /// The same kind of pointer, with the same constness and lifetime,
    /// pointing to a `U`.
    type Rebind<U: 'static>: PointerTraits<Element = U, Mutability = Self::Mutability>;

    /// The raw address: `*const Element` or `*mut Element`.
    fn to_address(self) -> <Self::Mutability as Mutability>::Raw<Self::Element>;
}

/// Pointer kinds that can be made from a shared reference to their element.
pub trait PointerTo<'a>: PointerTraits<Mutability = Const> {
    fn pointer_to(r: &'a Self::Element) -> Self;
}

impl<'a, T: ?Sized, M: Mutability> PointerTraits for Pointer<'a, T, M> {
    type Element = T;
    type Mutability = M;
    type Rebind<U: 'static> = Pointer<'a, U, M>;

    #[inline(always)]
    fn to_address(self) -> M::Raw<T> {
        Pointer::to_address(self)
    }
}

impl<'a, T: ?Sized> PointerTo<'a> for Pointer<'a, T, Const> {
    #[inline(always)]
    fn pointer_to(r: &'a T) -> Self {
        Pointer::from_ref(r)
    }
}

impl<'a, M: Mutability> PointerTraits for AnyPointer<'a, M> {
    type Element = ();
    type Mutability = M;
    type Rebind<U: 'static> = Pointer<'a, U, M>;

    #[inline(always)]
    fn to_address(self) -> M::Raw<()> {
        AnyPointer::to_address(self)
    }
}

/// The raw address held by any pointer of this crate.
///
/// ```
/// use crust_ptr::{pointer_to, to_address};
///
/// let x = 3;
/// assert_eq!(to_address(pointer_to(&x)), &x as *const i32);
/// ```
#[inline(always)]
pub fn to_address<P: PointerTraits>(p: P) -> <P::Mutability as Mutability>::Raw<P::Element> {
    p.to_address()
}
