//! Checked byte-array access for C callers.
//!
//! Every function validates its arguments with the same checks as the Rust
//! API and reports the outcome as a [`CrustStatus`]. Output parameters are
//! only written on [`CrustStatus::Ok`].

use std::cmp::Ordering;
use std::ffi::c_void;

use crate::array::ArrayPointer;
use crate::error::{PointerError, Result};
use crate::mutability::{Const, Mut};
use crate::pointer::Pointer;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrustStatus {
    Ok = 0,
    NullPointer = 1,
    TypeMismatch = 2,
    BoundsError = 3,
    OutOfRange = 4,
    BadAccess = 5,
}

impl From<&PointerError> for CrustStatus {
    fn from(err: &PointerError) -> Self {
        match err {
            PointerError::NullPointer(_) => CrustStatus::NullPointer,
            PointerError::TypeMismatch { .. } => CrustStatus::TypeMismatch,
            PointerError::Bounds(_) => CrustStatus::BoundsError,
            PointerError::OutOfRange { .. } => CrustStatus::OutOfRange,
            PointerError::BadAccess => CrustStatus::BadAccess,
        }
    }
}

fn status(f: impl FnOnce() -> Result<()>) -> CrustStatus {
    match f() {
        Ok(()) => CrustStatus::Ok,
        Err(err) => CrustStatus::from(&err),
    }
}

unsafe fn write_out<T>(out: *mut T, value: T) -> Result<()> {
    let out = unsafe { Pointer::<T, Mut>::from_raw_address(out)? };
    unsafe { *out.as_mut() = value };
    Ok(())
}

unsafe fn bytes<'a>(data: *const u8, len: usize) -> Result<ArrayPointer<'a, u8, Const>> {
    unsafe { ArrayPointer::from_address_with_size(data, len) }
}

/// Returns `NullPointer` if `addr` is null, `Ok` otherwise.
#[no_mangle]
pub extern "C" fn crust_ptr_check_address(addr: *const c_void) -> CrustStatus {
    status(|| unsafe { Pointer::<c_void, Const>::from_raw_address(addr) }.map(|_| ()))
}

/// Reads `data[index]` into `*out`.
///
/// # Safety
///
/// A non-null `data` must point to `len` readable bytes and a non-null `out`
/// must be writable.
#[no_mangle]
pub unsafe extern "C" fn crust_ptr_byte_at(
    data: *const u8,
    len: usize,
    index: usize,
    out: *mut u8,
) -> CrustStatus {
    status(|| unsafe {
        let byte = *bytes(data, len)?.at(index)?;
        write_out(out, byte)
    })
}

/// Writes `value` to `data[index]`.
///
/// # Safety
///
/// A non-null `data` must point to `len` writable bytes not aliased for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn crust_ptr_byte_set(
    data: *mut u8,
    len: usize,
    index: usize,
    value: u8,
) -> CrustStatus {
    status(|| unsafe {
        let array = ArrayPointer::<u8, Mut>::from_address_with_size(data, len)?;
        *array.as_mut().at_mut(index)? = value;
        Ok(())
    })
}

/// Stores in `*out` whether both byte arrays have the same length and
/// contents.
///
/// # Safety
///
/// As for [`crust_ptr_byte_at`], for both arrays.
#[no_mangle]
pub unsafe extern "C" fn crust_ptr_bytes_equal(
    a: *const u8,
    a_len: usize,
    b: *const u8,
    b_len: usize,
    out: *mut bool,
) -> CrustStatus {
    status(|| unsafe {
        let equal = *bytes(a, a_len)? == *bytes(b, b_len)?;
        write_out(out, equal)
    })
}

/// Stores in `*out` the lexicographic comparison of both byte arrays:
/// negative, zero or positive.
///
/// # Safety
///
/// As for [`crust_ptr_byte_at`], for both arrays.
#[no_mangle]
pub unsafe extern "C" fn crust_ptr_bytes_compare(
    a: *const u8,
    a_len: usize,
    b: *const u8,
    b_len: usize,
    out: *mut i32,
) -> CrustStatus {
    status(|| unsafe {
        let ordering = match (*bytes(a, a_len)?).cmp(&*bytes(b, b_len)?) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        };
        write_out(out, ordering)
    })
}
