//! ABI layer for `posix_fallocate64`.

use std::ffi::c_int;

// The shim only makes sense over a libc whose `off_t` is already 64-bit;
// a narrower `off_t` would truncate offsets on the way through.
const _: () = assert!(std::mem::size_of::<libc::off_t>() == std::mem::size_of::<i64>());

// ---------------------------------------------------------------------------
// posix_fallocate64
// ---------------------------------------------------------------------------

/// `posix_fallocate64` — forward to `posix_fallocate`.
///
/// Returns 0 or a positive error code exactly as `posix_fallocate` does;
/// `errno` is left alone.
///
/// # Safety
///
/// Same contract as `posix_fallocate(3)`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn posix_fallocate64(fd: c_int, offset: i64, len: i64) -> c_int {
    // SAFETY: caller upholds the posix_fallocate(3) contract.
    unsafe { libc::posix_fallocate(fd, offset as libc::off_t, len as libc::off_t) }
}
