//! Byte-range arithmetic for `posix_fallocate`.
//!
//! The shim forwards ranges untouched; these helpers only describe what a
//! successful allocation implies so verification code can check it.

/// Minimum file size a successful `posix_fallocate(offset, len)` leaves behind.
///
/// Returns `None` for ranges the primitive must reject (negative offset,
/// non-positive length) and for ranges whose end overflows `i64`.
#[must_use]
pub fn required_len(offset: i64, len: i64) -> Option<i64> {
    if offset < 0 || len <= 0 {
        return None;
    }
    offset.checked_add(len)
}
