//! ABI layer for `fcntl64`.
//!
//! The optional third argument of `fcntl` is variadic. Stable Rust cannot
//! define a C-variadic function, so the entry point declares it as one fixed
//! `long` and reads whatever the caller left in that slot, integer or
//! pointer alike. That read is only well defined where variadic and named
//! arguments share slots (`VARIADIC_SLOT_IS_UNIFORM`); everywhere else it is
//! undefined behavior. `fcntl64_with` is the typed alternative for Rust
//! callers; `fcntl64_as_variadic` exposes the C caller's view for testing.

use std::ffi::{c_int, c_long};

use lfs64shim_core::fcntl::{FcntlArg, VARIADIC_SLOT_IS_UNIFORM};

// ---------------------------------------------------------------------------
// fcntl64
// ---------------------------------------------------------------------------

/// `fcntl64` — forward to `fcntl` with the optional argument read as a `long`.
///
/// # Safety
///
/// Same contract as `fcntl(2)` for `cmd`. When called from C through the
/// variadic prototype, the target must satisfy `VARIADIC_SLOT_IS_UNIFORM`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fcntl64(fd: c_int, cmd: c_int, arg: c_long) -> c_int {
    // Forwarded as a full `long` even for commands reading an `int`: the
    // callee truncates, matching what a C-variadic read through `long` does.
    // SAFETY: caller upholds the fcntl(2) contract for `cmd` and `arg`.
    unsafe { libc::fcntl(fd, cmd, arg) }
}

/// `fcntl64` as C callers declare it.
pub type VariadicFcntl = unsafe extern "C" fn(c_int, c_int, ...) -> c_int;

/// [`fcntl64`] viewed through its variadic C prototype, so Rust code can
/// call it the way a C program does: optional argument omitted, or passed
/// as a real `int` or pointer.
///
/// `None` on targets where that view would read the argument from the
/// wrong place.
#[must_use]
pub fn fcntl64_as_variadic() -> Option<VariadicFcntl> {
    if !VARIADIC_SLOT_IS_UNIFORM {
        return None;
    }
    let fixed: unsafe extern "C" fn(c_int, c_int, c_long) -> c_int = fcntl64;
    // SAFETY: on these targets a variadic call places its arguments exactly
    // where the fixed signature reads them.
    Some(unsafe {
        std::mem::transmute::<unsafe extern "C" fn(c_int, c_int, c_long) -> c_int, VariadicFcntl>(
            fixed,
        )
    })
}

/// Forward to `fcntl` passing `arg` with its real C type.
///
/// Not exported. Results match [`fcntl64`] wherever
/// [`variadic_slot_is_uniform`] holds.
///
/// # Safety
///
/// Same contract as `fcntl(2)`; `FcntlArg::Pointer` must be valid for the
/// structure `cmd` reads or writes.
pub unsafe fn fcntl64_with(fd: c_int, cmd: c_int, arg: FcntlArg) -> c_int {
    match arg {
        // SAFETY: caller upholds the fcntl(2) contract.
        FcntlArg::None => unsafe { libc::fcntl(fd, cmd) },
        // SAFETY: caller upholds the fcntl(2) contract.
        FcntlArg::Int(value) => unsafe { libc::fcntl(fd, cmd, value) },
        // SAFETY: caller guarantees the pointer is valid for `cmd`.
        FcntlArg::Pointer(ptr) => unsafe { libc::fcntl(fd, cmd, ptr) },
    }
}

/// Whether the exported [`fcntl64`] is sound for variadic C callers on the
/// target this crate was compiled for.
#[must_use]
pub const fn variadic_slot_is_uniform() -> bool {
    VARIADIC_SLOT_IS_UNIFORM
}
