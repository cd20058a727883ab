//! Error number definitions.
//!
//! Linux `<errno.h>` values for the codes `fcntl` and `posix_fallocate`
//! can report. The shim never stores errno itself; these exist so tooling
//! can name what the host libc reported.

pub const EPERM: i32 = 1;
pub const EINTR: i32 = 4;
pub const EIO: i32 = 5;
pub const EBADF: i32 = 9;
pub const EAGAIN: i32 = 11;
pub const EACCES: i32 = 13;
pub const EFAULT: i32 = 14;
pub const EBUSY: i32 = 16;
pub const ENODEV: i32 = 19;
pub const EISDIR: i32 = 21;
pub const EINVAL: i32 = 22;
pub const EMFILE: i32 = 24;
pub const ETXTBSY: i32 = 26;
pub const EFBIG: i32 = 27;
pub const ENOSPC: i32 = 28;
pub const ESPIPE: i32 = 29;
pub const EROFS: i32 = 30;
pub const EDEADLK: i32 = 35;
pub const ENOLCK: i32 = 37;
pub const ENOSYS: i32 = 38;
pub const EOVERFLOW: i32 = 75;
pub const EOPNOTSUPP: i32 = 95;

/// Symbolic name for `code`, or `None` when the code is outside the table.
#[must_use]
pub const fn name(code: i32) -> Option<&'static str> {
    Some(match code {
        0 => "OK",
        EPERM => "EPERM",
        EINTR => "EINTR",
        EIO => "EIO",
        EBADF => "EBADF",
        EAGAIN => "EAGAIN",
        EACCES => "EACCES",
        EFAULT => "EFAULT",
        EBUSY => "EBUSY",
        ENODEV => "ENODEV",
        EISDIR => "EISDIR",
        EINVAL => "EINVAL",
        EMFILE => "EMFILE",
        ETXTBSY => "ETXTBSY",
        EFBIG => "EFBIG",
        ENOSPC => "ENOSPC",
        ESPIPE => "ESPIPE",
        EROFS => "EROFS",
        EDEADLK => "EDEADLK",
        ENOLCK => "ENOLCK",
        ENOSYS => "ENOSYS",
        EOVERFLOW => "EOVERFLOW",
        EOPNOTSUPP => "EOPNOTSUPP",
        _ => return None,
    })
}

/// Render `code` for reports: the symbolic name when known, the number otherwise.
#[must_use]
pub fn describe(code: i32) -> String {
    match name(code) {
        Some(sym) => sym.to_string(),
        None => code.to_string(),
    }
}
