//! `fcntl` command vocabulary.
//!
//! Every Linux `fcntl` command takes zero or one extra argument whose C type
//! is selected by the command code. [`arg_kind`] records that selection and
//! [`FcntlArg`] carries a correctly typed argument. [`FcntlArg::slot`] and
//! [`FcntlArg::from_slot`] model what happens when the argument is read
//! through one pointer-sized slot instead, which is how the exported
//! `fcntl64` entry point receives it.

use std::ffi::{c_int, c_void};

pub const F_DUPFD: c_int = 0;
pub const F_GETFD: c_int = 1;
pub const F_SETFD: c_int = 2;
pub const F_GETFL: c_int = 3;
pub const F_SETFL: c_int = 4;
pub const F_GETLK: c_int = 5;
pub const F_SETLK: c_int = 6;
pub const F_SETLKW: c_int = 7;
pub const F_SETOWN: c_int = 8;
pub const F_GETOWN: c_int = 9;
pub const F_SETSIG: c_int = 10;
pub const F_GETSIG: c_int = 11;
pub const F_SETOWN_EX: c_int = 15;
pub const F_GETOWN_EX: c_int = 16;
pub const F_GETOWNER_UIDS: c_int = 17;
pub const F_OFD_GETLK: c_int = 36;
pub const F_OFD_SETLK: c_int = 37;
pub const F_OFD_SETLKW: c_int = 38;
pub const F_SETLEASE: c_int = 1024;
pub const F_GETLEASE: c_int = 1025;
pub const F_NOTIFY: c_int = 1026;
pub const F_DUPFD_CLOEXEC: c_int = 1030;
pub const F_SETPIPE_SZ: c_int = 1031;
pub const F_GETPIPE_SZ: c_int = 1032;
pub const F_ADD_SEALS: c_int = 1033;
pub const F_GET_SEALS: c_int = 1034;
pub const F_GET_RW_HINT: c_int = 1035;
pub const F_SET_RW_HINT: c_int = 1036;
pub const F_GET_FILE_RW_HINT: c_int = 1037;
pub const F_SET_FILE_RW_HINT: c_int = 1038;

// On LP64 the kernel has a single 64-bit flock layout and the `64` lock
// commands alias the plain ones. 32-bit layouts keep distinct codes.
#[cfg(target_pointer_width = "64")]
pub const F_GETLK64: c_int = F_GETLK;
#[cfg(target_pointer_width = "64")]
pub const F_SETLK64: c_int = F_SETLK;
#[cfg(target_pointer_width = "64")]
pub const F_SETLKW64: c_int = F_SETLKW;
#[cfg(not(target_pointer_width = "64"))]
pub const F_GETLK64: c_int = 12;
#[cfg(not(target_pointer_width = "64"))]
pub const F_SETLK64: c_int = 13;
#[cfg(not(target_pointer_width = "64"))]
pub const F_SETLKW64: c_int = 14;

pub const FD_CLOEXEC: c_int = 1;

pub const F_RDLCK: c_int = 0;
pub const F_WRLCK: c_int = 1;
pub const F_UNLCK: c_int = 2;

/// True when an `int` or pointer passed variadically lands in the same slot
/// a fixed `long` parameter is read from.
///
/// This is the calling-convention assumption behind the exported `fcntl64`:
/// SysV x86_64, cdecl x86, AAPCS64 (outside Apple, which spills variadics to
/// the stack), and the LP64 RISC-V, LoongArch, POWER and s390x conventions
/// all pass variadic integers and pointers exactly like named ones.
pub const VARIADIC_SLOT_IS_UNIFORM: bool = cfg!(any(
    all(target_arch = "x86_64", not(windows)),
    target_arch = "x86",
    all(target_arch = "aarch64", not(target_vendor = "apple")),
    target_arch = "riscv64",
    target_arch = "loongarch64",
    target_arch = "powerpc64",
    target_arch = "s390x",
));

/// Type of the optional argument a command reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FcntlArgKind {
    /// No third argument.
    None,
    /// A plain `int`.
    Int,
    /// A pointer to a command-specific structure.
    Pointer,
}

impl FcntlArgKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Int => "int",
            Self::Pointer => "pointer",
        }
    }
}

const COMMANDS: &[(c_int, &str, FcntlArgKind)] = &[
    (F_DUPFD, "F_DUPFD", FcntlArgKind::Int),
    (F_GETFD, "F_GETFD", FcntlArgKind::None),
    (F_SETFD, "F_SETFD", FcntlArgKind::Int),
    (F_GETFL, "F_GETFL", FcntlArgKind::None),
    (F_SETFL, "F_SETFL", FcntlArgKind::Int),
    (F_GETLK, "F_GETLK", FcntlArgKind::Pointer),
    (F_SETLK, "F_SETLK", FcntlArgKind::Pointer),
    (F_SETLKW, "F_SETLKW", FcntlArgKind::Pointer),
    (F_SETOWN, "F_SETOWN", FcntlArgKind::Int),
    (F_GETOWN, "F_GETOWN", FcntlArgKind::None),
    (F_SETSIG, "F_SETSIG", FcntlArgKind::Int),
    (F_GETSIG, "F_GETSIG", FcntlArgKind::None),
    (F_SETOWN_EX, "F_SETOWN_EX", FcntlArgKind::Pointer),
    (F_GETOWN_EX, "F_GETOWN_EX", FcntlArgKind::Pointer),
    (F_GETOWNER_UIDS, "F_GETOWNER_UIDS", FcntlArgKind::Pointer),
    (F_OFD_GETLK, "F_OFD_GETLK", FcntlArgKind::Pointer),
    (F_OFD_SETLK, "F_OFD_SETLK", FcntlArgKind::Pointer),
    (F_OFD_SETLKW, "F_OFD_SETLKW", FcntlArgKind::Pointer),
    (F_SETLEASE, "F_SETLEASE", FcntlArgKind::Int),
    (F_GETLEASE, "F_GETLEASE", FcntlArgKind::None),
    (F_NOTIFY, "F_NOTIFY", FcntlArgKind::Int),
    (F_DUPFD_CLOEXEC, "F_DUPFD_CLOEXEC", FcntlArgKind::Int),
    (F_SETPIPE_SZ, "F_SETPIPE_SZ", FcntlArgKind::Int),
    (F_GETPIPE_SZ, "F_GETPIPE_SZ", FcntlArgKind::None),
    (F_ADD_SEALS, "F_ADD_SEALS", FcntlArgKind::Int),
    (F_GET_SEALS, "F_GET_SEALS", FcntlArgKind::None),
    (F_GET_RW_HINT, "F_GET_RW_HINT", FcntlArgKind::Pointer),
    (F_SET_RW_HINT, "F_SET_RW_HINT", FcntlArgKind::Pointer),
    (F_GET_FILE_RW_HINT, "F_GET_FILE_RW_HINT", FcntlArgKind::Pointer),
    (F_SET_FILE_RW_HINT, "F_SET_FILE_RW_HINT", FcntlArgKind::Pointer),
];

// Looked up after COMMANDS, so on LP64 the plain names win for shared codes.
const LFS64_COMMANDS: &[(c_int, &str)] = &[
    (F_GETLK64, "F_GETLK64"),
    (F_SETLK64, "F_SETLK64"),
    (F_SETLKW64, "F_SETLKW64"),
];

/// Argument kind `cmd` expects, or `None` for a code outside the table.
#[must_use]
pub fn arg_kind(cmd: c_int) -> Option<FcntlArgKind> {
    if let Some((_, _, kind)) = COMMANDS.iter().find(|(code, _, _)| *code == cmd) {
        return Some(*kind);
    }
    LFS64_COMMANDS
        .iter()
        .any(|(code, _)| *code == cmd)
        .then_some(FcntlArgKind::Pointer)
}

/// Symbolic name of `cmd`.
#[must_use]
pub fn command_name(cmd: c_int) -> Option<&'static str> {
    COMMANDS
        .iter()
        .map(|(code, name, _)| (*code, *name))
        .chain(LFS64_COMMANDS.iter().copied())
        .find(|(code, _)| *code == cmd)
        .map(|(_, name)| name)
}

/// Command code for a symbolic name such as `"F_GETFL"`.
#[must_use]
pub fn command_by_name(name: &str) -> Option<c_int> {
    COMMANDS
        .iter()
        .map(|(code, name, _)| (*code, *name))
        .chain(LFS64_COMMANDS.iter().copied())
        .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
        .map(|(code, _)| code)
}

/// Lock type code for a symbolic name (`F_RDLCK`, `F_WRLCK`, `F_UNLCK`).
#[must_use]
pub fn lock_type_by_name(name: &str) -> Option<c_int> {
    match name.to_ascii_uppercase().as_str() {
        "F_RDLCK" => Some(F_RDLCK),
        "F_WRLCK" => Some(F_WRLCK),
        "F_UNLCK" => Some(F_UNLCK),
        _ => None,
    }
}

/// Symbolic name of a lock type code.
#[must_use]
pub fn lock_type_name(code: c_int) -> Option<&'static str> {
    match code {
        F_RDLCK => Some("F_RDLCK"),
        F_WRLCK => Some("F_WRLCK"),
        F_UNLCK => Some("F_UNLCK"),
        _ => None,
    }
}

/// Optional `fcntl` argument carried with its real C type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FcntlArg {
    None,
    Int(c_int),
    Pointer(*mut c_void),
}

impl FcntlArg {
    #[must_use]
    pub const fn kind(self) -> FcntlArgKind {
        match self {
            Self::None => FcntlArgKind::None,
            Self::Int(_) => FcntlArgKind::Int,
            Self::Pointer(_) => FcntlArgKind::Pointer,
        }
    }

    /// Pointer-sized value a generic read of the variadic slot observes.
    ///
    /// `Int` is sign-extended the way C widens an `int` to `long`; the upper
    /// half of a real register slot is unspecified, which is harmless only
    /// because [`FcntlArg::from_slot`] truncates it away again.
    #[must_use]
    pub fn slot(self) -> usize {
        match self {
            Self::None => 0,
            Self::Int(value) => value as isize as usize,
            Self::Pointer(ptr) => ptr as usize,
        }
    }

    /// Reinterpret a raw slot as the argument `kind` expects.
    #[must_use]
    pub fn from_slot(kind: FcntlArgKind, slot: usize) -> Self {
        match kind {
            FcntlArgKind::None => Self::None,
            FcntlArgKind::Int => Self::Int(slot as c_int),
            FcntlArgKind::Pointer => Self::Pointer(slot as *mut c_void),
        }
    }

    /// Reinterpret a raw slot for `cmd`. Unknown commands keep the full
    /// slot as a pointer, the widest representation available.
    #[must_use]
    pub fn for_command(cmd: c_int, slot: usize) -> Self {
        Self::from_slot(arg_kind(cmd).unwrap_or(FcntlArgKind::Pointer), slot)
    }

    /// Whether this argument has the type `cmd` expects. Unknown commands
    /// accept anything.
    #[must_use]
    pub fn fits(self, cmd: c_int) -> bool {
        arg_kind(cmd).is_none_or(|kind| kind == self.kind())
    }
}
