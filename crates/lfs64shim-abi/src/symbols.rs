//! Table of the symbols this crate exports.

/// How the optional arguments of an exported symbol reach the host call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgConvention {
    /// Every argument is named and forwarded unchanged.
    Fixed,
    /// A trailing variadic argument is read through one pointer-sized slot.
    VariadicSlot,
}

impl ArgConvention {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::VariadicSlot => "variadic-slot",
        }
    }
}

/// One exported alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShimSymbol {
    /// Exported name.
    pub name: &'static str,
    /// Host libc symbol the call is forwarded to.
    pub forwards_to: &'static str,
    /// C prototype as seen by callers.
    pub prototype: &'static str,
    pub convention: ArgConvention,
}

pub const SHIM_SYMBOLS: &[ShimSymbol] = &[
    ShimSymbol {
        name: "fcntl64",
        forwards_to: "fcntl",
        prototype: "int fcntl64(int fd, int cmd, ...)",
        convention: ArgConvention::VariadicSlot,
    },
    ShimSymbol {
        name: "posix_fallocate64",
        forwards_to: "posix_fallocate",
        prototype: "int posix_fallocate64(int fd, off64_t offset, off64_t len)",
        convention: ArgConvention::Fixed,
    },
];

/// Look up an exported symbol by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static ShimSymbol> {
    SHIM_SYMBOLS.iter().find(|sym| sym.name == name)
}
