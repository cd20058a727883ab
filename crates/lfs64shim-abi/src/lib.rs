//! C ABI entry points for the lfs64 compatibility shim.
//!
//! Exports `fcntl64` and `posix_fallocate64` for C libraries whose `off_t`
//! is always 64-bit and which therefore never grew the `64`-suffixed names
//! that glibc-built binaries import. Each entry point forwards to the host
//! libc's unsuffixed function and returns its result untouched.
//!
//! Both symbols are emitted unmangled in every build profile. Neither one
//! is called from inside the crate: the forwarders reach the host through
//! the unsuffixed names, so linking them into a process that also has the
//! host's `*64` definitions never recurses.

pub mod fallocate_abi;
pub mod fcntl_abi;
pub mod symbols;
