//! Core vocabulary for the lfs64 compatibility shim.
//!
//! Holds the fcntl command table, the tagged-union form of the optional
//! fcntl argument, errno names and fallocate range arithmetic. Nothing here
//! calls into libc; the ABI crate owns every foreign call.

#![deny(unsafe_code)]

pub mod errno;
pub mod fallocate;
pub mod fcntl;
