//! Conformance harness for the lfs64 compatibility shim.
//!
//! Fixture sets describe calls against the shim's exported entry points.
//! The runner executes each case three ways where they apply (through the
//! exported symbol, through the typed Rust companion, and straight through
//! the host libc) on identical scratch descriptors and records whether the
//! outcomes agree.

pub mod fixtures;
pub mod report;
pub mod runner;
pub mod scratch;
pub mod verify;

pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
