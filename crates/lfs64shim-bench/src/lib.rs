//! Shared fixtures for the forwarding benchmarks.

use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::PathBuf;

/// A scratch file kept open for the duration of a benchmark group.
pub struct BenchFile {
    path: PathBuf,
    file: File,
}

impl BenchFile {
    pub fn create(label: &str) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!(
            "lfs64shim-bench-{label}-{}.tmp",
            std::process::id()
        ));
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self { path, file })
    }

    #[must_use]
    pub fn fd(&self) -> std::ffi::c_int {
        self.file.as_raw_fd()
    }
}

impl Drop for BenchFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
