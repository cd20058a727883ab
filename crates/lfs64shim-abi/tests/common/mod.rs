//! Scratch files shared by the ABI integration tests.

#![allow(dead_code)]

use std::ffi::c_int;
use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static SCRATCH_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Empty regular file, open read-write, removed on drop.
pub struct Scratch {
    path: PathBuf,
    file: File,
}

impl Scratch {
    pub fn new(prefix: &str) -> Self {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "lfs64shim-{prefix}-{}-{seq}.tmp",
            std::process::id()
        ));
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .expect("create scratch file");
        Self { path, file }
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn fd(&self) -> c_int {
        self.file.as_raw_fd()
    }

    pub fn size(&self) -> u64 {
        self.file.metadata().expect("stat scratch file").len()
    }

    /// Independent open file description, read-only.
    pub fn open_read_only(&self) -> File {
        File::open(&self.path).expect("open scratch read-only")
    }

    /// Independent open file description, read-write.
    pub fn open_read_write(&self) -> File {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .expect("open scratch read-write")
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Both ends of a fresh pipe, closed on drop.
pub struct Pipe {
    pub read: c_int,
    pub write: c_int,
}

impl Pipe {
    pub fn new() -> Self {
        let mut fds = [0 as c_int; 2];
        // SAFETY: fds has room for both ends.
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        Self {
            read: fds[0],
            write: fds[1],
        }
    }
}

impl Drop for Pipe {
    fn drop(&mut self) {
        // SAFETY: closing descriptors this value owns.
        unsafe {
            libc::close(self.read);
            libc::close(self.write);
        }
    }
}
