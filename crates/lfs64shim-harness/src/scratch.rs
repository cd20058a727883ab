//! Scratch descriptors for case execution.

use std::ffi::c_int;
use std::fs::{File, OpenOptions};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// What kind of descriptor a case runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenKind {
    ReadOnly,
    WriteOnly,
    #[default]
    ReadWrite,
    /// Write end of a fresh pipe.
    Pipe,
    /// The descriptor `-1`.
    BadFd,
}

/// A freshly created descriptor. Scratch files are removed on drop.
#[derive(Debug)]
pub enum Subject {
    File { path: PathBuf, file: File },
    Pipe { read: OwnedFd, write: OwnedFd },
    Closed,
}

impl Subject {
    pub fn open(kind: OpenKind) -> std::io::Result<Self> {
        match kind {
            OpenKind::ReadOnly => Self::scratch_file(|opts| opts.read(true)),
            OpenKind::WriteOnly => Self::scratch_file(|opts| opts.write(true)),
            OpenKind::ReadWrite => Self::scratch_file(|opts| opts.read(true).write(true)),
            OpenKind::Pipe => Self::pipe(),
            OpenKind::BadFd => Ok(Self::Closed),
        }
    }

    fn scratch_file(
        configure: impl FnOnce(&mut OpenOptions) -> &mut OpenOptions,
    ) -> std::io::Result<Self> {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "lfs64shim-harness-{}-{seq}.tmp",
            std::process::id()
        ));
        File::create(&path)?;
        let mut opts = OpenOptions::new();
        let file = match configure(&mut opts).open(&path) {
            Ok(file) => file,
            Err(err) => {
                let _ = std::fs::remove_file(&path);
                return Err(err);
            }
        };
        Ok(Self::File { path, file })
    }

    fn pipe() -> std::io::Result<Self> {
        let mut fds = [0 as c_int; 2];
        // SAFETY: fds has room for both pipe ends.
        if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) } != 0 {
            return Err(std::io::Error::last_os_error());
        }
        // SAFETY: pipe2 succeeded, so both descriptors are open and unowned.
        let (read, write) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
        Ok(Self::Pipe { read, write })
    }

    /// Raw descriptor to pass to the call under test.
    #[must_use]
    pub fn fd(&self) -> c_int {
        match self {
            Self::File { file, .. } => file.as_raw_fd(),
            Self::Pipe { write, .. } => write.as_raw_fd(),
            Self::Closed => -1,
        }
    }

    /// Whether the descriptor refers to anything open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Current size of a scratch file; `None` for pipes and closed subjects.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        match self {
            Self::File { path, .. } => std::fs::metadata(path).ok().map(|meta| meta.len()),
            Self::Pipe { .. } | Self::Closed => None,
        }
    }
}

impl Drop for Subject {
    fn drop(&mut self) {
        if let Self::File { path, .. } = self {
            let _ = std::fs::remove_file(path);
        }
    }
}
