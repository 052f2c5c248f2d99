use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

use fdpeek_common::{FileKind, ProcessHandle};

use super::classify::kind_from_mode;

/// The operating system as seen by the inspector: a per-process descriptor
/// table that can be listed, links that can be read, and paths that can be
/// stat-ed.
pub trait DescriptorSource {
    /// Lazily yields entry names of an open table. Dropping it releases the
    /// table handle.
    type Entries: Iterator<Item = io::Result<String>>;

    /// Open the descriptor table of `pid`.
    fn entries(&self, pid: ProcessHandle) -> io::Result<Self::Entries>;

    /// Resolve what descriptor `id` of `pid` points at.
    fn read_target(&self, pid: ProcessHandle, id: &str) -> io::Result<PathBuf>;

    /// Status lookup on a resolved target, following symlinks.
    fn file_kind(&self, path: &Path) -> io::Result<FileKind>;
}

/// `/proc/<pid>/fd` on Linux.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn fd_dir(&self, pid: ProcessHandle) -> PathBuf {
        self.root.join(pid.to_string()).join("fd")
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new("/proc")
    }
}

/// Entry names of an open `/proc/<pid>/fd` directory.
pub struct FdEntries {
    dir: ReadDir,
}

impl Iterator for FdEntries {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.dir.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };
        Some(entry.file_name().into_string().map_err(|name| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("non UTF-8 entry name {name:?}"),
            )
        }))
    }
}

impl DescriptorSource for ProcFs {
    type Entries = FdEntries;

    fn entries(&self, pid: ProcessHandle) -> io::Result<FdEntries> {
        let dir = fs::read_dir(self.fd_dir(pid))?;
        Ok(FdEntries { dir })
    }

    fn read_target(&self, pid: ProcessHandle, id: &str) -> io::Result<PathBuf> {
        fs::read_link(self.fd_dir(pid).join(id))
    }

    fn file_kind(&self, path: &Path) -> io::Result<FileKind> {
        let stat = nix::sys::stat::stat(path)?;
        Ok(kind_from_mode(stat.st_mode))
    }
}
