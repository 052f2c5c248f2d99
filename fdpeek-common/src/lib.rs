//! Plain types shared between the inspector and its report.
//!
//! Nothing here touches the operating system; the binary crate owns every
//! syscall and feeds the results through these types.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A process to inspect. Always a positive `pid_t`.
///
/// Existence is not checked on construction; a missing process only shows
/// up once its descriptor table cannot be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessHandle(i32);

impl ProcessHandle {
    pub fn new(pid: i32) -> Result<Self, InvalidPid> {
        if pid > 0 {
            Ok(Self(pid))
        } else {
            Err(InvalidPid::NotPositive(pid.to_string()))
        }
    }

    pub fn as_raw(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProcessHandle {
    type Err = InvalidPid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let pid: i64 = s.parse().map_err(|_| InvalidPid::NotANumber(s.to_string()))?;
        if pid <= 0 {
            return Err(InvalidPid::NotPositive(s.to_string()));
        }
        let pid = i32::try_from(pid).map_err(|_| InvalidPid::OutOfRange(s.to_string()))?;
        Ok(Self(pid))
    }
}

/// Why a PID argument was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPid {
    #[error("Invalid PID '{0}': not a number")]
    NotANumber(String),
    #[error("Invalid PID '{0}': must be a positive integer")]
    NotPositive(String),
    #[error("Invalid PID '{0}': out of range")]
    OutOfRange(String),
}

/// Classified type of a descriptor's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileKind {
    RegularFile,
    Directory,
    CharacterDevice,
    BlockDevice,
    NamedPipe,
    Socket,
    #[default]
    Unknown,
}

impl FileKind {
    /// Label printed in the `Type` column. One label per kind, whichever
    /// path classified it.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RegularFile => "Regular File",
            Self::Directory => "Directory",
            Self::CharacterDevice => "Character Device",
            Self::BlockDevice => "Block Device",
            Self::NamedPipe => "FIFO (Named Pipe)",
            Self::Socket => "Socket",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// What a descriptor's link text denotes.
///
/// The kernel renders descriptors without a filesystem path as
/// `<prefix>:[inode]` or `anon_inode:<name>`, and every real path is
/// absolute. Anything not starting with `/` must never be stat-ed: the lookup
/// either fails or hits an unrelated file of the same name in the current
/// directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticTarget {
    /// Ordinary path; classify it with a status lookup.
    RealPath,
    AnonymousPipe,
    AnonymousSocket,
    /// eventfd, epoll, signalfd, timerfd, inotify and friends.
    AnonymousInode,
    /// Any other relative pseudo-path, e.g. `net:[4026531840]` for a
    /// namespace handle.
    Other,
}

const PIPE_PREFIX: &str = "pipe:";
const SOCKET_PREFIX: &str = "socket:";
const ANON_INODE_PREFIX: &str = "anon_inode:";

impl SyntheticTarget {
    pub fn parse(target: &str) -> Self {
        if target.starts_with(PIPE_PREFIX) {
            Self::AnonymousPipe
        } else if target.starts_with(SOCKET_PREFIX) {
            Self::AnonymousSocket
        } else if target.starts_with(ANON_INODE_PREFIX) {
            Self::AnonymousInode
        } else if target.starts_with('/') {
            Self::RealPath
        } else {
            Self::Other
        }
    }

    /// Kind implied by the marker alone, or `None` for real paths.
    pub fn kind(&self) -> Option<FileKind> {
        match self {
            Self::RealPath => None,
            Self::AnonymousPipe => Some(FileKind::NamedPipe),
            Self::AnonymousSocket => Some(FileKind::Socket),
            Self::AnonymousInode | Self::Other => Some(FileKind::Unknown),
        }
    }
}

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorRecord {
    /// Entry name exactly as enumerated, normally a small integer.
    pub id: String,
    pub kind: FileKind,
    /// Raw link text.
    pub target: String,
}
