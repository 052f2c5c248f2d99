use std::io;

use fdpeek_common::ProcessHandle;
use thiserror::Error;

/// Failures while inspecting a descriptor table.
///
/// Only `TableUnavailable` ends an inspection. The per-entry variants are
/// logged and the entry is dropped or degraded; the walk carries on.
#[derive(Debug, Error)]
pub enum InspectError {
    /// No such process, permission denied, or the process exited.
    #[error("failed to open descriptor table for process {pid}: {source}")]
    TableUnavailable {
        pid: ProcessHandle,
        #[source]
        source: io::Error,
    },

    #[error("failed to read next descriptor table entry: {0}")]
    Enumeration(#[source] io::Error),

    #[error("failed to read symbolic link for fd {id}: {source}")]
    EntryResolution {
        id: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to stat {target} (fd {id}): {source}")]
    StatusLookup {
        id: String,
        target: String,
        #[source]
        source: io::Error,
    },
}
