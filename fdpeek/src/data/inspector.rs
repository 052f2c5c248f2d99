//! Walks one process's descriptor table and classifies every entry.
//!
//! The walk is a single time-of-check snapshot. The target process may open
//! and close descriptors while we read, so entries can vanish between the
//! listing and the link lookup; those are skipped, never retried.

use std::path::Path;

use fdpeek_common::{DescriptorRecord, FileKind, ProcessHandle, SyntheticTarget};
use serde::Deserialize;

use super::procfs::DescriptorSource;
use crate::error::InspectError;

/// Handling of targets whose status lookup fails, typically files deleted
/// while still held open (`/tmp/x (deleted)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Emit the entry with kind Unknown and the stale link text.
    #[default]
    Unknown,
    /// Leave the entry out of the report.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectOptions {
    pub stale_targets: StalePolicy,
    /// Longer targets classify as Unknown without a status lookup.
    pub max_target_len: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            stale_targets: StalePolicy::default(),
            max_target_len: libc::PATH_MAX as usize,
        }
    }
}

/// Open the descriptor table of `pid`.
///
/// Fails only with [`InspectError::TableUnavailable`]. The returned iterator
/// yields one record per classified entry in enumeration order and owns the
/// table handle until it is dropped.
pub fn inspect<S: DescriptorSource>(
    source: &S,
    pid: ProcessHandle,
    options: InspectOptions,
) -> Result<Inspection<'_, S>, InspectError> {
    let entries = source
        .entries(pid)
        .map_err(|source| InspectError::TableUnavailable { pid, source })?;
    log::debug!("opened descriptor table of process {pid}");
    Ok(Inspection {
        source,
        pid,
        entries,
        options,
    })
}

pub struct Inspection<'a, S: DescriptorSource> {
    source: &'a S,
    pid: ProcessHandle,
    entries: S::Entries,
    options: InspectOptions,
}

impl<S: DescriptorSource> Inspection<'_, S> {
    fn inspect_entry(&self, id: String) -> Option<DescriptorRecord> {
        let target = match self.source.read_target(self.pid, &id) {
            Ok(target) => target,
            Err(source) => {
                log::warn!("{}", InspectError::EntryResolution { id, source });
                return None;
            }
        };
        let text = target.to_string_lossy().into_owned();
        let kind = self.classify(&id, &target, &text)?;
        log::debug!("fd {id}: {kind} {text}");
        Some(DescriptorRecord {
            id,
            kind,
            target: text,
        })
    }

    fn classify(&self, id: &str, target: &Path, text: &str) -> Option<FileKind> {
        if let Some(kind) = SyntheticTarget::parse(text).kind() {
            return Some(kind);
        }
        let len = target.as_os_str().len();
        if len > self.options.max_target_len {
            log::debug!(
                "fd {id}: target is {len} bytes, over the {} byte limit",
                self.options.max_target_len
            );
            return Some(FileKind::Unknown);
        }
        match self.source.file_kind(target) {
            Ok(kind) => Some(kind),
            Err(source) => {
                log::warn!(
                    "{}",
                    InspectError::StatusLookup {
                        id: id.to_string(),
                        target: text.to_string(),
                        source,
                    }
                );
                match self.options.stale_targets {
                    StalePolicy::Unknown => Some(FileKind::Unknown),
                    StalePolicy::Skip => None,
                }
            }
        }
    }
}

impl<S: DescriptorSource> Iterator for Inspection<'_, S> {
    type Item = DescriptorRecord;

    fn next(&mut self) -> Option<DescriptorRecord> {
        loop {
            let id = match self.entries.next()? {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("{}", InspectError::Enumeration(e));
                    continue;
                }
            };
            if id == "." || id == ".." {
                continue;
            }
            if let Some(record) = self.inspect_entry(id) {
                return Some(record);
            }
        }
    }
}
