use fdpeek_common::FileKind;
use nix::sys::stat::{SFlag, mode_t};

/// Classify the file-type bits of an `st_mode`.
pub fn kind_from_mode(mode: mode_t) -> FileKind {
    let file_type = SFlag::from_bits_truncate(mode & SFlag::S_IFMT.bits());
    if file_type == SFlag::S_IFREG {
        FileKind::RegularFile
    } else if file_type == SFlag::S_IFDIR {
        FileKind::Directory
    } else if file_type == SFlag::S_IFCHR {
        FileKind::CharacterDevice
    } else if file_type == SFlag::S_IFBLK {
        FileKind::BlockDevice
    } else if file_type == SFlag::S_IFIFO {
        FileKind::NamedPipe
    } else if file_type == SFlag::S_IFSOCK {
        FileKind::Socket
    } else {
        FileKind::Unknown
    }
}
