//! The file-list entry type (spec §4.5, §9 "Dynamic polymorphism over
//! FileInfo variants").

use std::path::{Path, PathBuf};

use metadata::RsyncFileAttributes;

/// Data common to every [`FileInfo`] variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntryData {
    name: Vec<u8>,
    attributes: RsyncFileAttributes,
    local_path: Option<PathBuf>,
}

impl FileEntryData {
    /// Builds a new entry. `local_path` is `Some` iff this entry resolves
    /// to a real path on the local filesystem (the "locatable" distinction,
    /// spec §9) — absent for e.g. an entry reconstructed purely from the
    /// wire with no corresponding local file yet.
    #[must_use]
    pub fn new(name: Vec<u8>, attributes: RsyncFileAttributes, local_path: Option<PathBuf>) -> Self {
        Self {
            name,
            attributes,
            local_path,
        }
    }

    /// Raw basename bytes as they appear on the wire.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        &self.name
    }

    /// Best-effort decoded name for diagnostics; lossy on invalid UTF-8.
    #[must_use]
    pub fn decoded_name(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Preserved attributes (mode, size, mtime, owner).
    #[must_use]
    pub fn attributes(&self) -> &RsyncFileAttributes {
        &self.attributes
    }

    /// The local filesystem path this entry resolves to, if any.
    #[must_use]
    pub fn local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }
}

/// A single file-list entry, tagged by the kind of filesystem object it
/// represents.
///
/// Represented as a tagged sum rather than a trait-object hierarchy: every
/// variant shares [`FileEntryData`], and callers needing a uniform view use
/// the accessor methods below instead of matching on the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileInfo {
    /// A regular file or directory.
    Plain(FileEntryData),
    /// A block or character device, FIFO, or socket.
    Device {
        /// Shared entry data.
        data: FileEntryData,
        /// Device major number.
        major: u32,
        /// Device minor number.
        minor: u32,
    },
    /// A symbolic link.
    Symlink {
        /// Shared entry data.
        data: FileEntryData,
        /// Raw target bytes (not necessarily valid UTF-8).
        target: Vec<u8>,
    },
}

impl FileInfo {
    fn data(&self) -> &FileEntryData {
        match self {
            Self::Plain(data) | Self::Device { data, .. } | Self::Symlink { data, .. } => data,
        }
    }

    /// Raw basename bytes as they appear on the wire.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        self.data().name_bytes()
    }

    /// Best-effort decoded name for diagnostics.
    #[must_use]
    pub fn decoded_name(&self) -> std::borrow::Cow<'_, str> {
        self.data().decoded_name()
    }

    /// Preserved attributes.
    #[must_use]
    pub fn attributes(&self) -> &RsyncFileAttributes {
        self.data().attributes()
    }

    /// The local filesystem path this entry resolves to, if any.
    #[must_use]
    pub fn local_path(&self) -> Option<&Path> {
        self.data().local_path()
    }

    /// True iff this entry names a directory.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        matches!(self.attributes().file_type(), metadata::FileType::Directory)
    }

    /// True iff this entry is the `.` self-reference used to carry the
    /// attributes of the directory a segment expands.
    #[must_use]
    pub fn is_dot_directory(&self) -> bool {
        self.is_directory() && self.name_bytes() == b"."
    }
}
