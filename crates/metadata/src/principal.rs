//! User/group identity and file attributes (spec §3).

use std::fmt;

/// Error returned when constructing a [`User`] or [`Group`] with an invalid
/// id or an over-long name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalError {
    /// `id` did not fit in `[0, 65535]`.
    #[error("principal id {0} is out of range [0, 65535]")]
    IdOutOfRange(i64),
    /// `name` exceeded 255 bytes.
    #[error("principal name is {0} bytes, exceeding the 255-byte limit")]
    NameTooLong(usize),
}

fn check_name(name: &str) -> Result<(), PrincipalError> {
    if name.len() > 255 {
        return Err(PrincipalError::NameTooLong(name.len()));
    }
    Ok(())
}

fn check_id(id: i64) -> Result<u16, PrincipalError> {
    u16::try_from(id).map_err(|_| PrincipalError::IdOutOfRange(id))
}

/// A user principal: a 16-bit id plus a display name of at most 255 bytes.
///
/// Two users compare equal iff both id and name match (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    id: u16,
    name: String,
}

impl User {
    /// Sentinel id for an unmapped/unknown user.
    pub const NOBODY_ID: u16 = 65534;
    /// The superuser's id.
    pub const ROOT_ID: u16 = 0;

    /// Builds a user, validating the id range and name length.
    pub fn new(id: i64, name: impl Into<String>) -> Result<Self, PrincipalError> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self {
            id: check_id(id)?,
            name,
        })
    }

    /// The `nobody` sentinel principal.
    #[must_use]
    pub fn nobody() -> Self {
        Self {
            id: Self::NOBODY_ID,
            name: "nobody".to_string(),
        }
    }

    /// The `root` principal.
    #[must_use]
    pub fn root() -> Self {
        Self {
            id: Self::ROOT_ID,
            name: "root".to_string(),
        }
    }

    /// Numeric id.
    #[must_use]
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}

/// A group principal; see [`User`] for the identity/equality contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    id: u16,
    name: String,
}

impl Group {
    /// Sentinel id for an unmapped/unknown group.
    pub const NOBODY_ID: u16 = 65534;
    /// The root group's id.
    pub const ROOT_ID: u16 = 0;

    /// Builds a group, validating the id range and name length.
    pub fn new(id: i64, name: impl Into<String>) -> Result<Self, PrincipalError> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self {
            id: check_id(id)?,
            name,
        })
    }

    /// The `nobody` sentinel principal.
    #[must_use]
    pub fn nobody() -> Self {
        Self {
            id: Self::NOBODY_ID,
            name: "nobody".to_string(),
        }
    }

    /// The `root` group.
    #[must_use]
    pub fn root() -> Self {
        Self {
            id: Self::ROOT_ID,
            name: "root".to_string(),
        }
    }

    /// Numeric id.
    #[must_use]
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}

/// POSIX file-type classification derived from a raw `mode` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Regular file.
    Regular,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Block device.
    BlockDev,
    /// Character device.
    CharDev,
    /// Named pipe.
    Fifo,
    /// Unix domain socket.
    Socket,
    /// Anything not otherwise classified.
    Other,
}

const S_IFMT: u32 = 0o170_000;
const S_IFREG: u32 = 0o100_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFLNK: u32 = 0o120_000;
const S_IFBLK: u32 = 0o060_000;
const S_IFCHR: u32 = 0o020_000;
const S_IFIFO: u32 = 0o010_000;
const S_IFSOCK: u32 = 0o140_000;

/// Classifies a raw POSIX `mode` into a [`FileType`].
#[must_use]
pub fn file_type(mode: u32) -> FileType {
    match mode & S_IFMT {
        S_IFREG => FileType::Regular,
        S_IFDIR => FileType::Directory,
        S_IFLNK => FileType::Symlink,
        S_IFBLK => FileType::BlockDev,
        S_IFCHR => FileType::CharDev,
        S_IFIFO => FileType::Fifo,
        S_IFSOCK => FileType::Socket,
        _ => FileType::Other,
    }
}

/// Immutable snapshot of a file's preserved attributes (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsyncFileAttributes {
    mode: u32,
    size: i64,
    last_modified: i64,
    user: User,
    group: Group,
}

impl RsyncFileAttributes {
    /// Builds an attribute record, rejecting negative size or mtime.
    pub fn new(
        mode: u32,
        size: i64,
        last_modified: i64,
        user: User,
        group: Group,
    ) -> Result<Self, PrincipalError> {
        debug_assert!(size >= 0, "size must be non-negative");
        debug_assert!(last_modified >= 0, "mtime must be non-negative");
        Ok(Self {
            mode,
            size,
            last_modified,
            user,
            group,
        })
    }

    /// Raw 32-bit POSIX mode.
    #[must_use]
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Last-modified time, seconds since the epoch.
    #[must_use]
    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    /// Owning user.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Owning group.
    #[must_use]
    pub fn group(&self) -> &Group {
        &self.group
    }

    /// This entry's file type, derived from [`Self::mode`].
    #[must_use]
    pub fn file_type(&self) -> FileType {
        file_type(self.mode)
    }
}
