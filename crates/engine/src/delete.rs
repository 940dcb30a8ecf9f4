//! The generator's deletion pass (spec §4.6 step 2): removing entries that
//! exist in the real target directory but not in the sender's file list,
//! unless protected or excluded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use filters::FilterStack;
use metadata::FileAttributeBackend;

use crate::error::EngineError;

/// Lists `real_dir`'s direct children and unlinks every entry whose name
/// (as raw bytes) is absent from `sender_names`, unless `filters` marks it
/// protected or excluded. Returns the paths actually removed, each of which
/// is also logged at [`logging::Level::Info`].
pub fn delete_extraneous(
    backend: &dyn FileAttributeBackend,
    filters: &FilterStack,
    real_dir: &Path,
    sender_names: &HashSet<Vec<u8>>,
) -> Result<Vec<PathBuf>, EngineError> {
    let mut removed = Vec::new();

    let entries = match backend.read_dir(real_dir) {
        Ok(entries) => entries,
        Err(metadata::MetadataError::Io { .. }) => return Ok(removed),
        Err(err) => return Err(err.into()),
    };

    for entry in entries {
        let entry = entry?;
        if sender_names.contains(entry.file_name.as_encoded_bytes()) {
            continue;
        }

        let name = entry.file_name.to_string_lossy();
        let is_dir = matches!(entry.attributes.file_type(), metadata::FileType::Directory);
        if filters.is_protected(&name, is_dir) || filters.is_excluded(&name, is_dir) {
            continue;
        }

        let path = real_dir.join(&entry.file_name);
        backend.unlink(&path)?;
        logging::record(logging::Level::Info, format!("deleting {}", path.display()));
        removed.push(path);
    }

    Ok(removed)
}
