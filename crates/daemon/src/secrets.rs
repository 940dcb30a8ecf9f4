//! `user:password` secrets file lookup, used to authenticate against a
//! [`crate::config::ModuleConfig`] that requires it (spec §4.2 step 4).

use std::fs;
use std::path::Path;

use crate::error::DaemonError;

/// Reads a secrets file and returns the password bound to `username`, if
/// present. Lines are `username:password`; blank lines and lines starting
/// with `#` are ignored.
pub fn lookup_password(path: &Path, username: &str) -> Result<Option<Vec<u8>>, DaemonError> {
    let text = fs::read_to_string(path)
        .map_err(|err| DaemonError::Secrets(format!("reading {}: {err}", path.display())))?;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, password) = line
            .split_once(':')
            .ok_or_else(|| DaemonError::Secrets(format!("malformed secrets line: {line:?}")))?;
        if name == username {
            return Ok(Some(password.as_bytes().to_vec()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;
    use std::io::Write;

    #[test]
    fn finds_matching_username() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# comment\nalice:hunter2\nbob:correcthorse\n").unwrap();
        let password = lookup_password(file.path(), "bob").unwrap();
        assert_eq!(password, Some(b"correcthorse".to_vec()));
    }

    #[test]
    fn returns_none_for_unknown_username() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "alice:hunter2\n").unwrap();
        assert_eq!(lookup_password(file.path(), "eve").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not-a-valid-line\n").unwrap();
        assert!(lookup_password(file.path(), "alice").is_err());
    }
}
