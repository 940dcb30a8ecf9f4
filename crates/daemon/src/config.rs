//! Module configuration, in the classic `rsyncd.conf` INI-style format:
//! `[name]` section headers followed by `key = value` directives.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DaemonError;

/// One `[module]` section: the path it serves, an optional listing comment,
/// and, if present, the users and secrets file gating access to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConfig {
    /// The module's name, used as the `module name` in the handshake.
    pub name: String,
    /// The directory this module serves.
    pub path: PathBuf,
    /// Advertised in the empty-name module listing.
    pub comment: String,
    /// Usernames permitted to authenticate against this module. Empty means
    /// the module requires no authentication.
    pub auth_users: Vec<String>,
    /// Path to the `user:password` secrets file, required iff
    /// `auth_users` is non-empty.
    pub secrets_file: Option<PathBuf>,
}

impl ModuleConfig {
    /// Whether this module requires authentication.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        !self.auth_users.is_empty()
    }
}

/// A full daemon configuration: every configured module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Modules available on this daemon, in configuration-file order.
    pub modules: Vec<ModuleConfig>,
}

impl DaemonConfig {
    /// Looks up a module by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|module| module.name == name)
    }

    /// Reads and parses a daemon configuration file from `path`.
    pub fn load(path: &Path) -> Result<Self, DaemonError> {
        let text = fs::read_to_string(path)
            .map_err(|err| DaemonError::Config(format!("reading {}: {err}", path.display())))?;
        Self::parse(&text)
    }

    /// Parses a daemon configuration from its textual form. Blank lines and
    /// lines starting with `#` or `;` are ignored; a `[name]` line opens a
    /// new module section; `key = value` lines set that module's
    /// directives.
    pub fn parse(text: &str) -> Result<Self, DaemonError> {
        let mut modules = Vec::new();
        let mut current: Option<ModuleConfig> = None;

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
                if let Some(module) = current.take() {
                    modules.push(finalize(module)?);
                }
                current = Some(ModuleConfig {
                    name: name.trim().to_string(),
                    path: PathBuf::new(),
                    comment: String::new(),
                    auth_users: Vec::new(),
                    secrets_file: None,
                });
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| DaemonError::Config(format!("malformed directive: {line:?}")))?;
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            let module = current
                .as_mut()
                .ok_or_else(|| DaemonError::Config(format!("directive outside any [module] section: {line:?}")))?;

            match key.as_str() {
                "path" => module.path = PathBuf::from(value),
                "comment" => module.comment = value.to_string(),
                "auth users" => {
                    module.auth_users = value.split(',').map(|u| u.trim().to_string()).filter(|u| !u.is_empty()).collect();
                }
                "secrets file" => module.secrets_file = Some(PathBuf::from(value)),
                other => return Err(DaemonError::Config(format!("unknown directive: {other:?}"))),
            }
        }

        if let Some(module) = current.take() {
            modules.push(finalize(module)?);
        }

        Ok(Self { modules })
    }
}

fn finalize(module: ModuleConfig) -> Result<ModuleConfig, DaemonError> {
    if module.path.as_os_str().is_empty() {
        return Err(DaemonError::Config(format!("module {:?} has no path directive", module.name)));
    }
    if module.requires_auth() && module.secrets_file.is_none() {
        return Err(DaemonError::Config(format!(
            "module {:?} has auth users but no secrets file",
            module.name
        )));
    }
    Ok(module)
}
