//! The LIFO deferred attribute-update queue (spec §4.6, §5).
//!
//! Directory (and, when content didn't change, file) attribute updates are
//! queued rather than applied immediately, so that permissions land only
//! after content has been written — applying mode before the sender's data
//! stream has landed would briefly expose a directory with its final
//! permissions but incomplete contents.

use std::path::PathBuf;

use metadata::{FileAttributeBackend, Group, LinkOption, User};

use crate::error::EngineError;

/// One entry's pending attribute changes, applied in mode → mtime → uid →
/// gid order when drained (spec §4.6: "ownership last as it may clear
/// setuid bits").
#[derive(Debug, Clone)]
pub struct DeferredAttrUpdate {
    path: PathBuf,
    link: LinkOption,
    mode: Option<u32>,
    mtime: Option<i64>,
    user: Option<User>,
    group: Option<Group>,
}

impl DeferredAttrUpdate {
    /// Builds an update with no attributes set; use the `with_*` builders to
    /// populate it.
    #[must_use]
    pub fn new(path: PathBuf, link: LinkOption) -> Self {
        Self {
            path,
            link,
            mode: None,
            mtime: None,
            user: None,
            group: None,
        }
    }

    /// Queues a permission-bit update.
    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Queues a modification-time update.
    #[must_use]
    pub fn with_mtime(mut self, mtime: i64) -> Self {
        self.mtime = Some(mtime);
        self
    }

    /// Queues an owning-user update.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Queues an owning-group update.
    #[must_use]
    pub fn with_group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    fn apply(&self, backend: &dyn FileAttributeBackend) -> Result<(), EngineError> {
        if let Some(mode) = self.mode {
            backend.set_file_mode(&self.path, mode, self.link)?;
        }
        if let Some(mtime) = self.mtime {
            backend.set_last_modified_time(&self.path, mtime, self.link)?;
        }
        if let Some(user) = &self.user {
            backend.set_owner(&self.path, user, self.link)?;
        }
        if let Some(group) = &self.group {
            backend.set_group(&self.path, group, self.link)?;
        }
        Ok(())
    }
}

/// A LIFO queue of [`DeferredAttrUpdate`]s, drained at the
/// TRANSFER→TEAR_DOWN_1 phase transition (spec §4.6).
#[derive(Debug, Default)]
pub struct DeferredAttrQueue {
    stack: Vec<DeferredAttrUpdate>,
}

impl DeferredAttrQueue {
    /// Builds an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an update onto the stack.
    pub fn push(&mut self, update: DeferredAttrUpdate) {
        self.stack.push(update);
    }

    /// Number of updates still pending.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// True iff no updates are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Drains every pending update in LIFO order, applying each one's
    /// mode/mtime/uid/gid fields in that fixed order.
    pub fn apply_all(&mut self, backend: &dyn FileAttributeBackend) -> Result<(), EngineError> {
        while let Some(update) = self.stack.pop() {
            update.apply(backend)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata::posix::PosixBackend;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn applies_updates_in_lifo_order_without_error() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"").unwrap();
        fs::write(&b, b"").unwrap();

        let mut queue = DeferredAttrQueue::new();
        queue.push(DeferredAttrUpdate::new(a.clone(), LinkOption::NoFollow).with_mode(0o644));
        queue.push(DeferredAttrUpdate::new(b.clone(), LinkOption::NoFollow).with_mode(0o600));

        let backend = PosixBackend::new();
        queue.apply_all(&backend).unwrap();
        assert!(queue.is_empty());

        let mode_a = fs::metadata(&a).unwrap().permissions();
        let mode_b = fs::metadata(&b).unwrap().permissions();
        use std::os::unix::fs::PermissionsExt;
        assert_eq!(mode_a.mode() & 0o777, 0o644);
        assert_eq!(mode_b.mode() & 0o777, 0o600);
    }

    #[test]
    fn empty_queue_applies_cleanly() {
        let backend = PosixBackend::new();
        let mut queue = DeferredAttrQueue::new();
        queue.apply_all(&backend).unwrap();
    }
}
