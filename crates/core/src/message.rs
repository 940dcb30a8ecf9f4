//! Role and message formatting used by itemize-output verbosity (spec §4.9).

use engine::ItemizeFlags;

/// Which side of a transfer produced an itemized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The client driving the session.
    Client,
    /// The remote or local peer acting as sender.
    Sender,
    /// The generator/receiver side.
    Receiver,
}

impl Role {
    /// A short label matching the role's conventional single-letter tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Client => "c",
            Self::Sender => "s",
            Self::Receiver => "r",
        }
    }
}

/// One itemize-output line: an index, the path it refers to, the flags the
/// generator produced for it, and which [`Role`] emitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The role that produced this line.
    pub role: Role,
    /// The path the line describes.
    pub path: String,
    /// The itemize flags describing what changed.
    pub flags: ItemizeFlags,
}

impl Message {
    /// Builds a message for `path` with the given `flags`, attributed to
    /// `role`.
    #[must_use]
    pub fn new(role: Role, path: impl Into<String>, flags: ItemizeFlags) -> Self {
        Self { role, path: path.into(), flags }
    }

    /// Renders an `rsync`-style itemize line: an 11-character flag summary
    /// followed by the path, e.g. `>f+++++++++ foo/bar`.
    #[must_use]
    pub fn render(&self) -> String {
        let update_char = if self.flags.contains(ItemizeFlags::LOCAL_CHANGE) {
            'c'
        } else if self.flags.contains(ItemizeFlags::TRANSFER) {
            '>'
        } else {
            '.'
        };
        let mut summary = String::with_capacity(11);
        summary.push(update_char);
        summary.push('f');
        summary.push(if self.flags.contains(ItemizeFlags::REPORT_SIZE) { 's' } else { '.' });
        summary.push(if self.flags.contains(ItemizeFlags::REPORT_TIME) { 't' } else { '.' });
        summary.push(if self.flags.contains(ItemizeFlags::REPORT_PERMS) { 'p' } else { '.' });
        summary.push(if self.flags.contains(ItemizeFlags::REPORT_OWNER) { 'o' } else { '.' });
        summary.push(if self.flags.contains(ItemizeFlags::REPORT_GROUP) { 'g' } else { '.' });
        summary.push_str("....");
        format!("{summary} {}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_renders_with_update_marker() {
        let flags = ItemizeFlags::empty().with(ItemizeFlags::TRANSFER).with(ItemizeFlags::REPORT_SIZE);
        let msg = Message::new(Role::Receiver, "a/b.txt", flags);
        assert!(msg.render().starts_with(">fs"));
        assert!(msg.render().ends_with("a/b.txt"));
    }

    #[test]
    fn local_change_renders_with_creation_marker() {
        let msg = Message::new(Role::Receiver, "new/dir", ItemizeFlags::empty().with(ItemizeFlags::LOCAL_CHANGE));
        assert!(msg.render().starts_with("cf"));
    }

    #[test]
    fn role_tags_are_single_letters() {
        assert_eq!(Role::Client.tag(), "c");
        assert_eq!(Role::Sender.tag(), "s");
        assert_eq!(Role::Receiver.tag(), "r");
    }
}
