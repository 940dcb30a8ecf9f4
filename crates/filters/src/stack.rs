//! Evaluating a path against the active chain of filter lists (spec §4.4).

use std::path::Path;

use crate::error::FilterError;
use crate::list::FilterList;
use crate::rule::{Decision, RuleGroup};

/// One level of the active filter chain: a directory's own list plus
/// whether it is inherited by descendants.
struct Level {
    list: FilterList,
    inherit: bool,
}

/// The chain of filter lists in effect while walking a tree: the global
/// list supplied on the command line, plus one level per `dir-merge` file
/// encountered on the way down.
///
/// Evaluation walks local first, then each ancestor that has inheritance
/// enabled, returning the first non-neutral decision (spec §4.4).
pub struct FilterStack {
    levels: Vec<Level>,
}

impl FilterStack {
    /// Starts a stack with a single, always-inherited root list.
    #[must_use]
    pub fn new(root: FilterList) -> Self {
        Self {
            levels: vec![Level { list: root, inherit: true }],
        }
    }

    /// Number of active levels (root plus any pushed directories).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Enters `dir`, pushing a new level for every `dir-merge` directive
    /// visible at the current depth whose file exists in `dir`. Returns the
    /// number of levels pushed, so the caller can pop the same count via
    /// [`FilterStack::leave`].
    pub fn enter_directory(&mut self, dir: &Path) -> Result<usize, FilterError> {
        let specs: Vec<_> = self
            .levels
            .iter()
            .filter(|level| level.inherit)
            .flat_map(|level| level.list.dir_merges().cloned().collect::<Vec<_>>())
            .collect();

        let mut pushed = 0;
        for spec in specs {
            let candidate = dir.join(spec.file_name());
            if !candidate.is_file() {
                continue;
            }
            let mut list = FilterList::from_file(&candidate)?;
            if spec.exclude_self() {
                list = prepend_self_exclude(list, spec.file_name());
            }
            self.levels.push(Level {
                list,
                inherit: spec.inherit(),
            });
            pushed += 1;
        }
        Ok(pushed)
    }

    /// Pops `count` levels pushed by a matching [`FilterStack::enter_directory`].
    pub fn leave(&mut self, count: usize) {
        let new_len = self.levels.len().saturating_sub(count);
        self.levels.truncate(new_len);
    }

    fn evaluate(&self, path: &str, is_dir: bool, group: RuleGroup) -> Decision {
        for level in self.levels.iter().rev() {
            for rule in level.list.rules() {
                if rule.kind().group() == group && rule.matches(path, is_dir) {
                    return rule.kind().polarity();
                }
            }
            if !level.inherit {
                break;
            }
        }
        Decision::Neutral
    }

    /// True iff `path` should be omitted from the transfer.
    #[must_use]
    pub fn is_excluded(&self, path: &str, is_dir: bool) -> bool {
        matches!(self.evaluate(path, is_dir, RuleGroup::Transfer), Decision::Excluded)
    }

    /// True iff `path` is protected from deletion at the destination.
    #[must_use]
    pub fn is_protected(&self, path: &str, is_dir: bool) -> bool {
        matches!(self.evaluate(path, is_dir, RuleGroup::Deletion), Decision::Excluded)
    }

    /// True iff `path` should be hidden from the file list entirely.
    #[must_use]
    pub fn is_hidden(&self, path: &str, is_dir: bool) -> bool {
        matches!(self.evaluate(path, is_dir, RuleGroup::Visibility), Decision::Excluded)
    }
}

fn prepend_self_exclude(list: FilterList, file_name: &str) -> FilterList {
    use crate::rule::FilterRule;
    let mut rules = vec![FilterRule::parse(&format!("- {file_name}")).expect("literal exclude always parses")];
    rules.extend(list.rules().cloned());
    let mut combined = FilterList::from_rules(rules);
    for spec in list.dir_merges() {
        combined = combined.with_dir_merge(spec.clone());
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_rule_takes_precedence_over_ancestor() {
        let root = FilterList::parse("- *.log\n", Path::new(".")).unwrap();
        let mut stack = FilterStack::new(root);
        assert!(stack.is_excluded("debug.log", false));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn dir_merge_file_is_picked_up_on_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".rsync-filter"), "- *.tmp\n").unwrap();

        let root = FilterList::parse(": .rsync-filter\n", Path::new(".")).unwrap();
        let mut stack = FilterStack::new(root);
        let pushed = stack.enter_directory(dir.path()).unwrap();
        assert_eq!(pushed, 1);
        assert!(stack.is_excluded("scratch.tmp", false));
        stack.leave(pushed);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn non_inheriting_dir_merge_does_not_apply_to_children() {
        let dir = tempfile::tempdir().unwrap();
        let child = dir.path().join("child");
        std::fs::create_dir(&child).unwrap();
        std::fs::write(dir.path().join(".rsync-filter"), "- *.tmp\n").unwrap();

        let root = FilterList::parse(":n .rsync-filter\n", Path::new(".")).unwrap();
        let mut stack = FilterStack::new(root);
        let pushed = stack.enter_directory(dir.path()).unwrap();
        let grandchild_pushed = stack.enter_directory(&child).unwrap();
        assert_eq!(grandchild_pushed, 0);
        assert!(!stack.is_excluded("scratch.tmp", false));
        stack.leave(grandchild_pushed);
        stack.leave(pushed);
    }
}
