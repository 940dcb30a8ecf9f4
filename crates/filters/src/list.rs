//! Parsing a filter file into rules and merge directives (spec §4.4).

use std::path::{Path, PathBuf};

use crate::error::FilterError;
use crate::rule::FilterRule;

/// A `dir-merge`/`:` directive: reload `file_name` from each directory
/// visited during traversal and splice its rules in at that point.
#[derive(Debug, Clone)]
pub struct DirMergeSpec {
    file_name: String,
    inherit: bool,
    exclude_self: bool,
}

impl DirMergeSpec {
    /// The per-directory file name to look for (e.g. `.rsync-filter`).
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Whether the rules loaded from this directive should also apply to
    /// subdirectories (the `n` modifier disables this).
    #[must_use]
    pub fn inherit(&self) -> bool {
        self.inherit
    }

    /// Whether the merge file itself should be implicitly excluded from
    /// the transfer (the `e` modifier).
    #[must_use]
    pub fn exclude_self(&self) -> bool {
        self.exclude_self
    }
}

/// One parsed entry: either a concrete rule or a deferred per-directory
/// merge directive.
#[derive(Debug, Clone)]
pub enum FilterItem {
    /// A concrete, immediately-applicable rule.
    Rule(FilterRule),
    /// A `dir-merge` directive to be expanded lazily per directory.
    DirMerge(DirMergeSpec),
}

enum MergeDirective {
    OneShot { path: String, exclude_self: bool },
    PerDirectory { file_name: String, inherit: bool, exclude_self: bool },
}

fn classify_head(head: &str) -> Option<(bool, &str)> {
    for (token, per_dir) in [(".", false), ("merge", false), (":", true), ("dir-merge", true)] {
        if let Some(rest) = head.strip_prefix(token) {
            let rest = rest.strip_prefix(',').unwrap_or(rest);
            if rest.chars().all(|c| c == 'n' || c == 'e') {
                return Some((per_dir, rest));
            }
        }
    }
    None
}

fn parse_merge_directive(line: &str) -> Option<MergeDirective> {
    let (head, rest) = line.split_once(char::is_whitespace)?;
    let (per_dir, modifiers) = classify_head(head)?;
    let inherit = !modifiers.contains('n');
    let exclude_self = modifiers.contains('e');
    let path = rest.trim().to_string();
    if path.is_empty() {
        return None;
    }
    Some(if per_dir {
        MergeDirective::PerDirectory {
            file_name: path,
            inherit,
            exclude_self,
        }
    } else {
        MergeDirective::OneShot { path, exclude_self }
    })
}

/// An ordered list of rules and dir-merge directives, as parsed from one
/// filter file or one `--filter`/`--exclude` argument batch.
#[derive(Debug, Clone, Default)]
pub struct FilterList {
    items: Vec<FilterItem>,
}

impl FilterList {
    /// Parses `text` (one rule per line; blank lines and `#` comments are
    /// skipped). One-shot `merge`/`.` directives are read and spliced in
    /// immediately, resolved relative to `base_dir`; `dir-merge`/`:`
    /// directives are kept as markers for per-directory expansion later.
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self, FilterError> {
        let mut items = Vec::new();
        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_merge_directive(line) {
                Some(MergeDirective::OneShot { path, exclude_self }) => {
                    let file_path = base_dir.join(&path);
                    let content = std::fs::read_to_string(&file_path).map_err(|source| {
                        FilterError::MergeFileUnreadable {
                            path: file_path.clone(),
                            source,
                        }
                    })?;
                    let parent = file_path.parent().unwrap_or(base_dir).to_path_buf();
                    let nested = Self::parse(&content, &parent)?;
                    items.extend(nested.items);
                    if exclude_self {
                        items.push(FilterItem::Rule(FilterRule::parse(&format!("- /{path}"))?));
                    }
                }
                Some(MergeDirective::PerDirectory { file_name, inherit, exclude_self }) => {
                    items.push(FilterItem::DirMerge(DirMergeSpec {
                        file_name,
                        inherit,
                        exclude_self,
                    }));
                }
                None => items.push(FilterItem::Rule(FilterRule::parse(line)?)),
            }
        }
        Ok(Self { items })
    }

    /// Builds a list directly from already-parsed rules, with no merge
    /// directives (useful for rules supplied on the command line).
    #[must_use]
    pub fn from_rules(rules: Vec<FilterRule>) -> Self {
        Self {
            items: rules.into_iter().map(FilterItem::Rule).collect(),
        }
    }

    /// Appends a `dir-merge` marker, e.g. when re-assembling a list after
    /// prepending an implicit self-exclude rule.
    #[must_use]
    pub fn with_dir_merge(mut self, spec: DirMergeSpec) -> Self {
        self.items.push(FilterItem::DirMerge(spec));
        self
    }

    /// Reads and parses a filter file from disk.
    pub fn from_file(path: &Path) -> Result<Self, FilterError> {
        let content = std::fs::read_to_string(path).map_err(|source| FilterError::MergeFileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        Self::parse(&content, base_dir)
    }

    /// Rules in this list, in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &FilterRule> {
        self.items.iter().filter_map(|item| match item {
            FilterItem::Rule(rule) => Some(rule),
            FilterItem::DirMerge(_) => None,
        })
    }

    /// Dir-merge directives declared in this list.
    pub fn dir_merges(&self) -> impl Iterator<Item = &DirMergeSpec> {
        self.items.iter().filter_map(|item| match item {
            FilterItem::DirMerge(spec) => Some(spec),
            FilterItem::Rule(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_rules() {
        let list = FilterList::parse("- *.o\n+ keep.o\n", Path::new(".")).unwrap();
        assert_eq!(list.rules().count(), 2);
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let list = FilterList::parse("# comment\n\n- *.o\n", Path::new(".")).unwrap();
        assert_eq!(list.rules().count(), 1);
    }

    #[test]
    fn dir_merge_directive_is_kept_as_a_marker() {
        let list = FilterList::parse(": .rsync-filter\n- *.tmp\n", Path::new(".")).unwrap();
        assert_eq!(list.rules().count(), 1);
        let specs: Vec<_> = list.dir_merges().collect();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].file_name(), ".rsync-filter");
        assert!(specs[0].inherit());
    }

    #[test]
    fn dir_merge_no_inherit_modifier_is_parsed() {
        let list = FilterList::parse(":n .rsync-filter\n", Path::new(".")).unwrap();
        let specs: Vec<_> = list.dir_merges().collect();
        assert!(!specs[0].inherit());
    }

    #[test]
    fn one_shot_merge_splices_in_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("extra.rules"), "- *.bak\n").unwrap();
        let list = FilterList::parse("merge extra.rules\n", dir.path()).unwrap();
        assert_eq!(list.rules().count(), 1);
    }
}
