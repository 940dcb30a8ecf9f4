//! A single filter rule: kind, modifiers, and compiled pattern (spec §4.4).

use regex::Regex;

use crate::error::FilterError;

/// The six rule kinds, grouped below by which evaluation pass consults them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// `-`: omit from the transfer.
    Exclude,
    /// `+`: include in the transfer (overrides a broader exclude).
    Include,
    /// `P`: do not delete at the destination even if absent from the
    /// source.
    Protect,
    /// `R`: may be deleted even if a broader rule protects it.
    Risk,
    /// `H`: hide from the file list entirely.
    Hide,
    /// `S`: show despite a broader hide.
    Show,
}

/// The three independent evaluation passes a [`crate::FilterStack`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleGroup {
    /// Exclude/Include: governs what is transferred.
    Transfer,
    /// Protect/Risk: governs what deletion may remove.
    Deletion,
    /// Hide/Show: governs what the sender reveals at all.
    Visibility,
}

/// Outcome of evaluating a path against a rule group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The rule group's "negative" kind matched (Exclude/Protect/Hide).
    Excluded,
    /// The rule group's "positive" kind matched (Include/Risk/Show).
    Included,
    /// No rule in the group matched.
    Neutral,
}

impl RuleKind {
    /// Which evaluation pass this kind belongs to.
    #[must_use]
    pub fn group(self) -> RuleGroup {
        match self {
            Self::Exclude | Self::Include => RuleGroup::Transfer,
            Self::Protect | Self::Risk => RuleGroup::Deletion,
            Self::Hide | Self::Show => RuleGroup::Visibility,
        }
    }

    /// Which [`Decision`] this kind contributes when it matches.
    #[must_use]
    pub fn polarity(self) -> Decision {
        match self {
            Self::Exclude | Self::Protect | Self::Hide => Decision::Excluded,
            Self::Include | Self::Risk | Self::Show => Decision::Included,
        }
    }

    fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '-' => Some(Self::Exclude),
            '+' => Some(Self::Include),
            'P' => Some(Self::Protect),
            'R' => Some(Self::Risk),
            'H' => Some(Self::Hide),
            'S' => Some(Self::Show),
            _ => None,
        }
    }
}

/// A compiled filter rule.
#[derive(Debug, Clone)]
pub struct FilterRule {
    kind: RuleKind,
    directory_only: bool,
    negated: bool,
    regex: Regex,
    source: String,
}

impl FilterRule {
    /// Parses one rule line of the form `<marker> <pattern>`, e.g.
    /// `"- *.o"` or `"+ /etc/important/"`.
    pub fn parse(line: &str) -> Result<Self, FilterError> {
        let trimmed = line.trim();
        let mut chars = trimmed.chars();
        let marker = chars.next().ok_or_else(|| FilterError::UnrecognizedRule(line.to_string()))?;
        let kind = RuleKind::from_marker(marker).ok_or_else(|| FilterError::UnrecognizedRule(line.to_string()))?;
        let rest = chars.as_str().trim_start();
        if rest.is_empty() {
            return Err(FilterError::MissingPattern(line.to_string()));
        }
        Self::build(kind, rest, line)
    }

    fn build(kind: RuleKind, pattern: &str, source: &str) -> Result<Self, FilterError> {
        let mut pattern = pattern;
        let negated = pattern.starts_with('!');
        if negated {
            pattern = &pattern[1..];
        }

        let directory_only = pattern.ends_with('/') && pattern.len() > 1;
        let pattern = if directory_only {
            &pattern[..pattern.len() - 1]
        } else {
            pattern
        };

        let anchored = pattern.starts_with('/');
        let pattern = pattern.strip_prefix('/').unwrap_or(pattern);

        let body = translate(pattern);
        let regex_source = if anchored {
            format!("^{body}$")
        } else {
            format!("^(.*/)?{body}$")
        };
        let regex = Regex::new(&regex_source).map_err(|e| FilterError::InvalidPattern(source.to_string(), e))?;

        Ok(Self {
            kind,
            directory_only,
            negated,
            regex,
            source: source.to_string(),
        })
    }

    /// This rule's kind.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// The rule text it was parsed from, for diagnostics.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `path` (a `/`-separated relative path) is matched by this
    /// rule. `is_dir` disambiguates a directory-only rule.
    #[must_use]
    pub fn matches(&self, path: &str, is_dir: bool) -> bool {
        if self.directory_only && !is_dir {
            return false;
        }
        let hit = self.regex.is_match(path);
        if self.negated { !hit } else { hit }
    }
}

/// Translates an rsync-style wildcard pattern into a regex body, per spec
/// §4.4: `?` → `[^/]`, `**` → `.*`, `*` → `[^/].*`, everything else literal.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                out.push_str(".*");
                i += 2;
            }
            '*' => {
                out.push_str("[^/].*");
                i += 1;
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' => {
                // Pass a bracket expression through verbatim; it is already
                // valid regex syntax for a character class.
                out.push('[');
                i += 1;
                while i < chars.len() && chars[i] != ']' {
                    out.push(chars[i]);
                    i += 1;
                }
                if i < chars.len() {
                    out.push(']');
                    i += 1;
                }
            }
            c => {
                out.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }
    out
}
