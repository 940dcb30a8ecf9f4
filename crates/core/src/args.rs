//! A deterministic getopt-style argument parser over a configured option
//! set (spec §4.3).

use std::collections::HashMap;

use crate::error::CoreError;

/// Whether an option is required to be set by the end of parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgPolicy {
    /// Parsing fails if this option was never seen.
    Required,
    /// The option may be absent.
    Optional,
}

/// The shape of value an option's argument takes, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// A bare flag; no value follows.
    None,
    /// A string value.
    String,
    /// An integer value.
    Int,
}

/// One option's configuration: names, whether it's required, and what kind
/// of argument (if any) follows it.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    /// Key this option's value is stored under in a [`ParsedArgs`].
    pub name: &'static str,
    /// Single-character short form (e.g. `v` for `-v`), if any.
    pub short: Option<char>,
    /// Long form (e.g. `verbose` for `--verbose`), if any.
    pub long: Option<&'static str>,
    /// Whether this option must appear.
    pub policy: ArgPolicy,
    /// What kind of argument follows, if any.
    pub kind: ArgKind,
}

impl OptionSpec {
    /// Builds an optional, no-argument flag.
    #[must_use]
    pub fn flag(name: &'static str, short: Option<char>, long: Option<&'static str>) -> Self {
        Self { name, short, long, policy: ArgPolicy::Optional, kind: ArgKind::None }
    }

    /// Builds an option taking a string argument.
    #[must_use]
    pub fn string(name: &'static str, short: Option<char>, long: Option<&'static str>, policy: ArgPolicy) -> Self {
        Self { name, short, long, policy, kind: ArgKind::String }
    }

    /// Builds an option taking an integer argument.
    #[must_use]
    pub fn int(name: &'static str, short: Option<char>, long: Option<&'static str>, policy: ArgPolicy) -> Self {
        Self { name, short, long, policy, kind: ArgKind::Int }
    }
}

/// A value bound to a parsed option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// The flag was present.
    Flag,
    /// A string argument.
    Str(String),
    /// An integer argument.
    Int(i64),
}

/// The result of a successful parse: every option seen, by name, plus the
/// trailing positional (non-option) arguments in order.
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs {
    values: HashMap<&'static str, ArgValue>,
    positionals: Vec<String>,
}

impl ParsedArgs {
    /// Returns the value bound to `name`, if the option was present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// True iff the option named `name` was present at all.
    #[must_use]
    pub fn is_present(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The trailing positional arguments, in the order they appeared.
    #[must_use]
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }
}

/// A parser bound to a fixed set of [`OptionSpec`]s (spec §4.3).
#[derive(Debug, Clone)]
pub struct ArgParser {
    specs: Vec<OptionSpec>,
}

impl ArgParser {
    /// Builds a parser over `specs`.
    #[must_use]
    pub fn new(specs: Vec<OptionSpec>) -> Self {
        Self { specs }
    }

    fn find_short(&self, short: char) -> Option<&OptionSpec> {
        self.specs.iter().find(|spec| spec.short == Some(short))
    }

    fn find_long(&self, long: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|spec| spec.long == Some(long))
    }

    /// Parses `args`. `--` and a bare `-` both terminate option parsing,
    /// with everything after treated as positional; `--name=value` and
    /// `--name value` are equivalent; short options cluster (`-abc`), and an
    /// option expecting a value may consume the remainder of the cluster or
    /// the next argument. Fails if a required option was never set.
    pub fn parse(&self, args: &[String]) -> Result<ParsedArgs, CoreError> {
        let mut result = ParsedArgs::default();
        let mut iter = args.iter().peekable();
        let mut options_done = false;

        while let Some(arg) = iter.next() {
            if options_done {
                result.positionals.push(arg.clone());
                continue;
            }

            if arg == "--" {
                options_done = true;
                continue;
            }
            if arg == "-" {
                options_done = true;
                result.positionals.push(arg.clone());
                continue;
            }

            if let Some(rest) = arg.strip_prefix("--") {
                let (long, inline_value) = match rest.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_string())),
                    None => (rest, None),
                };
                let spec = self
                    .find_long(long)
                    .ok_or_else(|| CoreError::ArgumentParse(format!("unknown option --{long}")))?
                    .clone();
                let value = self.bind_value(&spec, inline_value, &mut iter)?;
                result.values.insert(spec.name, value);
                continue;
            }

            if let Some(rest) = arg.strip_prefix('-') {
                self.parse_short_cluster(rest, &mut iter, &mut result)?;
                continue;
            }

            result.positionals.push(arg.clone());
        }

        for spec in &self.specs {
            if spec.policy == ArgPolicy::Required && !result.values.contains_key(spec.name) {
                return Err(CoreError::ArgumentParse(format!("missing required option {}", spec.name)));
            }
        }

        Ok(result)
    }

    fn parse_short_cluster<'a, I: Iterator<Item = &'a String>>(
        &self,
        cluster: &str,
        iter: &mut std::iter::Peekable<I>,
        result: &mut ParsedArgs,
    ) -> Result<(), CoreError> {
        let chars: Vec<char> = cluster.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            let spec = self
                .find_short(ch)
                .ok_or_else(|| CoreError::ArgumentParse(format!("unknown option -{ch}")))?
                .clone();

            if spec.kind == ArgKind::None {
                result.values.insert(spec.name, ArgValue::Flag);
                i += 1;
                continue;
            }

            let remainder: String = chars[i + 1..].iter().collect();
            let inline = if remainder.is_empty() { None } else { Some(remainder) };
            let value = self.bind_value(&spec, inline, iter)?;
            result.values.insert(spec.name, value);
            break;
        }
        Ok(())
    }

    fn bind_value<'a, I: Iterator<Item = &'a String>>(
        &self,
        spec: &OptionSpec,
        inline_value: Option<String>,
        iter: &mut std::iter::Peekable<I>,
    ) -> Result<ArgValue, CoreError> {
        if spec.kind == ArgKind::None {
            if inline_value.is_some() {
                return Err(CoreError::ArgumentParse(format!("option {} takes no argument", spec.name)));
            }
            return Ok(ArgValue::Flag);
        }

        let raw = match inline_value {
            Some(value) => value,
            None => iter
                .next()
                .cloned()
                .ok_or_else(|| CoreError::ArgumentParse(format!("option {} requires an argument", spec.name)))?,
        };

        match spec.kind {
            ArgKind::String => Ok(ArgValue::Str(raw)),
            ArgKind::Int => raw
                .parse::<i64>()
                .map(ArgValue::Int)
                .map_err(|_| CoreError::ArgumentParse(format!("option {} requires an integer argument", spec.name))),
            ArgKind::None => unreachable!("handled above"),
        }
    }
}
