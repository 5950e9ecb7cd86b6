//! Native execution through the `regress` ECMAScript engine
//!
//! Sources are compat-transpiled first, so `s`, `x` and named groups work
//! the same regardless of what the engine supports; named captures are then
//! reported through the group map the transpiler produced.

use std::collections::BTreeMap;

use tracing::debug;

use crate::compat::compat_transpile;
use crate::error::{RegexError, Result};
use crate::transform::GroupMap;

/// Flags the engine understands; the rest only matter to callers
const ENGINE_FLAGS: &str = "imsu";

/// A compiled native regex
#[derive(Debug, Clone)]
pub struct NativeRegex {
    regex: regress::Regex,
    source: String,
    flags: String,
    groups: GroupMap,
}

/// One successful match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecMatch {
    /// Char offset of the match in the input
    pub index: usize,
    /// Group 0 is the whole match, then each capturing group
    pub groups: Vec<Option<String>>,
    /// Captures of named groups
    pub named: BTreeMap<String, Option<String>>,
}

impl NativeRegex {
    /// Compile a pattern body with flags
    pub fn compile(source: &str, flags: &str, groups: GroupMap) -> Result<Self> {
        let engine_flags: String = flags.chars().filter(|c| ENGINE_FLAGS.contains(*c)).collect();
        let regex = regress::Regex::with_flags(source, engine_flags.as_str())
            .map_err(|e| RegexError::Native(e.to_string()))?;
        debug!(source, flags, "compiled native regex");
        Ok(NativeRegex {
            regex,
            source: source.to_string(),
            flags: flags.to_string(),
            groups,
        })
    }

    /// The compiled pattern body
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The flags the regex was created with
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Whether the regex matches anywhere in `input`
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.find(input).is_some()
    }

    /// First match in `input`
    pub fn exec(&self, input: &str) -> Option<ExecMatch> {
        let m = self.regex.find(input)?;
        let text = |range: Option<std::ops::Range<usize>>| range.map(|r| input[r].to_string());

        let mut groups = vec![text(Some(m.range()))];
        groups.extend(m.captures.iter().cloned().map(text));

        let named = self
            .groups
            .iter()
            .map(|(name, number)| {
                let value = groups.get(*number as usize).cloned().flatten();
                (name.clone(), value)
            })
            .collect();

        Some(ExecMatch {
            index: input[..m.start()].chars().count(),
            groups,
            named,
        })
    }
}

/// Compat-transpile `source` and compile it natively
pub fn to_regexp(source: &str) -> Result<NativeRegex> {
    let result = compat_transpile(source)?;
    let groups = result.extra().cloned().unwrap_or_default();
    NativeRegex::compile(result.source(), result.flags().as_str(), groups)
}

/// Run `source` against `input`
pub fn exec(source: &str, input: &str) -> Result<Option<ExecMatch>> {
    Ok(to_regexp(source)?.exec(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_named_groups() {
        let m = exec("/(?<year>\\d{4})-(?<month>\\d{2})/", "on 2024-05")
            .unwrap()
            .unwrap();
        assert_eq!(m.index, 3);
        assert_eq!(m.groups[0].as_deref(), Some("2024-05"));
        assert_eq!(m.named["year"].as_deref(), Some("2024"));
        assert_eq!(m.named["month"].as_deref(), Some("05"));
    }

    #[test]
    fn test_exec_unmatched_group() {
        let m = exec("/a(b)?c/", "ac").unwrap().unwrap();
        assert_eq!(m.groups, vec![Some("ac".to_string()), None]);
    }

    #[test]
    fn test_exec_no_match() {
        assert_eq!(exec("/z/", "abc").unwrap(), None);
    }

    #[test]
    fn test_dot_all_and_extended() {
        let re = to_regexp("/a . b # any char/sx").unwrap();
        assert!(re.is_match("a\nb"));
        assert_eq!(re.flags(), "");
    }

    #[test]
    fn test_index_counts_chars() {
        let m = exec("/b/", "éb").unwrap().unwrap();
        assert_eq!(m.index, 1);
    }
}
