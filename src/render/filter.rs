//! File extension allow-listing.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A set of file extensions whose diffs are rendered in full.
///
/// Extensions are stored lowercase with a leading dot; matching is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize(ext.as_ref()))
            .collect();
        Self { extensions }
    }

    /// Whether `path` has one of the allowed extensions.
    pub fn allows(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .is_some_and(|ext| self.extensions.contains(&ext))
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

fn normalize(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.');
    if ext.is_empty() {
        None
    } else {
        Some(format!(".{}", ext.to_lowercase()))
    }
}

impl FromStr for ExtensionFilter {
    type Err = String;

    /// Parse a comma-separated list such as `.c,.h` or `rs, toml`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let filter = Self::new(s.split(','));
        if filter.is_empty() {
            return Err(format!("No file extensions in '{}'", s));
        }
        Ok(filter)
    }
}

impl fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        f.write_str(&joined.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_listed_extensions() {
        let filter = ExtensionFilter::new([".c", ".h"]);
        assert!(filter.allows("main.c"));
        assert!(filter.allows("include/util.h"));
        assert!(!filter.allows("foo.py"));
    }

    #[test]
    fn test_files_without_extension_are_not_allowed() {
        let filter = ExtensionFilter::new([".c"]);
        assert!(!filter.allows("Makefile"));
        assert!(!filter.allows(".gitignore"));
    }

    #[test]
    fn test_parse_normalizes_dots_case_and_whitespace() {
        let filter: ExtensionFilter = " .C, h ,,RS".parse().unwrap();
        assert_eq!(filter.to_string(), ".c,.h,.rs");
        assert!(filter.allows("lib.RS"));
        assert!(filter.allows("main.c"));
    }

    #[test]
    fn test_parse_empty_list_fails() {
        assert!("".parse::<ExtensionFilter>().is_err());
        assert!(" , ,".parse::<ExtensionFilter>().is_err());
    }
}
