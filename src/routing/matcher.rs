//! Path matching logic.
//!
//! # Responsibilities
//! - Test a request path against a compiled pattern
//! - Hand back the captured groups of a successful match
//!
//! # Design Decisions
//! - Regular expressions are anchored against the whole path, never a substring
//! - Literal patterns expose the whole path as group 0 and nothing else
//! - Case-sensitive unless the rule asks otherwise

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::config::MatchKind;
use crate::routing::template::GroupRef;

/// Trait for matching paths against a compiled pattern.
pub trait PathMatcher: Send + Sync + fmt::Debug {
    /// Returns the captured groups if the whole path matches.
    fn captures<'p>(&self, path: &'p str) -> Option<PathCaptures<'p>>;

    /// Groups a rewrite template may refer to.
    fn groups(&self) -> Groups;

    /// Pattern flavour, for display.
    fn kind(&self) -> MatchKind;

    /// Pattern source as configured.
    fn source(&self) -> &str;
}

/// Groups defined by a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Groups {
    /// Number of groups including the implicit group 0.
    pub count: usize,
    /// Names of the named groups.
    pub names: Vec<String>,
}

impl Groups {
    pub fn contains(&self, group: &GroupRef) -> bool {
        match group {
            GroupRef::Index(i) => *i < self.count,
            GroupRef::Name(name) => self.names.iter().any(|n| n == name),
        }
    }
}

/// Groups captured from one path.
#[derive(Debug)]
pub enum PathCaptures<'p> {
    Regex(regex::Captures<'p>),
    Whole(&'p str),
}

impl<'p> PathCaptures<'p> {
    /// Text of a group; `None` if the group did not participate in the match.
    pub fn get(&self, group: &GroupRef) -> Option<&'p str> {
        match (self, group) {
            (PathCaptures::Regex(caps), GroupRef::Index(i)) => caps.get(*i).map(|m| m.as_str()),
            (PathCaptures::Regex(caps), GroupRef::Name(name)) => {
                caps.name(name).map(|m| m.as_str())
            }
            (PathCaptures::Whole(path), GroupRef::Index(0)) => Some(*path),
            (PathCaptures::Whole(_), _) => None,
        }
    }
}

/// Regular-expression matcher, anchored at both ends.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    source: String,
    regex: Regex,
}

impl RegexMatcher {
    /// Compile `source` so that it must match the entire path.
    pub fn new(source: impl Into<String>, case_insensitive: bool) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = RegexBuilder::new(&format!("^(?:{})$", source))
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Self { source, regex })
    }
}

impl PathMatcher for RegexMatcher {
    fn captures<'p>(&self, path: &'p str) -> Option<PathCaptures<'p>> {
        self.regex.captures(path).map(PathCaptures::Regex)
    }

    fn groups(&self) -> Groups {
        Groups {
            count: self.regex.captures_len(),
            names: self
                .regex
                .capture_names()
                .flatten()
                .map(str::to_string)
                .collect(),
        }
    }

    fn kind(&self) -> MatchKind {
        MatchKind::Regex
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// Matches one literal path.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    literal: String,
    case_insensitive: bool,
}

impl ExactMatcher {
    pub fn new(literal: impl Into<String>, case_insensitive: bool) -> Self {
        Self {
            literal: literal.into(),
            case_insensitive,
        }
    }
}

impl PathMatcher for ExactMatcher {
    fn captures<'p>(&self, path: &'p str) -> Option<PathCaptures<'p>> {
        let matched = if self.case_insensitive {
            path.eq_ignore_ascii_case(&self.literal)
        } else {
            path == self.literal
        };
        matched.then_some(PathCaptures::Whole(path))
    }

    fn groups(&self) -> Groups {
        Groups { count: 1, names: Vec::new() }
    }

    fn kind(&self) -> MatchKind {
        MatchKind::Exact
    }

    fn source(&self) -> &str {
        &self.literal
    }
}

/// Matches every path starting with a literal prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
    case_insensitive: bool,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>, case_insensitive: bool) -> Self {
        Self {
            prefix: prefix.into(),
            case_insensitive,
        }
    }
}

impl PathMatcher for PathPrefixMatcher {
    fn captures<'p>(&self, path: &'p str) -> Option<PathCaptures<'p>> {
        let matched = if self.case_insensitive {
            path.get(..self.prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(&self.prefix))
        } else {
            path.starts_with(&self.prefix)
        };
        matched.then_some(PathCaptures::Whole(path))
    }

    fn groups(&self) -> Groups {
        Groups { count: 1, names: Vec::new() }
    }

    fn kind(&self) -> MatchKind {
        MatchKind::Prefix
    }

    fn source(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_matches_whole_path_only() {
        let matcher = RegexMatcher::new(r"/rooms/drive/([A-Za-z0-9_-]+)", false).unwrap();

        assert!(matcher.captures("/rooms/drive/abc").is_some());
        assert!(matcher.captures("/prefix/rooms/drive/abc").is_none());
        assert!(matcher.captures("/rooms/drive/abc/extra").is_none());
        assert!(matcher.captures("/rooms/drive/").is_none());
    }

    #[test]
    fn test_regex_alternation_is_anchored_as_a_whole() {
        // Without the group wrapper `^a|b$` would match any path containing a `b`.
        let matcher = RegexMatcher::new("/a|/b", false).unwrap();

        assert!(matcher.captures("/a").is_some());
        assert!(matcher.captures("/b").is_some());
        assert!(matcher.captures("/abc/b").is_none());
    }

    #[test]
    fn test_regex_case_sensitivity() {
        let strict = RegexMatcher::new(r".*\.png", false).unwrap();
        let relaxed = RegexMatcher::new(r".*\.png", true).unwrap();

        assert!(strict.captures("/logo.png").is_some());
        assert!(strict.captures("/logo.PNG").is_none());
        assert!(relaxed.captures("/logo.PNG").is_some());
    }

    #[test]
    fn test_regex_groups() {
        let matcher = RegexMatcher::new(r"/(?P<family>skyway|drive)/(\w+)", false).unwrap();
        let groups = matcher.groups();

        assert_eq!(groups.count, 3);
        assert_eq!(groups.names, vec!["family".to_string()]);
        assert!(groups.contains(&GroupRef::Index(2)));
        assert!(!groups.contains(&GroupRef::Index(3)));
        assert!(groups.contains(&GroupRef::Name("family".into())));
        assert!(!groups.contains(&GroupRef::Name("room".into())));

        let caps = matcher.captures("/drive/doc1").unwrap();
        assert_eq!(caps.get(&GroupRef::Name("family".into())), Some("drive"));
        assert_eq!(caps.get(&GroupRef::Index(2)), Some("doc1"));
    }

    #[test]
    fn test_invalid_regex() {
        assert!(RegexMatcher::new("/rooms/(", false).is_err());
    }

    #[test]
    fn test_exact_matcher() {
        let matcher = ExactMatcher::new("/favicon.ico", false);

        let caps = matcher.captures("/favicon.ico").unwrap();
        assert_eq!(caps.get(&GroupRef::Index(0)), Some("/favicon.ico"));
        assert_eq!(caps.get(&GroupRef::Index(1)), None);
        assert!(matcher.captures("/favicon.ico/x").is_none());
        assert!(matcher.captures("/FAVICON.ICO").is_none());

        let relaxed = ExactMatcher::new("/favicon.ico", true);
        assert!(relaxed.captures("/FAVICON.ICO").is_some());
    }

    #[test]
    fn test_path_prefix_matcher() {
        let matcher = PathPrefixMatcher::new("/api", false);

        assert!(matcher.captures("/api/v1").is_some());
        assert!(matcher.captures("/images").is_none());
        assert!(matcher.captures("/ap").is_none());

        let relaxed = PathPrefixMatcher::new("/api", true);
        assert!(relaxed.captures("/API/v1").is_some());
        // Multi-byte characters straddling the prefix length must not panic.
        assert!(relaxed.captures("/aé").is_none());
    }
}
