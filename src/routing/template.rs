//! Rewrite templates.
//!
//! A template is literal text with group references substituted from a match:
//! `$1`, `${1}`, `$name`, `${name}`. `$$` is a literal dollar sign, and a `$`
//! that does not start a reference is kept as is. A reference to a group that
//! did not take part in the match expands to the empty string.

use std::fmt;

use crate::routing::matcher::PathCaptures;

/// Reference to a capture group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Index(usize),
    Name(String),
}

impl GroupRef {
    fn from_token(token: &str) -> Self {
        token
            .parse::<usize>()
            .map(GroupRef::Index)
            .unwrap_or_else(|_| GroupRef::Name(token.to_string()))
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRef::Index(i) => write!(f, "${}", i),
            GroupRef::Name(name) => write!(f, "${{{}}}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Group(GroupRef),
}

/// A parsed rewrite template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source.as_str();

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            rest = &rest[pos + 1..];

            if let Some(after) = rest.strip_prefix('$') {
                literal.push('$');
                rest = after;
                continue;
            }

            match group_ref(rest) {
                Some((group, consumed)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Group(group));
                    rest = &rest[consumed..];
                }
                None => literal.push('$'),
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { source, segments }
    }

    /// Every group the template refers to, in order of appearance.
    pub fn groups(&self) -> impl Iterator<Item = &GroupRef> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Group(group) => Some(group),
            Segment::Literal(_) => None,
        })
    }

    pub fn expand(&self, captures: &PathCaptures<'_>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Group(group) => out.push_str(captures.get(group).unwrap_or_default()),
            }
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Parse the reference following a `$`. Returns the reference and the bytes consumed.
fn group_ref(input: &str) -> Option<(GroupRef, usize)> {
    if let Some(braced) = input.strip_prefix('{') {
        let end = braced.find('}')?;
        let token = &braced[..end];
        if token.is_empty() {
            return None;
        }
        return Some((GroupRef::from_token(token), end + 2));
    }

    let end = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    Some((GroupRef::from_token(&input[..end]), end))
}
