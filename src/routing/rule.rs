//! Rewrite rules and ordered rule sets.
//!
//! # Responsibilities
//! - Compile one configured (pattern, action, parameter) triple into a `Rule`
//! - Reject rules whose template refers to groups the pattern does not define
//! - Keep rules in declared order for first-match evaluation

use thiserror::Error;

use crate::config::{ActionKind, MatchKind, RuleConfig};
use crate::routing::matcher::{ExactMatcher, PathMatcher, PathPrefixMatcher, RegexMatcher};
use crate::routing::router::Resolution;
use crate::routing::template::Template;

/// What a matching rule does with the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Serve the shell through a fixed target. Captures are discarded.
    RewriteToFixed(String),
    /// Serve the path produced by substituting captures into the template.
    RewriteUsingCapture(Template),
    /// Serve the path unchanged.
    PassThrough,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::RewriteToFixed(_) => ActionKind::Fixed,
            Action::RewriteUsingCapture(_) => ActionKind::Capture,
            Action::PassThrough => ActionKind::Pass,
        }
    }

    /// Fixed target or template source.
    pub fn target(&self) -> Option<&str> {
        match self {
            Action::RewriteToFixed(target) => Some(target),
            Action::RewriteUsingCapture(template) => Some(template.as_str()),
            Action::PassThrough => None,
        }
    }
}

/// A rule that failed to compile.
#[derive(Debug, Clone, Error)]
#[error("rule #{index} `{name}`: {kind}")]
pub struct RuleError {
    /// Position in evaluation order.
    pub index: usize,
    pub name: String,
    pub kind: RuleErrorKind,
}

#[derive(Debug, Clone, Error)]
pub enum RuleErrorKind {
    #[error("rule name must not be empty")]
    EmptyName,

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("action `{0}` requires `to`")]
    MissingTarget(ActionKind),

    #[error("action `pass` does not take `to`")]
    UnexpectedTarget,

    #[error("target `{0}` must start with `/`")]
    UnrootedTarget(String),

    #[error("template refers to {group} but the pattern defines no such group")]
    UnknownGroup { group: String },
}

/// A compiled match + action pair.
#[derive(Debug)]
pub struct Rule {
    name: String,
    matcher: Box<dyn PathMatcher>,
    action: Action,
}

impl Rule {
    pub fn new(name: impl Into<String>, matcher: Box<dyn PathMatcher>, action: Action) -> Self {
        Self {
            name: name.into(),
            matcher,
            action,
        }
    }

    /// Compile a configured rule; `index` is its position in evaluation order.
    pub fn compile(index: usize, config: &RuleConfig) -> Result<Self, RuleError> {
        let fail = |kind| RuleError {
            index,
            name: config.name.clone(),
            kind,
        };

        if config.name.trim().is_empty() {
            return Err(fail(RuleErrorKind::EmptyName));
        }

        let matcher: Box<dyn PathMatcher> = match config.kind {
            MatchKind::Regex => Box::new(
                RegexMatcher::new(config.from.clone(), config.case_insensitive)
                    .map_err(|e| fail(RuleErrorKind::InvalidPattern(e)))?,
            ),
            MatchKind::Exact => Box::new(ExactMatcher::new(
                config.from.clone(),
                config.case_insensitive,
            )),
            MatchKind::Prefix => Box::new(PathPrefixMatcher::new(
                config.from.clone(),
                config.case_insensitive,
            )),
        };

        let action = match (config.action, config.to.as_deref()) {
            (ActionKind::Pass, None) => Action::PassThrough,
            (ActionKind::Pass, Some(_)) => return Err(fail(RuleErrorKind::UnexpectedTarget)),
            (kind, None) => return Err(fail(RuleErrorKind::MissingTarget(kind))),
            (_, Some(to)) if !to.starts_with('/') => {
                return Err(fail(RuleErrorKind::UnrootedTarget(to.to_string())))
            }
            (ActionKind::Fixed, Some(to)) => Action::RewriteToFixed(to.to_string()),
            (ActionKind::Capture, Some(to)) => {
                let template = Template::parse(to);
                let groups = matcher.groups();
                if let Some(missing) = template.groups().find(|g| !groups.contains(g)) {
                    return Err(fail(RuleErrorKind::UnknownGroup {
                        group: missing.to_string(),
                    }));
                }
                Action::RewriteUsingCapture(template)
            }
        };

        Ok(Self::new(config.name.clone(), matcher, action))
    }

    /// Apply the rule to `path`; `None` if the pattern does not match.
    pub fn apply(&self, path: &str) -> Option<Resolution> {
        let captures = self.matcher.captures(path)?;
        let resolution = match &self.action {
            Action::RewriteToFixed(target) => Resolution::Fallback(target.clone()),
            Action::RewriteUsingCapture(template) => Resolution::Serve(template.expand(&captures)),
            Action::PassThrough => Resolution::Serve(path.to_string()),
        };
        Some(resolution)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matcher(&self) -> &dyn PathMatcher {
        self.matcher.as_ref()
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

/// Every rule that failed to compile.
#[derive(Debug, Clone, Error)]
#[error("{} invalid rewrite rule(s): {}", .errors.len(), join_errors(.errors))]
pub struct RuleSetError {
    pub errors: Vec<RuleError>,
}

fn join_errors(errors: &[RuleError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Ordered, immutable sequence of rules. First match wins.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile configured rules in order, reporting every failure.
    pub fn compile(configs: &[RuleConfig]) -> Result<Self, RuleSetError> {
        let mut rules = Vec::with_capacity(configs.len());
        let mut errors = Vec::new();

        for (index, config) in configs.iter().enumerate() {
            match Rule::compile(index, config) {
                Ok(rule) => rules.push(rule),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(Self { rules })
        } else {
            Err(RuleSetError { errors })
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
