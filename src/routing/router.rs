//! Path classification.
//!
//! # Responsibilities
//! - Strip the public path prefix from incoming paths
//! - Evaluate the rule set in declared order
//! - Return a decision: serve a (possibly rewritten) path, or fall back to the shell
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over rules, first match wins
//! - No match is not an error: it resolves to the default shell path

use serde::Serialize;

use crate::config::DevServerConfig;
use crate::routing::presets::expand_rules;
use crate::routing::rule::{RuleSet, RuleSetError};

/// Outcome of classifying one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "target", rename_all = "lowercase")]
pub enum Resolution {
    /// Serve this path from the asset root.
    Serve(String),
    /// Serve the shell document found at this path.
    Fallback(String),
}

impl Resolution {
    /// Path to look up under the asset root.
    pub fn target(&self) -> &str {
        match self {
            Resolution::Serve(path) | Resolution::Fallback(path) => path,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback(_))
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Serve(_) => "serve",
            Resolution::Fallback(_) => "fallback",
        }
    }
}

/// A resolution plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision<'r> {
    pub resolution: Resolution,
    /// `None` when no rule matched.
    pub rule: Option<&'r str>,
}

/// Public URL prefix the application is mounted under.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BasePath {
    /// Without trailing slash; empty for the root.
    prefix: String,
}

impl BasePath {
    pub fn new(public_path: &str) -> Self {
        Self {
            prefix: public_path.trim_end_matches('/').to_string(),
        }
    }

    /// Remove the prefix from `path`. Paths outside the prefix are returned unchanged.
    pub fn strip<'p>(&self, path: &'p str) -> &'p str {
        if self.prefix.is_empty() {
            return path;
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }

    /// Prefix as a rooted path, always ending in `/`.
    pub fn as_public_path(&self) -> String {
        format!("{}/", self.prefix)
    }
}

/// Classifies request paths against an ordered rule set.
#[derive(Debug)]
pub struct Resolver {
    rules: RuleSet,
    base_path: BasePath,
    fallback: String,
}

impl Resolver {
    pub fn new(rules: RuleSet, base_path: BasePath, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            base_path,
            fallback: fallback.into(),
        }
    }

    /// Build the resolver for a config: custom rules, preset rules, public path and fallback.
    pub fn from_config(config: &DevServerConfig) -> Result<Self, RuleSetError> {
        let rules = RuleSet::compile(&expand_rules(&config.rewrites))?;
        let base_path = BasePath::new(&config.assets.public_path_component());
        Ok(Self::new(rules, base_path, config.rewrites.fallback.clone()))
    }

    /// Classify a decoded path (no query string).
    pub fn classify(&self, path: &str) -> Decision<'_> {
        let path = self.base_path.strip(path);

        for rule in self.rules.iter() {
            if let Some(resolution) = rule.apply(path) {
                return Decision {
                    resolution,
                    rule: Some(rule.name()),
                };
            }
        }

        Decision {
            resolution: Resolution::Fallback(self.fallback.clone()),
            rule: None,
        }
    }

    pub fn resolve(&self, path: &str) -> Resolution {
        self.classify(path).resolution
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn base_path(&self) -> &BasePath {
        &self.base_path
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}
