//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every rewrite rule once so bad patterns fail before the server binds
//! - Validate value ranges (timeouts > 0, addresses parse, paths are rooted)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DevServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DevServerConfig;
use crate::routing::presets::expand_rules;
use crate::routing::rule::{RuleError, RuleSet};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("assets.public_path `{0}` must be a URL or a path starting with a single `/`")]
    InvalidPublicPath(String),

    #[error("assets.index_file `{0}` must be a plain file name")]
    InvalidIndexFile(String),

    #[error("rewrites.fallback `{0}` must start with `/`")]
    InvalidFallback(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("admin.prefix `{0}` must start with `/` and name a sub-path")]
    InvalidAdminPrefix(String),

    #[error("rule name `{0}` is declared more than once")]
    DuplicateRuleName(String),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &DevServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let public_path = config.assets.public_path_component();
    if !public_path.starts_with('/') || public_path.starts_with("//") {
        errors.push(ValidationError::InvalidPublicPath(
            config.assets.public_path.clone(),
        ));
    }

    let index_file = config.assets.index_file.as_str();
    if index_file.is_empty()
        || index_file == "."
        || index_file == ".."
        || index_file.contains(['/', '\\'])
    {
        errors.push(ValidationError::InvalidIndexFile(index_file.to_string()));
    }

    if !config.rewrites.fallback.starts_with('/') {
        errors.push(ValidationError::InvalidFallback(
            config.rewrites.fallback.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.admin.enabled {
        let prefix = config.admin.prefix.as_str();
        if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
            errors.push(ValidationError::InvalidAdminPrefix(prefix.to_string()));
        }
    }

    let rules = expand_rules(&config.rewrites);

    let mut seen = HashSet::new();
    for rule in &rules {
        if !rule.name.is_empty() && !seen.insert(rule.name.as_str()) {
            errors.push(ValidationError::DuplicateRuleName(rule.name.clone()));
        }
    }

    if let Err(e) = RuleSet::compile(&rules) {
        errors.extend(e.errors.into_iter().map(ValidationError::Rule));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ActionKind, MatchKind, RuleConfig};

    fn rule(name: &str, from: &str, action: ActionKind, to: Option<&str>) -> RuleConfig {
        RuleConfig {
            name: name.to_string(),
            kind: MatchKind::Regex,
            from: from.to_string(),
            action,
            to: to.map(str::to_string),
            case_insensitive: false,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&DevServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = DevServerConfig::default();
        config.listener.bind_address = "localhost".to_string();
        config.assets.public_path = "app/".to_string();
        config.assets.index_file = "../index.html".to_string();
        config.rewrites.fallback = "index.html".to_string();
        config.timeouts.request_secs = 0;
        config.admin.prefix = "/".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(matches!(errors[0], ValidationError::InvalidBindAddress(_)));
        assert!(matches!(errors[5], ValidationError::InvalidAdminPrefix(_)));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = DevServerConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidMetricsAddress(_)));
    }

    #[test]
    fn test_duplicate_rule_names() {
        let mut config = DevServerConfig::default();
        config.rewrites.rules = vec![
            rule("app", "/a", ActionKind::Pass, None),
            rule("app", "/b", ActionKind::Pass, None),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::DuplicateRuleName(ref n) if n == "app"));
    }

    #[test]
    fn test_rule_errors_name_the_rule() {
        let mut config = DevServerConfig::default();
        config.rewrites.rules = vec![
            rule("ok", "/a", ActionKind::Pass, None),
            rule("needs-group-two", "/(a)", ActionKind::Capture, Some("/$2")),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        let message = errors[0].to_string();
        assert!(message.contains("#1"), "{message}");
        assert!(message.contains("needs-group-two"), "{message}");
    }

    #[test]
    fn test_absolute_public_url_is_accepted() {
        let mut config = DevServerConfig::default();
        config.assets.public_path = "https://docs.example.test/app/".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_protocol_relative_public_path() {
        let mut config = DevServerConfig::default();
        config.assets.public_path = "//cdn.example.test/app/".to_string();
        assert!(validate_config(&config).is_ok());

        config.assets.public_path = "//".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidPublicPath(_)));
    }
}
