//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dev server.
//! All types derive Serde traits for deserialization from config files.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the development server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DevServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Static asset root and public URL prefix.
    pub assets: AssetsConfig,

    /// Ordered rewrite rules applied to every request path.
    pub rewrites: RewriteConfig,

    /// Host header allow-list.
    pub host_check: HostCheckConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Response header defaults.
    pub headers: HeadersConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Inspection endpoints.
    pub admin: AdminConfig,

    /// Per deployment target overrides, selected by name at startup.
    pub environments: BTreeMap<String, EnvironmentConfig>,

    /// Name of the environment applied to this config, if any.
    #[serde(skip)]
    pub environment: Option<String>,
}

impl DevServerConfig {
    /// Return a copy of this config with the named environment's overrides applied.
    ///
    /// Returns `None` if no environment with that name is declared.
    pub fn with_environment(&self, name: &str) -> Option<DevServerConfig> {
        let env = self.environments.get(name)?;
        let mut config = self.clone();

        if let Some(bind_address) = &env.bind_address {
            config.listener.bind_address = bind_address.clone();
        }
        if let Some(directory) = &env.directory {
            config.assets.directory = directory.clone();
        }
        if let Some(public_path) = &env.public_path {
            config.assets.public_path = public_path.clone();
        }
        if let Some(preset) = env.preset {
            config.rewrites.preset = preset;
        }
        if let Some(fallback) = &env.fallback {
            config.rewrites.fallback = fallback.clone();
        }
        if let Some(rules) = &env.rules {
            config.rewrites.rules = rules.clone();
        }
        if let Some(host_check) = &env.host_check {
            config.host_check = host_check.clone();
        }

        config.environment = Some(name.to_string());
        Some(config)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Where static files live and under which URL prefix they are published.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory holding the compiled bundle, the WASM binary and the shell document.
    pub directory: PathBuf,

    /// Public URL prefix. Either a path ("/docs/app/") or an absolute URL,
    /// in which case only its path component is used.
    pub public_path: String,

    /// File served when a target path names a directory.
    pub index_file: String,
}

impl AssetsConfig {
    /// Path component of `public_path`.
    ///
    /// Protocol-relative values (`//cdn.example/app/`) are read as URLs too.
    pub fn public_path_component(&self) -> Cow<'_, str> {
        let parsed = if self.public_path.starts_with("//") {
            url::Url::parse("http://localhost/").and_then(|base| base.join(&self.public_path))
        } else {
            url::Url::parse(&self.public_path)
        };
        match parsed {
            Ok(url) if url.has_host() => Cow::Owned(url.path().to_string()),
            _ => Cow::Borrowed(self.public_path.as_str()),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./assets"),
            public_path: "/".to_string(),
            index_file: "index.html".to_string(),
        }
    }
}

/// Rewrite rule configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Built-in rule list evaluated after the custom rules.
    pub preset: Preset,

    /// Shell path returned when no rule matches.
    pub fallback: String,

    /// Custom rules, evaluated in declared order before the preset.
    pub rules: Vec<RuleConfig>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            preset: Preset::StaticAssets,
            fallback: "/".to_string(),
            rules: Vec::new(),
        }
    }
}

/// Built-in rule lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// No rules: every path falls back to the shell.
    None,
    /// Asset files are re-rooted to their basename.
    #[default]
    StaticAssets,
    /// Skyway and drive room routes, then asset files.
    Rooms,
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::None => f.pad("none"),
            Preset::StaticAssets => f.pad("static-assets"),
            Preset::Rooms => f.pad("rooms"),
        }
    }
}

/// One (pattern, action, parameter) triple.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Rule identifier for logging and error reporting.
    pub name: String,

    /// How `from` is interpreted.
    #[serde(rename = "match", default)]
    pub kind: MatchKind,

    /// Pattern source. Regular expressions are matched against the whole path.
    pub from: String,

    /// What to do with a matching path.
    pub action: ActionKind,

    /// Fixed target or capture template. Not allowed for `pass`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Match letters regardless of case.
    #[serde(default)]
    pub case_insensitive: bool,
}

/// Pattern flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    #[default]
    Regex,
    Exact,
    Prefix,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Regex => f.pad("regex"),
            MatchKind::Exact => f.pad("exact"),
            MatchKind::Prefix => f.pad("prefix"),
        }
    }
}

/// Action flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Rewrite to a fixed target and serve the shell.
    Fixed,
    /// Rewrite using captured groups and serve the result.
    Capture,
    /// Serve the path unchanged.
    Pass,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Fixed => f.pad("fixed"),
            ActionKind::Capture => f.pad("capture"),
            ActionKind::Pass => f.pad("pass"),
        }
    }
}

/// Host header checking.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostCheckConfig {
    /// Reject requests whose Host header is not allowed.
    pub enabled: bool,

    /// Extra host names accepted besides `localhost` and IP literals.
    /// A leading `.` also accepts every subdomain.
    pub allowed_hosts: Vec<String>,
}

impl Default for HostCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_hosts: Vec::new(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Response headers added to every response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeadersConfig {
    /// Send `Cache-Control: no-cache` so rebuilt bundles are always refetched.
    pub no_cache: bool,

    /// Send `X-Content-Type-Options: nosniff`.
    pub nosniff: bool,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            no_cache: true,
            nosniff: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Inspection endpoints configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the inspection endpoints.
    pub enabled: bool,

    /// URL prefix for the endpoints.
    pub prefix: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: "/__devserver".to_string(),
        }
    }
}

/// Overrides for one deployment target (local, staging, production...).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub bind_address: Option<String>,
    pub directory: Option<PathBuf>,
    pub public_path: Option<String>,
    pub preset: Option<Preset>,
    pub fallback: Option<String>,
    pub rules: Option<Vec<RuleConfig>>,
    pub host_check: Option<HostCheckConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: DevServerConfig = toml::from_str("").unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.assets.directory, PathBuf::from("./assets"));
        assert_eq!(config.assets.public_path, "/");
        assert_eq!(config.rewrites.preset, Preset::StaticAssets);
        assert_eq!(config.rewrites.fallback, "/");
        assert!(config.rewrites.rules.is_empty());
        assert!(config.host_check.enabled);
        assert!(config.admin.enabled);
        assert!(config.environment.is_none());
    }

    #[test]
    fn test_parse_rules_in_order() {
        let config: DevServerConfig = toml::from_str(
            r#"
            [rewrites]
            preset = "rooms"

            [[rewrites.rules]]
            name = "legacy"
            from = '/legacy/(.+\.js)'
            action = "capture"
            to = "/${1}"

            [[rewrites.rules]]
            name = "health"
            match = "exact"
            from = "/healthz"
            action = "pass"
            case_insensitive = true
            "#,
        )
        .unwrap();

        assert_eq!(config.rewrites.preset, Preset::Rooms);
        let rules = &config.rewrites.rules;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "legacy");
        assert_eq!(rules[0].kind, MatchKind::Regex);
        assert_eq!(rules[0].action, ActionKind::Capture);
        assert_eq!(rules[0].to.as_deref(), Some("/${1}"));
        assert_eq!(rules[1].kind, MatchKind::Exact);
        assert_eq!(rules[1].action, ActionKind::Pass);
        assert!(rules[1].case_insensitive);
        assert!(rules[1].to.is_none());
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<DevServerConfig, _> = toml::from_str(
            r#"
            [[rewrites.rules]]
            name = "bad"
            from = "/x"
            action = "redirect"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_environment_overrides() {
        let config: DevServerConfig = toml::from_str(
            r#"
            [assets]
            directory = "./assets"

            [environments.staging]
            public_path = "/docs/app/"
            directory = "./bin"
            preset = "none"

            [environments.staging.host_check]
            enabled = false
            "#,
        )
        .unwrap();

        let staging = config.with_environment("staging").unwrap();
        assert_eq!(staging.assets.public_path, "/docs/app/");
        assert_eq!(staging.assets.directory, PathBuf::from("./bin"));
        assert_eq!(staging.rewrites.preset, Preset::None);
        assert!(!staging.host_check.enabled);
        assert_eq!(staging.environment.as_deref(), Some("staging"));

        // Untouched sections keep the base values.
        assert_eq!(staging.listener.bind_address, config.listener.bind_address);
        assert!(config.with_environment("production").is_none());
    }

    #[test]
    fn test_public_path_component() {
        let mut assets = AssetsConfig::default();
        assert_eq!(assets.public_path_component(), "/");

        assets.public_path = "https://docs.example.test/app/".to_string();
        assert_eq!(assets.public_path_component(), "/app/");

        assets.public_path = "/docs/app/".to_string();
        assert_eq!(assets.public_path_component(), "/docs/app/");

        assets.public_path = "//cdn.example.test/app/".to_string();
        assert_eq!(assets.public_path_component(), "/app/");
    }
}
