//! Host header checking.
//!
//! A dev server bound to a public interface can be reached through DNS
//! rebinding; requests are only answered when the Host header names the
//! machine itself or a host from the allow-list.
//!
//! # Design Decisions
//! - Host matching is case-insensitive and ignores the port
//! - `localhost`, `*.localhost` and IP literals are always accepted
//! - A leading `.` in the allow-list accepts the domain and all its subdomains
//! - Disabled check = every host accepted

use std::net::IpAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::HostCheckConfig;

/// Matches one allowed host name.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
    include_subdomains: bool,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into().to_lowercase();
        match host.strip_prefix('.') {
            Some(domain) => Self {
                expected_host: domain.to_string(),
                include_subdomains: true,
            },
            None => Self {
                expected_host: host,
                include_subdomains: false,
            },
        }
    }

    /// `host` must already be lowercase and stripped of its port.
    pub fn matches(&self, host: &str) -> bool {
        if host == self.expected_host {
            return true;
        }
        self.include_subdomains
            && host
                .strip_suffix(self.expected_host.as_str())
                .is_some_and(|sub| sub.ends_with('.'))
    }
}

/// Host allow-list built from configuration.
#[derive(Debug, Clone)]
pub struct HostPolicy {
    enabled: bool,
    allowed: Vec<HostMatcher>,
}

impl HostPolicy {
    pub fn from_config(config: &HostCheckConfig) -> Self {
        Self {
            enabled: config.enabled,
            allowed: config.allowed_hosts.iter().map(HostMatcher::new).collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a request carrying this Host value may be answered.
    pub fn allows(&self, host: Option<&str>) -> bool {
        if !self.enabled {
            return true;
        }
        let Some(host) = host else {
            return false;
        };

        let name = host_name(host).trim_end_matches('.').to_lowercase();
        if name == "localhost" || name.ends_with(".localhost") || name.parse::<IpAddr>().is_ok() {
            return true;
        }
        self.allowed.iter().any(|m| m.matches(&name))
    }
}

/// Strip the port from a Host header value, unwrapping bracketed IPv6 literals.
fn host_name(host: &str) -> &str {
    if let Some(bracketed) = host.strip_prefix('[') {
        return bracketed.split(']').next().unwrap_or(bracketed);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

pub async fn host_check_middleware(
    State(policy): State<Arc<HostPolicy>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().host());

    if policy.allows(host) {
        return next.run(req).await;
    }

    tracing::warn!(
        host = ?host,
        path = %req.uri().path(),
        "Rejected request with disallowed Host header"
    );
    (StatusCode::FORBIDDEN, "Invalid Host header").into_response()
}
