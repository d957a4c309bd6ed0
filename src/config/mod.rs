//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! devserver.toml
//!     → loader.rs (parse & deserialize)
//!     → schema.rs (select environment overrides)
//!     → validation.rs (semantic checks, rule compilation)
//!     → DevServerConfig (validated, immutable)
//!     → used once to build the resolver and the HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::DevServerConfig;
pub use schema::{ActionKind, MatchKind, Preset, RuleConfig};
pub use schema::{AdminConfig, AssetsConfig, HostCheckConfig, ListenerConfig, RewriteConfig};
