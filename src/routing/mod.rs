//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming path (decoded, no query string)
//!     → router.rs (strip public path, scan rules in order)
//!     → rule.rs (first rule whose matcher accepts the whole path)
//!     → matcher.rs (regex / exact / prefix test, captures)
//!     → template.rs (substitute captures for capture rewrites)
//!     → Return: Serve(path) or Fallback(shell)
//!
//! Rule Compilation (at startup):
//!     RuleConfig[] (custom rules, then presets.rs)
//!     → Compile matchers and templates
//!     → Freeze as immutable RuleSet
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Bad patterns and bad template groups are startup errors, never request errors
//! - Deterministic: same input always yields the same decision
//! - First match wins (declared order)

pub mod matcher;
pub mod presets;
pub mod router;
pub mod rule;
pub mod template;

pub use router::{BasePath, Decision, Resolution, Resolver};
pub use rule::{Action, Rule, RuleError, RuleSet, RuleSetError};
