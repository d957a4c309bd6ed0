//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → host_check.rs (reject disallowed Host headers)
//!     → Pass to routing
//!
//! Outgoing response:
//!     → headers.rs (cache and sniffing headers)
//! ```

pub mod headers;
pub mod host_check;

pub use host_check::{host_check_middleware, HostMatcher, HostPolicy};
