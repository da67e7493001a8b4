//! Target routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request URL
//!     → cleaner.rs (strip proxy prefixes from URL, headers, body)
//!     → resolver.rs (embedded target / default backend / absolute)
//!     → ResolvedTarget (absolute, scheme + host present)
//! ```
//!
//! # Design Decisions
//! - Prefix stripping is literal and unanchored
//! - Resolution rules have a fixed priority order, tested one by one
//! - Every resolved target is re-parsed, so a target without scheme or
//!   host never reaches the dispatcher

pub mod cleaner;
pub mod resolver;

pub use cleaner::UrlCleaner;
pub use resolver::{Resolution, ResolvedTarget, TargetResolver};
