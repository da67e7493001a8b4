//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → routing (clean prefixes, resolve target)
//!     → headers.rs (drop request deny-list)
//!     → dispatch
//!
//! Backend response:
//!     → headers.rs (drop vary, hop-by-hop, response deny-list)
//!     → relay to client
//! ```
//!
//! # Design Decisions
//! - No trust in client tooling headers: they never reach the backend
//! - Stale framing headers are removed, never patched

pub mod headers;

pub use headers::HeaderSanitizer;
