//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → tracing spans (tower-http TraceLayer)
//!     → metrics.rs (counters, histograms)
//!
//! Requests whose URL matches a logging substring:
//!     → logging.rs (LogRecord → text block)
//!     → command.rs (curl reproduction appended to the block)
//!     → LogSink (console via tracing)
//! ```
//!
//! # Design Decisions
//! - The request log is human-oriented plain text, not JSON
//! - Metrics are optional and off by default

pub mod command;
pub mod logging;
pub mod metrics;

pub use command::{escape_shell, to_curl_command};
pub use logging::{init_tracing, LogRecord, LogSink, MemorySink, RequestLogger, TracingSink};
