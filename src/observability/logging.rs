//! Structured logging and the request log.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber
//! - Decide per request whether it is logged
//! - Render and emit the request log block
//!
//! # Design Decisions
//! - Log level from `RUST_LOG`, falling back to the configured level
//! - The request log is a plain-text block bracketed by fixed markers so it
//!   is easy to spot and copy from a console
//! - Blocks go through a [`LogSink`] so tests can capture them

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, Method};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::RequestLogConfig;
use crate::observability::command::to_curl_command;
use crate::routing::ResolvedTarget;

pub const BLOCK_START: &str = "************ NEW REQUEST TO LOG ************";
pub const BLOCK_END: &str = "************ NEW REQUEST LOGGING DONE ************";

/// Install the global tracing subscriber.
pub fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("forward_proxy={log_level},tower_http={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// One logged request. Built once, emitted once.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// UTC, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub target: String,
    pub method: String,
    /// Duplicate names are joined with `, `.
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl LogRecord {
    pub fn new(target: &ResolvedTarget, method: &Method, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers.iter() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            map.entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Self {
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            target: target.to_string(),
            method: method.to_string(),
            headers: map,
            body: if body.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(body).into_owned())
            },
        }
    }

    /// Render the console block, `command` included.
    pub fn render(&self, command: &str) -> String {
        let headers = serde_json::to_string_pretty(&self.headers).unwrap_or_default();
        let body = self.body.as_deref().unwrap_or("null");

        let mut out = String::new();
        out.push_str(BLOCK_START);
        out.push('\n');
        out.push_str(&format!("Time: {}\n", self.timestamp));
        out.push_str(&format!("URL: {}\n", self.target));
        out.push_str(&format!("Method: {}\n", self.method));
        out.push_str(&format!("Headers: {}\n", headers));
        out.push_str(&format!("Body: {}\n", body));
        out.push_str(&format!("Proxying to: {}\n", self.target));
        out.push('\n');
        out.push_str("CURL command:\n");
        out.push_str(command);
        out.push('\n');
        out.push_str(BLOCK_END);
        out.push('\n');
        out
    }
}

/// Destination of rendered log blocks.
pub trait LogSink: Send + Sync + std::fmt::Debug {
    fn write_block(&self, block: &str);
}

/// Writes blocks to the console through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_block(&self, block: &str) {
        tracing::info!(target: "forward_proxy::request_log", "\n{}", block);
    }
}

/// Keeps blocks in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Vec<String> {
        self.blocks.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn write_block(&self, block: &str) {
        if let Ok(mut blocks) = self.blocks.lock() {
            blocks.push(block.to_string());
        }
    }
}

/// Decides which requests are logged and writes their blocks.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    path_substrings: Vec<String>,
    sink: Arc<dyn LogSink>,
}

impl RequestLogger {
    pub fn new(path_substrings: Vec<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            path_substrings,
            sink,
        }
    }

    pub fn from_config(config: &RequestLogConfig, sink: Arc<dyn LogSink>) -> Self {
        Self::new(config.path_substrings.clone(), sink)
    }

    /// True iff `url` contains any configured substring.
    pub fn should_log(&self, url: &str) -> bool {
        self.path_substrings.iter().any(|s| url.contains(s.as_str()))
    }

    /// Emit one block for `record`, with the command for the forwarded
    /// request (`forwarded_headers` are the sanitized ones).
    pub fn emit(&self, record: &LogRecord, forwarded_headers: &HeaderMap) {
        let method = record.method.parse::<Method>().unwrap_or(Method::GET);
        let command = to_curl_command(
            &method,
            &record.target,
            forwarded_headers,
            record.body.as_deref(),
        );
        self.sink.write_block(&record.render(&command));
    }
}
