//! Forwarding HTTP proxy library.
//!
//! Accepts requests that carry their real destination (a `target=`
//! parameter, a relative path for the default backend, or an absolute
//! URL), strips proxy artifacts, forwards the rewritten request and relays
//! the response. Selected requests are logged together with a `curl`
//! command that reproduces them.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
