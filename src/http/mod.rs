//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, single catch-all handler)
//!     → request.rs (clean URL + headers, choose body strategy, ForwardPlan)
//!     → dispatch.rs (reqwest round trip, TLS by target scheme)
//!     → response.rs (response deny-list, stream body back)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::Dispatcher;
pub use request::{BodyStrategy, ForwardPlan, IncomingRequest, PlanBody};
pub use response::relay_response;
pub use server::{AppState, HttpServer};
