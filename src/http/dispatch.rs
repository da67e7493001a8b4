//! Outbound dispatch.
//!
//! Sends a [`ForwardPlan`] to its target with `reqwest` and hands back the
//! raw response. TLS or plaintext follows the target's scheme. Redirects
//! are not followed and environment proxies are ignored: the backend's
//! answer is relayed as-is.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderValue};

use crate::config::ClientConfig;
use crate::error::{ProxyError, Result};
use crate::http::request::{ForwardPlan, PlanBody};

/// Performs the network round trip for a forward plan.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new(config: &ClientConfig) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    /// Send `plan` and return the backend's response, body unread.
    pub async fn dispatch(&self, plan: ForwardPlan) -> Result<reqwest::Response> {
        let (method, target, mut headers, body) = plan.into_parts();

        let body = match body {
            PlanBody::Buffered(bytes) => reqwest::Body::from(bytes),
            PlanBody::Streamed { length: Some(0), .. } => reqwest::Body::from(Bytes::new()),
            PlanBody::Streamed { body, length } => {
                if let Some(length) = length {
                    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
                }
                reqwest::Body::wrap_stream(body.into_data_stream())
            }
        };

        tracing::debug!(
            method = %method,
            target = %target,
            https = target.is_https(),
            "Dispatching request"
        );

        self.client
            .request(method, target.url().clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|source| ProxyError::Dispatch {
                target: target.to_string(),
                source,
            })
    }
}
