//! Configuration validation.
//!
//! Serde handles the syntax; this module checks values that parse but make
//! no sense (unparseable addresses, a relative default backend). Every
//! problem is collected so a broken file is reported in one pass.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("rewrite.default_backend '{0}' must be an absolute http(s) URL with a host")]
    DefaultBackend(String),

    #[error("rewrite.proxy_host must not be empty")]
    EmptyProxyHost,

    #[error("request_log.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a parsed configuration, returning every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let backend_ok = Url::parse(&config.rewrite.default_backend)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false);
    if !backend_ok {
        errors.push(ValidationError::DefaultBackend(
            config.rewrite.default_backend.clone(),
        ));
    }

    if config.rewrite.proxy_host.trim().is_empty() {
        errors.push(ValidationError::EmptyProxyHost);
    }

    if config.request_log.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.rewrite.default_backend = "/relative".into();
        config.rewrite.proxy_host = "  ".into();
        config.request_log.max_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyProxyHost));
        assert!(errors.contains(&ValidationError::ZeroBodyLimit));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MetricsAddress("nope".into())]);
    }

    #[test]
    fn test_default_backend_requires_http_scheme() {
        let mut config = ProxyConfig::default();
        config.rewrite.default_backend = "ftp://files.test".into();
        assert!(validate_config(&config).is_err());

        config.rewrite.default_backend = "https://api.test:8443".into();
        assert!(validate_config(&config).is_ok());
    }
}
