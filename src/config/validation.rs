//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the two listener ports do not collide
//! - Check upstream hosts form valid URLs under the configured scheme
//! - Validate value ranges (timeouts > 0, connection limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: MirrorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::MirrorConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "listener.desktop_port").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &MirrorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_host.is_empty() {
        push(&mut errors, "listener.bind_host", "must not be empty");
    }
    if config.listener.desktop_port == config.listener.mobile_port {
        push(
            &mut errors,
            "listener.mobile_port",
            "desktop and mobile listeners must use distinct ports",
        );
    }
    if config.listener.max_connections == 0 {
        push(&mut errors, "listener.max_connections", "must be greater than zero");
    }

    match config.upstream.scheme.as_str() {
        "http" | "https" => {}
        other => push(
            &mut errors,
            "upstream.scheme",
            &format!("must be \"http\" or \"https\", got \"{}\"", other),
        ),
    }
    check_host(&mut errors, "upstream.desktop_host", &config.upstream.scheme, &config.upstream.desktop_host);
    check_host(&mut errors, "upstream.mobile_host", &config.upstream.scheme, &config.upstream.mobile_host);
    if !config.upstream.desktop_host.is_empty()
        && config.upstream.desktop_host == config.upstream.mobile_host
    {
        push(
            &mut errors,
            "upstream.mobile_host",
            "desktop and mobile upstream hosts must differ",
        );
    }

    if config.timeouts.connect_secs == 0 {
        push(&mut errors, "timeouts.connect_secs", "must be greater than zero");
    }
    if config.timeouts.upstream_secs == 0 {
        push(&mut errors, "timeouts.upstream_secs", "must be greater than zero");
    }
    if config.timeouts.client_io_secs == 0 {
        push(&mut errors, "timeouts.client_io_secs", "must be greater than zero");
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        push(
            &mut errors,
            "observability.metrics_address",
            "must be a valid socket address when metrics are enabled",
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_host(errors: &mut Vec<ValidationError>, field: &str, scheme: &str, host: &str) {
    if host.is_empty() {
        push(errors, field, "must not be empty");
        return;
    }
    if host.contains('/') || host.contains(char::is_whitespace) {
        push(errors, field, "must be a bare authority without path or whitespace");
        return;
    }
    let scheme = if scheme.is_empty() { "https" } else { scheme };
    if Url::parse(&format!("{}://{}/", scheme, host)).is_err() {
        push(errors, field, "is not a valid host");
    }
}

fn push(errors: &mut Vec<ValidationError>, field: &str, message: &str) {
    errors.push(ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    });
}
