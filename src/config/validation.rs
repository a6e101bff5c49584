//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bind address parses)
//! - Check base URI shape and content type uniqueness
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PionConfig → Result<(), Vec<ValidationError>>
//! - Route patterns are not compiled here; a malformed pattern surfaces
//!   when it is first matched

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::PionConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &PionConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let base_uri = &config.app.base_uri;
    if !base_uri.is_empty() && (!base_uri.starts_with('/') || base_uri.ends_with('/')) {
        errors.push(ValidationError::new(
            "app.base_uri",
            "must be empty or start with '/' and not end with '/'",
        ));
    }
    if config.app.default_extension.is_empty() {
        errors.push(ValidationError::new("app.default_extension", "must not be empty"));
    }
    if matches!(&config.app.not_found, Some(action) if action.trim().is_empty()) {
        errors.push(ValidationError::new("app.not_found", "must not be empty when set"));
    }

    let mut mimes = HashSet::new();
    for (i, ct) in config.content_types.iter().enumerate() {
        if ct.mime.is_empty() || ct.extension.is_empty() {
            errors.push(ValidationError::new(
                format!("content_types[{i}]"),
                "mime and extension must not be empty",
            ));
        }
        if !mimes.insert(ct.mime.to_ascii_lowercase()) {
            errors.push(ValidationError::new(
                format!("content_types[{i}].mime"),
                format!("'{}' is mapped more than once", ct.mime),
            ));
        }
    }

    for (i, route) in config.routes.iter().enumerate() {
        if route.pattern.is_empty() {
            errors.push(ValidationError::new(format!("routes[{i}].pattern"), "must not be empty"));
        }
        if route.action.trim().is_empty() {
            errors.push(ValidationError::new(format!("routes[{i}].action"), "must not be empty"));
        }
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
    use crate::config::schema::{ContentTypeConfig, RouteConfig, RouteMethod};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&PionConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = PionConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.app.base_uri = "shop/".into();
        config.routes.push(RouteConfig {
            method: RouteMethod::Get,
            pattern: String::new(),
            action: " ".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "timeouts.request_secs",
                "app.base_uri",
                "routes[0].pattern",
                "routes[0].action",
            ]
        );
    }

    #[test]
    fn test_duplicate_content_type() {
        let mut config = PionConfig::default();
        for _ in 0..2 {
            config.content_types.push(ContentTypeConfig {
                mime: "text/csv".into(),
                extension: "csv".into(),
            });
        }
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "content_types[1].mime");
    }

    #[test]
    fn test_malformed_pattern_is_not_rejected_here() {
        let mut config = PionConfig::default();
        config.routes.push(RouteConfig {
            method: RouteMethod::Get,
            pattern: "/broken(".into(),
            action: "Home".into(),
        });
        assert!(validate_config(&config).is_ok());
    }
}
