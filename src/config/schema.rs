//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a Pion
//! application. All types derive Serde traits for deserialization from
//! TOML files, and every section has defaults so a minimal file works.

use serde::{Deserialize, Serialize};

use crate::routing::HttpMethod;
use crate::view::ContentTypeTable;

/// Root configuration for a Pion application.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PionConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Application settings (base URI, views, not-found action).
    pub app: AppConfig,

    /// MIME to extension mappings replacing the built-in table. Empty keeps it.
    pub content_types: Vec<ContentTypeConfig>,

    /// Routes bound to controller references.
    pub routes: Vec<RouteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl PionConfig {
    /// Negotiation table for this configuration.
    pub fn content_type_table(&self) -> ContentTypeTable {
        if self.content_types.is_empty() {
            return ContentTypeTable::default();
        }
        ContentTypeTable::from_pairs(
            self.content_types
                .iter()
                .map(|ct| (ct.mime.clone(), ct.extension.clone())),
        )
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one request, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Deployment environment. Controls how much error detail reaches clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Application settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for every route pattern and redirect. Empty or `/segment`.
    pub base_uri: String,

    /// Directory template lookups are relative to.
    pub view_dir: String,

    /// Layout view rendered at the end of a cycle.
    pub base_view: String,

    /// Extension used when the client states no usable preference.
    pub default_extension: String,

    /// Controller reference dispatched when no route matches.
    pub not_found: Option<String>,

    pub environment: Environment,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_uri: String::new(),
            view_dir: "views".to_string(),
            base_view: "index".to_string(),
            default_extension: "html".to_string(),
            not_found: None,
            environment: Environment::Development,
        }
    }
}

/// One MIME type to view extension mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentTypeConfig {
    pub mime: String,
    pub extension: String,
}

/// Method selector for a configured route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Delete,
    /// Registers the route under every method.
    Any,
}

impl RouteMethod {
    pub fn methods(self) -> Vec<HttpMethod> {
        match self {
            RouteMethod::Get => vec![HttpMethod::Get],
            RouteMethod::Post => vec![HttpMethod::Post],
            RouteMethod::Put => vec![HttpMethod::Put],
            RouteMethod::Delete => vec![HttpMethod::Delete],
            RouteMethod::Any => HttpMethod::ALL.to_vec(),
        }
    }
}

/// Route configuration mapping a pattern to a controller reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    pub method: RouteMethod,

    /// Regex fragment appended to the base URI (e.g., `/items/(?P<id>\d+)`).
    pub pattern: String,

    /// Controller reference, `Name` or `Name:method`.
    pub action: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "pion=debug,tower_http=debug".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: PionConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.listener.max_body_bytes, 1024 * 1024);
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.app.view_dir, "views");
        assert_eq!(config.app.base_view, "index");
        assert_eq!(config.app.default_extension, "html");
        assert_eq!(config.app.environment, Environment::Development);
        assert!(config.routes.is_empty());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_any_route_expands_to_every_method() {
        assert_eq!(RouteMethod::Any.methods(), HttpMethod::ALL.to_vec());
        assert_eq!(RouteMethod::Put.methods(), vec![HttpMethod::Put]);
    }

    #[test]
    fn test_routes_and_content_types_parse() {
        let config: PionConfig = toml::from_str(
            r#"
            [app]
            base_uri = "/shop"
            environment = "production"

            [[content_types]]
            mime = "text/csv"
            extension = "csv"

            [[routes]]
            method = "ANY"
            pattern = '/products(?:/(?P<id>\d+))?'
            action = "Product"
            "#,
        )
        .unwrap();

        assert_eq!(config.app.base_uri, "/shop");
        assert_eq!(config.app.environment, Environment::Production);
        assert_eq!(config.content_types[0].extension, "csv");
        assert_eq!(config.routes[0].method, RouteMethod::Any);
        assert_eq!(config.routes[0].action, "Product");
    }

    #[test]
    fn test_content_type_table_follows_config() {
        let builtin = PionConfig::default().content_type_table();
        assert_eq!(builtin.extension_for("application/json"), Some("js"));

        let config: PionConfig = toml::from_str(
            r#"
            [[content_types]]
            mime = "text/csv"
            extension = "csv"
            "#,
        )
        .unwrap();
        let table = config.content_type_table();
        let preferences = table.negotiate(Some("text/csv, application/json"));
        assert_eq!(preferences.len(), 1);
        assert_eq!(preferences[0].extension, "csv");
        assert_eq!(table.extension_for("application/json"), None);
    }
}
