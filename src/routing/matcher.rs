//! Route pattern matching.
//!
//! # Responsibilities
//! - Anchor a pattern to the full path: `^{base_uri}{pattern}/?$`
//! - Compile lazily on first match attempt and cache the result
//! - Extract named and positional captures as path arguments
//!
//! # Design Decisions
//! - Patterns are not validated at registration; a bad pattern surfaces as
//!   `MalformedRoute` the first time a request reaches it
//! - The base URI is escaped, the pattern is used as written
//! - A trailing slash is always optional
//! - Groups that did not participate in the match are left out

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::DispatchError;

/// A route pattern with its lazily compiled, anchored regex.
#[derive(Debug)]
pub struct RoutePattern {
    source: String,
    compiled: OnceLock<Result<Regex, regex::Error>>,
}

impl RoutePattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    /// The pattern as registered, without anchoring.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Drop the compiled form so the next match recompiles.
    pub(crate) fn reset(&mut self) {
        self.compiled.take();
    }

    fn regex(&self, base_uri: &str) -> Result<&Regex, DispatchError> {
        self.compiled
            .get_or_init(|| Regex::new(&anchor(base_uri, &self.source)))
            .as_ref()
            .map_err(|e| DispatchError::MalformedRoute {
                pattern: self.source.clone(),
                source: e.clone(),
            })
    }

    /// Match `path` in full. Returns the captures on success.
    pub fn captures(
        &self,
        base_uri: &str,
        path: &str,
    ) -> Result<Option<PathArgs>, DispatchError> {
        let regex = self.regex(base_uri)?;
        let Some(caps) = regex.captures(path) else {
            return Ok(None);
        };

        let mut args = PathArgs::default();
        for (index, name) in regex.capture_names().enumerate().skip(1) {
            let value = caps.get(index).map(|m| m.as_str().to_string());
            if let (Some(name), Some(value)) = (name, &value) {
                args.named.insert(name.to_string(), value.clone());
            }
            args.positional.push(value);
        }
        Ok(Some(args))
    }
}

impl Clone for RoutePattern {
    fn clone(&self) -> Self {
        Self::new(self.source.clone())
    }
}

fn anchor(base_uri: &str, pattern: &str) -> String {
    format!("^{}{}/?$", regex::escape(base_uri), pattern)
}

/// Arguments captured from the path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathArgs {
    named: IndexMap<String, String>,
    positional: Vec<Option<String>>,
}

impl PathArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Named capture by group name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Capture by group position, starting at 0 for the first group.
    /// Includes named groups.
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).and_then(|v| v.as_deref())
    }

    /// Set or replace a named argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.named.insert(name.into(), value.into());
    }

    pub fn named(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }
}
