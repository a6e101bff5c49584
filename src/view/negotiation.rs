//! Accept-header driven extension negotiation.
//!
//! # Design Decisions
//! - Preference order is the header's left-to-right order; `q=` values are
//!   parsed away and not applied
//! - Only MIME types known to the table contribute an extension
//! - A MIME type listed twice keeps its first position

use std::sync::LazyLock;

use serde::Serialize;

static DEFAULT_TABLE: LazyLock<ContentTypeTable> = LazyLock::new(|| {
    ContentTypeTable::from_pairs([
        ("text/html", "html"),
        ("application/json", "js"),
        ("application/xml", "xml"),
    ])
});

/// One negotiated preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptPreference {
    pub mime: String,
    pub extension: String,
}

/// Ordered MIME type → extension mapping. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeTable {
    entries: Vec<(String, String)>,
}

impl ContentTypeTable {
    /// The process-wide default table.
    pub fn global() -> &'static ContentTypeTable {
        &DEFAULT_TABLE
    }

    pub fn from_pairs<I, M, E>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (M, E)>,
        M: Into<String>,
        E: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(m, e)| (m.into(), e.into()))
                .collect(),
        }
    }

    pub fn extension_for(&self, mime: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(m, _)| m.eq_ignore_ascii_case(mime))
            .map(|(_, e)| e.as_str())
    }

    /// First MIME type mapped to `extension`.
    pub fn mime_for(&self, extension: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, e)| e == extension)
            .map(|(m, _)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(m, e)| (m.as_str(), e.as_str()))
    }

    /// Derive preferences from a raw Accept header value.
    pub fn negotiate(&self, accept: Option<&str>) -> Vec<AcceptPreference> {
        let mut preferences: Vec<AcceptPreference> = Vec::new();
        let Some(accept) = accept else {
            return preferences;
        };

        for entry in accept.split(',') {
            let mime = entry.split(';').next().unwrap_or_default().trim();
            let Some(extension) = self.extension_for(mime) else {
                continue;
            };
            if preferences.iter().any(|p| p.mime.eq_ignore_ascii_case(mime)) {
                continue;
            }
            preferences.push(AcceptPreference {
                mime: mime.to_string(),
                extension: extension.to_string(),
            });
        }
        preferences
    }
}

impl Default for ContentTypeTable {
    fn default() -> Self {
        ContentTypeTable::global().clone()
    }
}
