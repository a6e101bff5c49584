//! View lookup and rendering.
//!
//! # Lookup Order
//! ```text
//! for base in [owner_dir/view, view]:
//!     for ext in [hint] or negotiated preferences (or the default extension):
//!         {base}.{ext}.tmpl
//!         {base}.{ext}
//! ```
//!
//! # Design Decisions
//! - First existing resource wins; nothing found is `ViewNotFound`, never
//!   an empty string
//! - Both resource forms are rendered with the data in scope
//! - html/xml output is HTML-escaped, other extensions are emitted raw
//! - Rendering returns the output; nothing is streamed

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::DispatchError;
use crate::observability::metrics;
use crate::view::negotiation::AcceptPreference;
use crate::view::source::TemplateSource;

/// Suffix marking a resource as a template proper.
pub const TEMPLATE_SUFFIX: &str = "tmpl";

/// Who is rendering and what the client accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewScope<'a> {
    /// View directory of the owning controller, relative to the source root.
    pub owner: Option<&'a Path>,
    pub preferences: &'a [AcceptPreference],
}

/// A resource picked by the lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedView {
    pub path: PathBuf,
    pub extension: String,
}

/// Rendered output with the extension it was rendered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub body: String,
    pub extension: String,
}

/// Locates view resources and renders them.
pub struct ViewResolver {
    source: Arc<dyn TemplateSource>,
    escaped: Handlebars<'static>,
    verbatim: Handlebars<'static>,
    default_extension: String,
}

impl ViewResolver {
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    pub fn from_shared(source: Arc<dyn TemplateSource>) -> Self {
        let mut verbatim = Handlebars::new();
        verbatim.register_escape_fn(handlebars::no_escape);
        Self {
            source,
            escaped: Handlebars::new(),
            verbatim,
            default_extension: "html".to_string(),
        }
    }

    /// Extension used when neither a hint nor a known Accept type is given.
    pub fn with_default_extension(mut self, extension: impl Into<String>) -> Self {
        self.default_extension = extension.into();
        self
    }

    pub fn default_extension(&self) -> &str {
        &self.default_extension
    }

    /// Base paths tried, most specific first.
    pub fn candidates(&self, view: &str, owner: Option<&Path>) -> Vec<PathBuf> {
        let shared = PathBuf::from(view);
        match owner {
            Some(dir) if !dir.as_os_str().is_empty() => vec![dir.join(view), shared],
            _ => vec![shared],
        }
    }

    /// Extensions tried, in priority order.
    pub fn extensions<'a>(
        &'a self,
        hint: Option<&'a str>,
        preferences: &'a [AcceptPreference],
    ) -> Vec<&'a str> {
        if let Some(hint) = hint {
            return vec![hint];
        }
        if preferences.is_empty() {
            return vec![self.default_extension.as_str()];
        }
        preferences.iter().map(|p| p.extension.as_str()).collect()
    }

    /// Find the resource for `view` without rendering it.
    pub fn locate(
        &self,
        view: &str,
        hint: Option<&str>,
        scope: ViewScope<'_>,
    ) -> Result<LocatedView, DispatchError> {
        let candidates = self.candidates(view, scope.owner);
        let extensions = self.extensions(hint, scope.preferences);

        for base in &candidates {
            for ext in extensions.iter().copied() {
                let as_template = with_suffix(base, &[ext, TEMPLATE_SUFFIX]);
                if self.source.exists(&as_template) {
                    return Ok(LocatedView { path: as_template, extension: ext.to_string() });
                }
                let plain = with_suffix(base, &[ext]);
                if self.source.exists(&plain) {
                    return Ok(LocatedView { path: plain, extension: ext.to_string() });
                }
            }
        }

        Err(DispatchError::ViewNotFound {
            view: view.to_string(),
            searched: candidates,
        })
    }

    /// Locate `view` and render it with `data` in scope.
    pub fn render<T: Serialize>(
        &self,
        view: &str,
        data: &T,
        hint: Option<&str>,
        scope: ViewScope<'_>,
    ) -> Result<RenderedView, DispatchError> {
        let located = self.locate(view, hint, scope)?;
        let template = self
            .source
            .read(&located.path)
            .map_err(|source| DispatchError::TemplateIo { path: located.path.clone(), source })?;

        let registry = match located.extension.as_str() {
            "html" | "xml" => &self.escaped,
            _ => &self.verbatim,
        };
        let body = registry
            .render_template(&template, data)
            .map_err(|source| DispatchError::Render {
                path: located.path.clone(),
                source: Box::new(source),
            })?;

        tracing::debug!(view = %view, path = %located.path.display(), "View rendered");
        metrics::record_view_render(&located.extension);

        Ok(RenderedView { body, extension: located.extension })
    }
}

impl std::fmt::Debug for ViewResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewResolver")
            .field("default_extension", &self.default_extension)
            .finish_non_exhaustive()
    }
}

fn with_suffix(base: &Path, parts: &[&str]) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    for part in parts {
        name.push(".");
        name.push(part);
    }
    PathBuf::from(name)
}
