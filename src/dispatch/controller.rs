//! Controllers and the controller registry.
//!
//! A controller is looked up by name in a registry populated at startup and
//! constructed per dispatch from the base URI and path arguments. Instead of
//! probing for methods, a controller states which methods it supports.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::dispatch::Cycle;
use crate::routing::{ActionResult, PathArgs};

/// A controller method name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControllerMethod {
    Index,
    Show,
    Create,
    Update,
    /// `_delete`, both the CRUD method and the raw DELETE fallback.
    Delete,
    Get,
    Post,
    Put,
    /// Anything else, called only when named explicitly.
    Named(String),
}

impl ControllerMethod {
    pub fn name(&self) -> &str {
        match self {
            ControllerMethod::Index => "_index",
            ControllerMethod::Show => "_show",
            ControllerMethod::Create => "_create",
            ControllerMethod::Update => "_update",
            ControllerMethod::Delete => "_delete",
            ControllerMethod::Get => "_get",
            ControllerMethod::Post => "_post",
            ControllerMethod::Put => "_put",
            ControllerMethod::Named(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "_index" => ControllerMethod::Index,
            "_show" => ControllerMethod::Show,
            "_create" => ControllerMethod::Create,
            "_update" => ControllerMethod::Update,
            "_delete" => ControllerMethod::Delete,
            "_get" => ControllerMethod::Get,
            "_post" => ControllerMethod::Post,
            "_put" => ControllerMethod::Put,
            other => ControllerMethod::Named(other.to_string()),
        }
    }
}

impl fmt::Display for ControllerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A controller instance, alive for one dispatch.
pub trait Controller {
    /// Whether `method` is implemented. Checked before `call`.
    fn supports(&self, method: &ControllerMethod) -> bool;

    /// Invoke a supported method.
    fn call(&mut self, method: &ControllerMethod, cycle: &mut Cycle<'_>) -> ActionResult;
}

/// Construction arguments for a controller.
#[derive(Debug, Clone, Copy)]
pub struct ControllerInit<'a> {
    pub name: &'a str,
    pub base_uri: &'a str,
    pub args: &'a PathArgs,
}

/// Builds a controller for one dispatch.
pub type ControllerFactory = dyn Fn(&ControllerInit<'_>) -> Box<dyn Controller> + Send + Sync;

/// A registered controller.
#[derive(Clone)]
pub struct ControllerEntry {
    factory: Arc<ControllerFactory>,
    view_dir: Option<PathBuf>,
}

impl ControllerEntry {
    pub fn build(&self, init: &ControllerInit<'_>) -> Box<dyn Controller> {
        (self.factory)(init)
    }

    /// The controller's own view directory, relative to the view root.
    pub fn view_dir(&self) -> Option<&Path> {
        self.view_dir.as_deref()
    }
}

/// Name → factory mapping, populated at startup.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    entries: HashMap<String, ControllerEntry>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller with no view directory of its own.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ControllerInit<'_>) -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.insert(name.into(), Arc::new(factory), None)
    }

    /// Register a controller whose views are looked up in `view_dir` first.
    pub fn register_with_views<F>(
        &mut self,
        name: impl Into<String>,
        view_dir: impl Into<PathBuf>,
        factory: F,
    ) -> &mut Self
    where
        F: Fn(&ControllerInit<'_>) -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.insert(name.into(), Arc::new(factory), Some(view_dir.into()))
    }

    fn insert(
        &mut self,
        name: String,
        factory: Arc<ControllerFactory>,
        view_dir: Option<PathBuf>,
    ) -> &mut Self {
        if self.entries.contains_key(&name) {
            tracing::warn!(controller = %name, "Replacing registered controller");
        }
        self.entries.insert(name, ControllerEntry { factory, view_dir });
        self
    }

    pub fn get(&self, name: &str) -> Option<&ControllerEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.names())
            .finish()
    }
}
