//! Action resolution and invocation.
//!
//! # Method Selection (controllers)
//! ```text
//! 1. explicit method from "Name:method"     → must be supported, else MethodNotSupported
//! 2. CRUD-inferred method (see crud.rs)     → if supported
//! 3. raw verb method (_get/_post/_put/...)  → if supported
//! otherwise MethodNotSupported naming the attempted methods
//! ```
//!
//! # Design Decisions
//! - Controller lookup is a registry lookup; unknown names are errors
//! - The controller is built before method selection, once per dispatch
//! - While a controller method runs, its view directory is the view owner
//! - A templated payload returned by the method keeps that directory for rendering
//! - Resolution (`resolve`) and the call (`invoke`) are separate steps

use std::path::PathBuf;

use crate::dispatch::controller::{
    Controller, ControllerInit, ControllerMethod, ControllerRegistry,
};
use crate::dispatch::crud::{
    http_method_fallback, infer_crud_method, ID_ARG, METHOD_OVERRIDE_FIELD,
};
use crate::dispatch::Cycle;
use crate::error::DispatchError;
use crate::routing::{Action, ActionResult, ControllerRef, HttpMethod};

/// Facts about the request that drive method inference.
#[derive(Debug, Clone, Copy)]
pub struct MethodContext<'a> {
    /// Raw request method, e.g. `"GET"`.
    pub request_method: &'a str,
    pub has_id: bool,
    pub method_override: Option<&'a str>,
}

/// Invokes actions against a controller registry.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    registry: ControllerRegistry,
}

impl Dispatcher {
    pub fn new(registry: ControllerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ControllerRegistry {
        &mut self.registry
    }

    /// Run `action` within `cycle`.
    pub fn dispatch(&self, action: &Action, cycle: &mut Cycle<'_>) -> ActionResult {
        match action {
            Action::Closure(f) => {
                tracing::debug!("Invoking closure action");
                f(cycle)
            }
            Action::Controller(reference) => self.dispatch_controller(reference, cycle),
        }
    }

    fn dispatch_controller(
        &self,
        reference: &ControllerRef,
        cycle: &mut Cycle<'_>,
    ) -> ActionResult {
        let resolved = self.resolve(reference, cycle)?;
        self.invoke(reference, resolved, cycle)
    }

    /// Look up and build the controller, then pick its method. Nothing runs yet.
    pub fn resolve(
        &self,
        reference: &ControllerRef,
        cycle: &Cycle<'_>,
    ) -> Result<ResolvedController, DispatchError> {
        let entry = self
            .registry
            .get(&reference.name)
            .ok_or_else(|| DispatchError::UnknownController(reference.to_string()))?;

        let controller = entry.build(&ControllerInit {
            name: &reference.name,
            base_uri: cycle.base_uri(),
            args: cycle.args(),
        });

        let request = cycle.request();
        let context = MethodContext {
            request_method: request.method(),
            has_id: cycle.args().contains(ID_ARG),
            method_override: request.body_field(METHOD_OVERRIDE_FIELD),
        };
        let method = select_method(controller.as_ref(), reference, context)?;

        Ok(ResolvedController {
            controller,
            method,
            view_dir: entry.view_dir().map(ToOwned::to_owned),
        })
    }

    /// Call a resolved controller with its view directory as the owner.
    pub fn invoke(
        &self,
        reference: &ControllerRef,
        resolved: ResolvedController,
        cycle: &mut Cycle<'_>,
    ) -> ActionResult {
        let ResolvedController { mut controller, method, view_dir } = resolved;
        tracing::debug!(
            controller = %reference.name,
            method = %method,
            "Invoking controller method"
        );

        let previous = cycle.replace_owner(view_dir.clone());
        let result = controller.call(&method, cycle);
        cycle.replace_owner(previous);
        result.map(|payload| payload.map(|payload| payload.owned_by(view_dir.as_deref())))
    }
}

/// A built controller and the method chosen for this request.
pub struct ResolvedController {
    controller: Box<dyn Controller>,
    method: ControllerMethod,
    view_dir: Option<PathBuf>,
}

impl ResolvedController {
    pub fn method(&self) -> &ControllerMethod {
        &self.method
    }
}

impl std::fmt::Debug for ResolvedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedController")
            .field("method", &self.method)
            .field("view_dir", &self.view_dir)
            .finish()
    }
}

/// Choose the controller method to call.
pub fn select_method(
    controller: &dyn Controller,
    reference: &ControllerRef,
    context: MethodContext<'_>,
) -> Result<ControllerMethod, DispatchError> {
    if let Some(explicit) = &reference.method {
        let method = ControllerMethod::from_name(explicit);
        if controller.supports(&method) {
            return Ok(method);
        }
        return Err(DispatchError::MethodNotSupported {
            controller: reference.name.clone(),
            attempted: vec![method.name().to_string()],
        });
    }

    let (crud, fallback) = match context.request_method.parse::<HttpMethod>() {
        Ok(verb) => (
            Some(infer_crud_method(verb, context.has_id, context.method_override)),
            http_method_fallback(verb),
        ),
        Err(_) => (
            None,
            ControllerMethod::Named(format!("_{}", context.request_method.to_ascii_lowercase())),
        ),
    };

    let mut attempted = Vec::new();
    for candidate in crud.into_iter().chain(std::iter::once(fallback)) {
        if controller.supports(&candidate) {
            return Ok(candidate);
        }
        if !attempted.iter().any(|name| name == candidate.name()) {
            attempted.push(candidate.name().to_string());
        }
    }

    Err(DispatchError::MethodNotSupported {
        controller: reference.name.clone(),
        attempted,
    })
}
