//! Shared fixtures for dispatch and adapter tests.

#![allow(dead_code)]

use pion::dispatch::{Controller, ControllerInit, ControllerMethod};
use pion::view::{MemorySource, ViewResolver};
use pion::{
    ActionResult, Cycle, DispatchError, Pion, RequestContext, Response, ResponsePayload, ViewData,
};

/// Templates shared by every test application.
pub fn templates() -> MemorySource {
    MemorySource::new()
        .with("index.html.tmpl", "<title>{{title}}</title>{{{content}}}")
        .with("show.html.tmpl", "<h1>{{title}}</h1>")
        .with("show.js.tmpl", r#"{"title":"{{title}}"}"#)
        .with("only_html.html", "html:{{name}}")
        .with("Inner/greeting.html.tmpl", "hi {{name}}")
        .with("Owned/show.html.tmpl", "owned {{title}}")
        .with("Owned/card.html", "card {{title}}")
}

/// Application over in-memory templates with the test controllers registered.
pub fn app() -> Pion {
    let mut app = Pion::new(ViewResolver::new(templates()));
    app.register_controller("Item", |init: &ControllerInit<'_>| {
        Box::new(Item::new(init)) as Box<dyn Controller>
    })
    .register_controller("Page", |_: &ControllerInit<'_>| Box::new(Page) as Box<dyn Controller>)
    .register_controller("ReadOnly", |_: &ControllerInit<'_>| {
        Box::new(ReadOnly) as Box<dyn Controller>
    })
    .register_controller("Outer", |_: &ControllerInit<'_>| Box::new(Outer) as Box<dyn Controller>)
    .register_controller_with_views("Inner", "Inner", |_: &ControllerInit<'_>| {
        Box::new(Inner) as Box<dyn Controller>
    })
    .register_controller_with_views("Owned", "Owned", |_: &ControllerInit<'_>| {
        Box::new(Owned) as Box<dyn Controller>
    });
    app
}

pub fn request(method: &str, target: &str) -> RequestContext {
    RequestContext::new(method, target)
}

pub fn run(app: &Pion, method: &str, target: &str) -> Result<Response, DispatchError> {
    app.run_once(request(method, target))
}

/// Full CRUD controller. Answers with the chosen method and the id.
pub struct Item {
    id: Option<String>,
}

impl Item {
    fn new(init: &ControllerInit<'_>) -> Self {
        Self {
            id: init.args.get("id").map(str::to_string),
        }
    }
}

impl Controller for Item {
    fn supports(&self, method: &ControllerMethod) -> bool {
        matches!(
            method,
            ControllerMethod::Index
                | ControllerMethod::Show
                | ControllerMethod::Create
                | ControllerMethod::Update
                | ControllerMethod::Delete
        )
    }

    fn call(&mut self, method: &ControllerMethod, _cycle: &mut Cycle<'_>) -> ActionResult {
        let id = self.id.as_deref().unwrap_or("-");
        Ok(Some(ResponsePayload::raw(format!("{method} {id}"))))
    }
}

/// Returns the `show` view with a title.
pub struct Page;

impl Controller for Page {
    fn supports(&self, method: &ControllerMethod) -> bool {
        matches!(method, ControllerMethod::Show)
    }

    fn call(&mut self, _method: &ControllerMethod, _cycle: &mut Cycle<'_>) -> ActionResult {
        Ok(Some(ResponsePayload::view(
            "show",
            ViewData::new().with("title", "X"),
        )))
    }
}

pub struct ReadOnly;

impl Controller for ReadOnly {
    fn supports(&self, method: &ControllerMethod) -> bool {
        matches!(method, ControllerMethod::Index)
    }

    fn call(&mut self, _method: &ControllerMethod, _cycle: &mut Cycle<'_>) -> ActionResult {
        Ok(Some(ResponsePayload::raw("list")))
    }
}

/// Wraps the payload of `Inner:greet`.
pub struct Outer;

impl Controller for Outer {
    fn supports(&self, method: &ControllerMethod) -> bool {
        matches!(method, ControllerMethod::Get)
    }

    fn call(&mut self, _method: &ControllerMethod, cycle: &mut Cycle<'_>) -> ActionResult {
        let inner = match cycle.execute("Inner:greet")? {
            Some(ResponsePayload::Raw(body)) => body,
            other => panic!("unexpected inner payload: {other:?}"),
        };
        let from_inner = cycle
            .view_data("greeted")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        // Back in Outer the owner directory is gone, so this is the shared view.
        let shared = cycle.view("show", &ViewData::new().with("title", "shared"))?;
        Ok(Some(ResponsePayload::raw(format!("{inner}|{from_inner}|{shared}"))))
    }
}

/// Renders from its own view directory.
pub struct Inner;

impl Controller for Inner {
    fn supports(&self, method: &ControllerMethod) -> bool {
        method.name() == "greet"
    }

    fn call(&mut self, _method: &ControllerMethod, cycle: &mut Cycle<'_>) -> ActionResult {
        let name = cycle.path_arg("name").unwrap_or("nobody").to_string();
        let body = cycle.view("greeting", &ViewData::new().with("name", name))?;
        cycle.set_view_data("greeted", true);
        Ok(Some(ResponsePayload::raw(body)))
    }
}

/// Returns views that live in its own directory: `show` shadows the shared
/// one, `card` exists nowhere else.
pub struct Owned;

impl Controller for Owned {
    fn supports(&self, method: &ControllerMethod) -> bool {
        matches!(method, ControllerMethod::Index | ControllerMethod::Show)
    }

    fn call(&mut self, method: &ControllerMethod, _cycle: &mut Cycle<'_>) -> ActionResult {
        let view = match method {
            ControllerMethod::Show => "show",
            _ => "card",
        };
        Ok(Some(ResponsePayload::view(view, ViewData::new().with("title", "X"))))
    }
}
