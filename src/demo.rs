//! Sample controllers and closures served by the `pion` binary.

use serde_json::json;

use crate::app::Pion;
use crate::dispatch::{Controller, ControllerInit, ControllerMethod, ControllerRegistry, Cycle};
use crate::http::ResponsePayload;
use crate::routing::{Action, ActionResult};
use crate::view::ViewData;

/// Landing page. Pulls headlines through a nested `News:latest` call.
pub struct Home;

impl Controller for Home {
    fn supports(&self, method: &ControllerMethod) -> bool {
        matches!(method, ControllerMethod::Get)
    }

    fn call(&mut self, _method: &ControllerMethod, cycle: &mut Cycle<'_>) -> ActionResult {
        cycle.execute("News:latest")?;
        cycle.set_base_view("index");
        cycle.set_view_data("title", "Home");
        let content = cycle.view("home", cycle.data())?;
        cycle.set_view_data("content", content);
        Ok(Some(cycle.response()))
    }
}

/// Only reachable through `execute`; it fills view data and returns nothing.
pub struct News;

impl Controller for News {
    fn supports(&self, method: &ControllerMethod) -> bool {
        method.name() == "latest"
    }

    fn call(&mut self, _method: &ControllerMethod, cycle: &mut Cycle<'_>) -> ActionResult {
        cycle.set_view_data(
            "news",
            json!([
                { "headline": "Pion 0.1 released" },
                { "headline": "Routes now compile lazily" },
            ]),
        );
        Ok(None)
    }
}

/// CRUD-style product pages. Templates live in `views/Product/`.
pub struct Product {
    id: Option<String>,
}

impl Product {
    pub fn new(init: &ControllerInit<'_>) -> Self {
        Self {
            id: init.args.get("id").map(str::to_string),
        }
    }

    fn index(&self, cycle: &mut Cycle<'_>) -> ActionResult {
        let search = cycle.query("search").unwrap_or_default().to_string();
        let products = json!([
            { "id": 1, "name": "Banana" },
            { "id": 2, "name": "Apple" },
        ]);
        let content = cycle.view(
            "productList",
            &json!({ "search": search, "products": products }),
        )?;
        cycle.set_view_data("title", "Product list");
        cycle.set_view_data("content", content);
        Ok(None)
    }

    fn show(&self, cycle: &mut Cycle<'_>) -> ActionResult {
        let product = json!({ "id": self.id, "name": "Banana" });
        let content = cycle.view("product", &json!({ "product": product }))?;
        cycle.set_view_data("title", "The Product");
        cycle.set_view_data("content", content);
        Ok(None)
    }
}

impl Controller for Product {
    fn supports(&self, method: &ControllerMethod) -> bool {
        matches!(method, ControllerMethod::Index | ControllerMethod::Show)
    }

    fn call(&mut self, method: &ControllerMethod, cycle: &mut Cycle<'_>) -> ActionResult {
        match method {
            ControllerMethod::Show => self.show(cycle),
            _ => self.index(cycle),
        }
    }
}

/// Not-found page. The status becomes 404 after rendering.
pub struct Error404;

impl Controller for Error404 {
    fn supports(&self, method: &ControllerMethod) -> bool {
        matches!(
            method,
            ControllerMethod::Index | ControllerMethod::Get | ControllerMethod::Post
        )
    }

    fn call(&mut self, _method: &ControllerMethod, cycle: &mut Cycle<'_>) -> ActionResult {
        cycle.set_view_data("title", "Page not found");
        let content = cycle.view("notFound", &json!({ "path": cycle.request().path() }))?;
        cycle.set_view_data("content", content);
        Ok(Some(cycle.response()))
    }
}

/// Registry with every sample controller.
pub fn controllers() -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();
    registry
        .register("Home", |_: &ControllerInit<'_>| Box::new(Home) as Box<dyn Controller>)
        .register("News", |_: &ControllerInit<'_>| Box::new(News) as Box<dyn Controller>)
        .register_with_views("Product", "Product", |init: &ControllerInit<'_>| {
            Box::new(Product::new(init)) as Box<dyn Controller>
        })
        .register("Error404", |_: &ControllerInit<'_>| Box::new(Error404) as Box<dyn Controller>);
    registry
}

/// Register the sample closures and controller routes on `app`.
pub fn routes(app: &mut Pion) {
    app.get(
        r"/demo/(?P<first>\w+)(?:/(?P<second>\w+))?(?:/(?P<third>\d+))?",
        Action::closure(|cycle: &mut Cycle<'_>| {
            let lines: Vec<String> = cycle
                .args()
                .named()
                .map(|(name, value)| format!("{name} = {value}\n"))
                .collect();
            cycle.write("<pre>\n")?;
            for line in &lines {
                cycle.write(line)?;
            }
            cycle.write("</pre>")?;
            Ok(None)
        }),
    )
    .get(r"/product(?:/page/(?P<page>\d+))?", "Product")
    .get(r"/product(?:/(?P<id>\d+))?", "Product")
    .get("/home", "Home")
    .get(
        "/json",
        Action::closure(|_: &mut Cycle<'_>| {
            let data = ViewData::new().with("hello", "world");
            Ok(Some(ResponsePayload::view("hello", data).with_extension("js")))
        }),
    )
    .get("/errortest", "doesntexist")
    .post(
        "/post",
        Action::closure(|cycle: &mut Cycle<'_>| {
            let lines: Vec<String> = cycle
                .request()
                .body_fields()
                .iter()
                .map(|(name, value)| format!("{name} = {value}\n"))
                .collect();
            cycle.write("<pre>\n")?;
            for line in &lines {
                cycle.write(line)?;
            }
            cycle.write("</pre>")?;
            Ok(None)
        }),
    );
}
