//! End-to-end dispatch cycles against an in-memory application.

use axum::http::StatusCode;
use pion::{Action, Cycle, DispatchError, ResponsePayload};

mod common;

use common::{app, request, run};

#[test]
fn test_id_route_registered_first_wins() {
    let mut app = app();
    app.get(
        r"/items/(?P<id>\d+)",
        Action::closure(|cycle: &mut Cycle<'_>| {
            let id = cycle.path_arg("id").unwrap_or_default().to_string();
            Ok(Some(ResponsePayload::raw(format!("one {id}"))))
        }),
    )
    .get(
        "/items",
        Action::closure(|_: &mut Cycle<'_>| Ok(Some(ResponsePayload::raw("all")))),
    );

    assert_eq!(run(&app, "GET", "/items/42").unwrap().body(), "one 42");
    assert_eq!(run(&app, "GET", "/items").unwrap().body(), "all");
    assert_eq!(run(&app, "GET", "/items/").unwrap().body(), "all");
}

#[test]
fn test_missing_route_without_not_found_action_is_bare_404() {
    let app = app();
    let response = run(&app, "GET", "/missing").unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), "");
}

#[test]
fn test_missing_route_renders_not_found_action() {
    let mut app = app();
    app.set_not_found_action(Action::closure(|cycle: &mut Cycle<'_>| {
        cycle.set_view_data("title", "Missing");
        cycle.set_view_data("content", "<b>gone</b>");
        Ok(None)
    }));

    let response = run(&app, "GET", "/missing").unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), "<title>Missing</title><b>gone</b>");
}

#[test]
fn test_not_found_controller_goes_through_crud_inference() {
    let mut app = app();
    app.set_not_found_action("Item");

    let response = run(&app, "GET", "/missing").unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), "_index -");
}

#[test]
fn test_unresolvable_not_found_action_is_bare_404() {
    let mut app = app();
    app.set_not_found_action("Nope");
    let response = run(&app, "GET", "/missing").unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), "");

    app.set_not_found_action("Page");
    let response = run(&app, "GET", "/missing").unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), "");
}

#[test]
fn test_errors_inside_not_found_action_propagate() {
    let mut app = app();
    app.set_not_found_action(Action::closure(|cycle: &mut Cycle<'_>| {
        cycle.write("partial")?;
        cycle.execute("Nope")
    }));

    match run(&app, "GET", "/missing").unwrap_err() {
        DispatchError::UnknownController(name) => assert_eq!(name, "Nope"),
        other => panic!("unexpected error: {other:?}"),
    }

    app.set_not_found_action(Action::closure(|cycle: &mut Cycle<'_>| {
        cycle.execute("ReadOnly:latest")
    }));
    assert!(matches!(
        run(&app, "GET", "/missing"),
        Err(DispatchError::MethodNotSupported { .. })
    ));
}

#[test]
fn test_unknown_request_method_never_matches() {
    let mut app = app();
    app.any("/items", "Item");
    let response = run(&app, "HEAD", "/items").unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_templated_payload_is_rendered_once() {
    let mut app = app();
    app.get(r"/pages/(?P<id>\d+)", "Page");

    let response = run(&app, "GET", "/pages/7").unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), "<h1>X</h1>");
    assert_eq!(response.header("content-type"), Some("text/html"));
}

#[test]
fn test_returned_view_is_looked_up_in_controller_view_dir() {
    let mut app = app();
    app.get(r"/owned(?:/(?P<id>\d+))?", "Owned").get(
        "/relay",
        Action::closure(|cycle: &mut Cycle<'_>| cycle.execute("Owned")),
    );

    // Owner directory first, shadowing the shared `show`.
    assert_eq!(run(&app, "GET", "/owned/1").unwrap().body(), "owned X");
    // Only present under the owner directory.
    let response = run(&app, "GET", "/owned").unwrap();
    assert_eq!(response.body(), "card X");
    assert_eq!(response.header("content-type"), Some("text/html"));
    // Handed back through a closure, the payload keeps its directory.
    assert_eq!(run(&app, "GET", "/relay").unwrap().body(), "card X");
}

#[test]
fn test_accept_order_selects_template_variant() {
    let mut app = app();
    app.get(r"/pages/(?P<id>\d+)", "Page").get(
        "/only",
        Action::closure(|_: &mut Cycle<'_>| {
            Ok(Some(ResponsePayload::view(
                "only_html",
                pion::ViewData::new().with("name", "n"),
            )))
        }),
    );

    let json_first =
        request("GET", "/pages/7").with_header("accept", "application/json, text/html");
    let response = app.run_once(json_first).unwrap();
    assert_eq!(response.body(), r#"{"title":"X"}"#);
    assert_eq!(response.header("content-type"), Some("application/json"));

    let json_first = request("GET", "/only").with_header("accept", "application/json, text/html");
    let response = app.run_once(json_first).unwrap();
    assert_eq!(response.body(), "html:n");
    assert_eq!(response.header("content-type"), Some("text/html"));
}

#[test]
fn test_crud_inference_end_to_end() {
    let mut app = app();
    app.any(r"/items(?:/(?P<id>\d+))?", "Item");

    let cases = [
        (request("GET", "/items/42"), "_show 42"),
        (request("GET", "/items"), "_index -"),
        (request("POST", "/items"), "_create -"),
        (request("POST", "/items/5").with_form_body("_METHOD=DELETE"), "_delete 5"),
        (request("POST", "/items/5").with_form_body("_METHOD=put"), "_update 5"),
        (request("PUT", "/items/5"), "_update 5"),
        (request("DELETE", "/items/5"), "_delete 5"),
    ];
    for (req, expected) in cases {
        let label = format!("{} {}", req.method(), req.path());
        assert_eq!(app.run_once(req).unwrap().body(), expected, "{label}");
    }
}

#[test]
fn test_method_not_supported_lists_attempts() {
    let mut app = app();
    app.any("/ro", "ReadOnly").get("/ro/latest", "ReadOnly:latest");

    assert_eq!(run(&app, "GET", "/ro").unwrap().body(), "list");

    match run(&app, "POST", "/ro").unwrap_err() {
        DispatchError::MethodNotSupported { controller, attempted } => {
            assert_eq!(controller, "ReadOnly");
            assert_eq!(attempted, vec!["_create", "_post"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    match run(&app, "GET", "/ro/latest").unwrap_err() {
        DispatchError::MethodNotSupported { attempted, .. } => {
            assert_eq!(attempted, vec!["latest"])
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unknown_controller() {
    let mut app = app();
    app.get("/errortest", "doesntexist");
    let err = run(&app, "GET", "/errortest").unwrap_err();
    assert!(matches!(err, DispatchError::UnknownController(ref name) if name == "doesntexist"));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_malformed_route_surfaces_at_first_use() {
    let mut app = app();
    app.get("/fine", Action::closure(|_: &mut Cycle<'_>| Ok(Some(ResponsePayload::raw("fine")))))
        .get("/broken(", "Item");

    assert_eq!(run(&app, "GET", "/fine").unwrap().body(), "fine");
    assert!(matches!(
        run(&app, "GET", "/other"),
        Err(DispatchError::MalformedRoute { .. })
    ));
    // Other methods never reach the broken pattern.
    assert_eq!(run(&app, "POST", "/other").unwrap().status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_direct_writes_accumulate() {
    let mut app = app();
    app.get(
        "/echo",
        Action::closure(|cycle: &mut Cycle<'_>| {
            cycle.write("a")?;
            cycle.write("b")?;
            Ok(Some(ResponsePayload::raw("")))
        }),
    );
    let response = run(&app, "GET", "/echo").unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), "ab");
}

#[test]
fn test_payload_after_direct_write_is_rejected() {
    let mut app = app();
    app.get(
        "/mixed",
        Action::closure(|cycle: &mut Cycle<'_>| {
            cycle.write("partial")?;
            Ok(Some(ResponsePayload::raw("payload")))
        }),
    );
    assert!(matches!(
        run(&app, "GET", "/mixed"),
        Err(DispatchError::ResponseAlreadySent)
    ));
}

#[test]
fn test_second_respond_fails_and_first_output_stands() {
    let mut app = app();
    app.get(
        "/twice",
        Action::closure(|cycle: &mut Cycle<'_>| {
            cycle.respond(ResponsePayload::raw("first"))?;
            for _ in 0..3 {
                match cycle.respond(ResponsePayload::raw("again")) {
                    Err(DispatchError::ResponseAlreadySent) => {}
                    other => panic!("second respond should fail: {other:?}"),
                }
            }
            Ok(None)
        }),
    );
    let response = run(&app, "GET", "/twice").unwrap();
    assert_eq!(response.body(), "first");
}

#[test]
fn test_redirect_prefixes_base_uri() {
    let mut app = app();
    app.set_base_uri("/shop").post(
        "/login",
        Action::closure(|cycle: &mut Cycle<'_>| cycle.redirect("/home")),
    );

    let response = run(&app, "POST", "/shop/login").unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/shop/home"));
    assert_eq!(response.body(), "");

    assert_eq!(run(&app, "POST", "/login").unwrap().status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_output_after_redirect_keeps_the_redirect() {
    let mut app = app();
    app.get(
        "/leave",
        Action::closure(|cycle: &mut Cycle<'_>| {
            cycle.redirect("/login")?;
            cycle.write("late")?;
            Ok(Some(ResponsePayload::raw("later")))
        }),
    );

    let response = run(&app, "GET", "/leave").unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/login"));
    assert_eq!(response.body(), "");
}

#[test]
fn test_view_data_renders_base_view_at_end_of_cycle() {
    let mut app = app();
    app.get(
        "/layout",
        Action::closure(|cycle: &mut Cycle<'_>| {
            cycle.set_view_data("title", "T");
            let content = cycle.view("show", &pion::ViewData::new().with("title", "inner"))?;
            cycle.set_view_data("content", content);
            Ok(None)
        }),
    )
    .get("/empty", Action::closure(|_: &mut Cycle<'_>| Ok(None)));

    assert_eq!(
        run(&app, "GET", "/layout").unwrap().body(),
        "<title>T</title><h1>inner</h1>"
    );

    let empty = run(&app, "GET", "/empty").unwrap();
    assert_eq!(empty.status(), StatusCode::OK);
    assert_eq!(empty.body(), "");
}

#[test]
fn test_nested_execute_shares_cycle_and_restores_owner() {
    let mut app = app();
    app.get(r"/greet/(?P<name>\w+)", "Outer");

    let response = run(&app, "GET", "/greet/ada").unwrap();
    assert_eq!(response.body(), "hi ada|true|<h1>shared</h1>");
}

#[test]
fn test_missing_view_is_an_error() {
    let mut app = app();
    app.get(
        "/absent",
        Action::closure(|_: &mut Cycle<'_>| {
            Ok(Some(ResponsePayload::view("absent", pion::ViewData::new())))
        }),
    );
    match run(&app, "GET", "/absent").unwrap_err() {
        DispatchError::ViewNotFound { view, .. } => assert_eq!(view, "absent"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_request_accessors() {
    let mut app = app();
    app.post(
        r"/forms/(\w+)",
        Action::closure(|cycle: &mut Cycle<'_>| {
            let out = format!(
                "{}|{}|{}|{}",
                cycle.positional_arg(0).unwrap_or("?"),
                cycle.query("page").unwrap_or("?"),
                cycle.body_field("name").unwrap_or("?"),
                cycle.header("x-trace").unwrap_or("?"),
            );
            Ok(Some(ResponsePayload::raw(out)))
        }),
    );

    let req = request("POST", "/forms/signup?page=2")
        .with_form_body("name=Ada+L")
        .with_header("x-trace", "t1");
    assert_eq!(app.run_once(req).unwrap().body(), "signup|2|Ada L|t1");
}
