//! Request scenarios through the assembled pipeline.

use std::sync::{Arc, Mutex};

use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use ssr_pipeline::client::{hydrate, HostDocument, HtmlDocument, HydrateOptions};
use ssr_pipeline::codec::{self, PROPS_GLOBAL};
use ssr_pipeline::error::ErrorReport;
use ssr_pipeline::http::middleware::{
    redirect_middleware, AssetSource, CatchMiddleware, CatchOptions, MatchMiddleware, MatchOptions,
    RedirectOptions, RenderMiddleware, RenderOptions, StaticMiddleware, StaticOptions,
};
use ssr_pipeline::preload::{Candidates, Helpers, Location, PreloadResult};
use ssr_pipeline::render::RenderedOutput;
use ssr_pipeline::routing::PathMatch;
use ssr_pipeline::template::Selector;
use ssr_pipeline::{BoxError, Pipeline, Props};

mod common;

fn greeting(props: &Props) -> Result<RenderedOutput, BoxError> {
    let greeting = props.get("greeting").and_then(|v| v.as_str()).unwrap_or("");
    Ok(RenderedOutput::html(format!("<h1>{}</h1>", greeting)))
}

fn mount(document: &mut dyn HostDocument, target: &Selector, props: &Props) -> Result<(), BoxError> {
    let greeting = props.get("greeting").and_then(|v| v.as_str()).unwrap_or("");
    document.set_inner(target, &format!("<h1>{} again</h1>", greeting));
    Ok(())
}

fn render_options(template: &tempfile::NamedTempFile) -> RenderOptions {
    RenderOptions::new()
        .base("/app")
        .component(greeting)
        .template_path(template.path())
        .target_selector("#app")
        .secret_salt(common::SECRET)
}

fn greeting_render(template: &tempfile::NamedTempFile) -> RenderMiddleware {
    RenderMiddleware::new(render_options(template).preload(
        |_location: Location, _candidates: Candidates, _helpers: Helpers| async move {
            Ok::<_, BoxError>(Some(PreloadResult::from_json(json!({"greeting": "hi"}))))
        },
    ))
    .unwrap()
}

fn catch() -> CatchMiddleware {
    CatchMiddleware::new(CatchOptions::new("/app"))
}

#[tokio::test]
async fn test_renders_document_with_encrypted_props() {
    let template = common::template_file(common::TEMPLATE);
    let router = Pipeline::new(catch()).with_render(greeting_render(&template)).into_router();

    let response = common::get(&router, "/app/x?tab=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");

    let body = common::body_string(response).await;
    assert!(body.contains("<div id=\"app\"><h1>hi</h1></div>"));
    assert!(body.contains("<base href=\"/app\" />"));
    assert!(body.contains("<title>App</title>"));
    assert!(!body.contains("loading"));

    let document = HtmlDocument::new(body);
    let payload = document.global(PROPS_GLOBAL).unwrap();
    let props = codec::decode(&payload, common::SECRET).unwrap();
    assert_eq!(props.get("inner"), Some(&json!("/x")));
    assert_eq!(props.get("greeting"), Some(&json!("hi")));
    assert_eq!(props.get("query"), Some(&json!({"tab": "1"})));
}

#[tokio::test]
async fn test_preload_redirect_defaults() {
    let template = common::template_file(common::TEMPLATE);
    let render = RenderMiddleware::new(render_options(&template).preload(
        |_location: Location, candidates: Candidates, _helpers: Helpers| async move {
            Ok::<_, BoxError>(Some(candidates.redirect("/elsewhere")))
        },
    ))
    .unwrap();
    let router = Pipeline::new(catch()).with_render(render).into_router();

    let response = common::get(&router, "/app/x").await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[header::LOCATION], "/app/elsewhere");
}

#[tokio::test]
async fn test_preload_response_is_sent_verbatim() {
    let template = common::template_file(common::TEMPLATE);
    let rendered = Arc::new(Mutex::new(0));
    let counter = rendered.clone();
    let render = RenderMiddleware::new(
        render_options(&template)
            .component(move |_props: &Props| -> Result<RenderedOutput, BoxError> {
                *counter.lock().unwrap() += 1;
                Ok(RenderedOutput::default())
            })
            .preload(|_location: Location, _candidates: Candidates, helpers: Helpers| async move {
                Ok::<_, BoxError>(Some((helpers.response)("ok", Some(StatusCode::OK))))
            }),
    )
    .unwrap();
    let router = Pipeline::new(catch()).with_render(render).into_router();

    let response = common::get(&router, "/app/x").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_string(response).await, "ok");
    assert_eq!(*rendered.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_untagged_lookalike_is_data() {
    let template = common::template_file(common::TEMPLATE);
    let render = RenderMiddleware::new(render_options(&template).preload(
        |_location: Location, _candidates: Candidates, _helpers: Helpers| async move {
            Ok::<_, BoxError>(Some(PreloadResult::from_json(json!({"body": "x", "status": 1}))))
        },
    ))
    .unwrap();
    let router = Pipeline::new(catch()).with_render(render).into_router();

    let response = common::get(&router, "/app/x").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    let payload = HtmlDocument::new(body).global(PROPS_GLOBAL).unwrap();
    let props = codec::decode(&payload, common::SECRET).unwrap();
    assert_eq!(props.get("body"), Some(&json!("x")));
}

#[tokio::test]
async fn test_preload_failure_reaches_error_handler() {
    let template = common::template_file(common::TEMPLATE);
    let render = RenderMiddleware::new(render_options(&template).preload(
        |_location: Location, _candidates: Candidates, _helpers: Helpers| async move {
            Err::<Option<PreloadResult>, BoxError>("backend down".into())
        },
    ))
    .unwrap();

    let seen: Arc<Mutex<Vec<ErrorReport>>> = Arc::default();
    let recorder = seen.clone();
    let catch = CatchMiddleware::new(CatchOptions::new("/app").on_error(move |report| {
        recorder.lock().unwrap().push(report.clone());
        (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response()
    }));
    let router = Pipeline::new(catch).with_render(render).into_router();

    let response = common::get(&router, "/app/x").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(common::body_string(response).await, "try later");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, "preload_error");
    assert!(seen[0].message.contains("backend down"));
}

#[tokio::test]
async fn test_component_failure_is_generic_500() {
    let template = common::template_file(common::TEMPLATE);
    let render = RenderMiddleware::new(render_options(&template).component(
        |_props: &Props| -> Result<RenderedOutput, BoxError> { Err("template bug".into()) },
    ))
    .unwrap();
    let router = Pipeline::new(catch()).with_render(render).into_router();

    let response = common::get(&router, "/app/x").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::body_string(response).await;
    assert!(!body.contains("template bug"));
}

#[tokio::test]
async fn test_outside_base_reaches_catch() {
    let template = common::template_file(common::TEMPLATE);
    let router = Pipeline::new(catch()).with_render(greeting_render(&template)).into_router();

    let response = common::get(&router, "/application").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_match_middleware_scenario() {
    let template = common::template_file(common::TEMPLATE);
    let matcher = MatchMiddleware::new(MatchOptions::new("/app", PathMatch::exact("/x")), |_req, _next| async {
        (StatusCode::IM_A_TEAPOT, "matched").into_response()
    })
    .unwrap();
    let router = Pipeline::new(catch())
        .with_match(matcher)
        .with_render(greeting_render(&template))
        .into_router();

    let response = common::get(&router, "/app/x").await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);

    let response = common::get(&router, "/app/y").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_string(response).await.contains("<h1>hi</h1>"));
}

#[tokio::test]
async fn test_redirect_stage_runs_before_render() {
    let template = common::template_file(common::TEMPLATE);
    let redirect = redirect_middleware(
        RedirectOptions::new("/app", PathMatch::pattern("^/old/.*").unwrap(), "/new")
            .status(StatusCode::FOUND),
    )
    .unwrap();
    let router = Pipeline::new(catch())
        .with_match(redirect)
        .with_render(greeting_render(&template))
        .into_router();

    let response = common::get(&router, "/app/old/page").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/app/new");

    let response = common::get(&router, "/app/older").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_static_assets_then_render() {
    let template = common::template_file(common::TEMPLATE);
    let assets = tempfile::tempdir().unwrap();
    std::fs::write(assets.path().join("client.js"), "console.log('client')").unwrap();

    let static_assets = StaticMiddleware::new(StaticOptions {
        base: "/app".into(),
        source: AssetSource::Directory(assets.path().to_path_buf()),
        verbose: false,
    })
    .unwrap();
    let router = Pipeline::new(catch())
        .with_static(static_assets)
        .with_render(greeting_render(&template))
        .into_router();

    let response = common::get(&router, "/app/client.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_string(response).await, "console.log('client')");

    let response = common::get(&router, "/app/missing.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_string(response).await.contains("<h1>hi</h1>"));
}

#[tokio::test]
async fn test_hydrates_from_rendered_page() {
    let template = common::template_file(common::TEMPLATE);
    let router = Pipeline::new(catch()).with_render(greeting_render(&template)).into_router();
    let body = common::body_string(common::get(&router, "/app/x?tab=1").await).await;

    let mut document = HtmlDocument::new(body);
    let props = hydrate(
        &mut document,
        HydrateOptions::new(mount, "#app").secret_salt(common::SECRET),
    )
    .unwrap();

    assert_eq!(props.get("greeting"), Some(&json!("hi")));
    assert_eq!(props.get("inner"), Some(&json!("/x")));
    assert!(props.get("path").is_none());
    assert!(props.get("query").is_none());

    let app = Selector::parse("#app").unwrap();
    assert_eq!(document.inner_html(&app), Some("<h1>hi again</h1>"));
}

fn decoded_props(body: &str) -> Props {
    let payload = HtmlDocument::new(body).global(PROPS_GLOBAL).unwrap();
    codec::decode(&payload, common::SECRET).unwrap()
}

#[tokio::test]
async fn test_preload_panic_reaches_error_handler() {
    let template = common::template_file(common::TEMPLATE);
    let render = RenderMiddleware::new(render_options(&template).preload(
        |_location: Location, _candidates: Candidates, _helpers: Helpers| async move {
            if true {
                panic!("preload boom");
            }
            Ok::<Option<PreloadResult>, BoxError>(None)
        },
    ))
    .unwrap();

    let seen: Arc<Mutex<Vec<ErrorReport>>> = Arc::default();
    let recorder = seen.clone();
    let catch = CatchMiddleware::new(CatchOptions::new("/app").on_error(move |report| {
        recorder.lock().unwrap().push(report.clone());
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }));
    let router = Pipeline::new(catch).with_render(render).into_router();

    let response = common::get(&router, "/app/x").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, "preload_error");
    assert!(seen[0].message.contains("preload boom"));
}

#[tokio::test]
async fn test_non_ascii_redirect_is_encoded() {
    let template = common::template_file(common::TEMPLATE);
    let render = RenderMiddleware::new(render_options(&template).preload(
        |_location: Location, candidates: Candidates, _helpers: Helpers| async move {
            Ok::<_, BoxError>(Some(candidates.redirect("/café")))
        },
    ))
    .unwrap();
    let router = Pipeline::new(catch()).with_render(render).into_router();

    let response = common::get(&router, "/app/x").await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[header::LOCATION], "/app/caf%C3%A9");
}

#[tokio::test]
async fn test_dev_server_assets_then_render() {
    let dev_server = Router::new()
        .route("/client.js", get(|| async { "dev bundle" }))
        .route("/echo", get(|uri: Uri| async move { uri.to_string() }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dev_addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, dev_server).await;
    });

    let template = common::template_file(common::TEMPLATE);
    let static_assets = StaticMiddleware::new(StaticOptions {
        base: "/app".into(),
        source: AssetSource::DevServer(dev_addr.to_string()),
        verbose: false,
    })
    .unwrap();
    let router = Pipeline::new(catch())
        .with_static(static_assets)
        .with_render(greeting_render(&template))
        .into_router();

    let response = common::get(&router, "/app/client.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_string(response).await, "dev bundle");

    let response = common::get(&router, "/app/echo?v=1").await;
    assert_eq!(common::body_string(response).await, "/echo?v=1");

    let response = common::get(&router, "/app/missing.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_string(response).await.contains("<h1>hi</h1>"));
}

#[tokio::test]
async fn test_unreachable_dev_server_falls_through() {
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed.local_addr().unwrap();
    drop(closed);

    let template = common::template_file(common::TEMPLATE);
    let static_assets = StaticMiddleware::new(StaticOptions {
        base: "/app".into(),
        source: AssetSource::DevServer(closed_addr.to_string()),
        verbose: false,
    })
    .unwrap();
    let router = Pipeline::new(catch())
        .with_static(static_assets)
        .with_render(greeting_render(&template))
        .into_router();

    let response = common::get(&router, "/app/client.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_string(response).await.contains("<h1>hi</h1>"));
}

#[tokio::test]
async fn test_suspended_request_does_not_leak_into_another() {
    let template = common::template_file(common::TEMPLATE);
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    let (entered_tx, release_rx) = (entered.clone(), release.clone());
    let render = RenderMiddleware::new(render_options(&template).preload(
        move |location: Location, _candidates: Candidates, _helpers: Helpers| {
            let entered = entered_tx.clone();
            let release = release_rx.clone();
            async move {
                if location.inner == "/a" {
                    entered.notify_one();
                    release.notified().await;
                }
                Ok::<_, BoxError>(Some(PreloadResult::from_json(json!({"greeting": location.inner}))))
            }
        },
    ))
    .unwrap();
    let shared = render.template().clone();
    let original_head = shared.load().original().head.to_string();
    let original_target = shared.load().original().target.to_string();
    let router = Pipeline::new(catch()).with_render(render).into_router();

    let router_a = router.clone();
    let request_a = tokio::spawn(async move { common::get(&router_a, "/app/a").await });
    entered.notified().await;

    let body_b = common::body_string(common::get(&router, "/app/b").await).await;
    release.notify_one();
    let body_a = common::body_string(request_a.await.unwrap()).await;

    assert!(body_a.contains("<div id=\"app\"><h1>/a</h1></div>"));
    assert!(!body_a.contains("<h1>/b</h1>"));
    assert!(body_b.contains("<div id=\"app\"><h1>/b</h1></div>"));
    assert!(!body_b.contains("<h1>/a</h1>"));

    let props_a = decoded_props(&body_a);
    let props_b = decoded_props(&body_b);
    assert_eq!(props_a.get("greeting"), Some(&json!("/a")));
    assert_eq!(props_a.get("inner"), Some(&json!("/a")));
    assert_eq!(props_b.get("greeting"), Some(&json!("/b")));
    assert_eq!(props_b.get("inner"), Some(&json!("/b")));

    assert_eq!(shared.load().original().head, original_head);
    assert_eq!(shared.load().original().target, original_target);
}
