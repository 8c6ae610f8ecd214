//! End-to-end tests through the outer router: pinned HTTP surface,
//! rebuild trigger flow, and failure behaviour under a broken catalog.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use tagserve::catalog::FixedCatalog;
use tagserve::http::{HttpServer, RouteTableBuilder, SwapHandle};
use tagserve::rebuild::{trigger, RebuildCoordinator, RebuildTrigger};
use tagserve::Shutdown;

struct TestServer {
    app: Router,
    catalog: Arc<FixedCatalog>,
    coordinator: Option<RebuildCoordinator>,
    trigger: RebuildTrigger,
    shutdown: Shutdown,
}

/// Assemble the full stack with the initial build installed. The
/// coordinator is handed back un-spawned so tests choose whether to run
/// the loop or drive rebuilds directly.
async fn server_with(versions: Vec<&str>) -> TestServer {
    let config = common::config();
    let catalog = common::catalog(versions.into_iter().map(|v| common::version(v, &[])).collect());
    let handle = SwapHandle::new();
    let builder = RouteTableBuilder::new(&config).unwrap();
    let (rebuild_trigger, trigger_rx) = trigger::channel();
    let shutdown = Shutdown::new();

    let coordinator = RebuildCoordinator::new(
        catalog.clone(),
        builder,
        handle.clone(),
        &config.rebuild,
        trigger_rx,
    );
    coordinator.rebuild_now().await.unwrap();

    let server = HttpServer::new(&config, handle, rebuild_trigger.clone());
    TestServer {
        app: server.router(),
        catalog,
        coordinator: Some(coordinator),
        trigger: rebuild_trigger,
        shutdown,
    }
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn pinned_http_surface() {
    let server = server_with(vec!["v1", "kor/2.0"]).await;
    let app = &server.app;

    // Landing page lists versions and links.
    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("/versions/v1/"));
    assert!(page.contains("/versions/kor/2.0/"));

    // Version content, 404s for unknown name and unknown path.
    let response = get(app, "/versions/v1/index.html").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "<h1>v1</h1>");
    assert_eq!(
        get(app, "/versions/v9/index.html").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        get(app, "/versions/v1/missing.html").await.status(),
        StatusCode::NOT_FOUND
    );

    // Unversioned tree and bundled assets.
    let response = get(app, "/all/index.html").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "latest build");
    assert_eq!(
        get(app, "/static/style.css").await.status(),
        StatusCode::OK
    );

    // Liveness.
    let response = get(app, "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("\"versions\":2"));
}

#[tokio::test]
async fn demo_catalog_serves_out_of_the_box() {
    let config = common::config();
    let catalog = Arc::new(tagserve::catalog::FixedCatalog::demo());
    let handle = SwapHandle::new();
    let (rebuild_trigger, trigger_rx) = trigger::channel();
    let coordinator = RebuildCoordinator::new(
        catalog,
        RouteTableBuilder::new(&config).unwrap(),
        handle.clone(),
        &config.rebuild,
        trigger_rx,
    );
    coordinator.rebuild_now().await.unwrap();
    let app = HttpServer::new(&config, handle, rebuild_trigger).router();

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("/versions/demo/1.0.0/"));

    assert_eq!(
        get(&app, "/versions/demo/1.1.0/index.html").await.status(),
        StatusCode::OK
    );
    assert_eq!(get(&app, "/all/").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn content_responses_carry_max_age_and_request_id() {
    let server = server_with(vec!["v1"]).await;
    let response = get(&server.app, "/versions/v1/index.html").await;

    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .expect("content responses carry Cache-Control")
        .to_str()
        .unwrap();
    let max_age: u64 = cache_control
        .strip_prefix("max-age=")
        .unwrap()
        .parse()
        .unwrap();
    assert!(max_age <= common::config().rebuild.poll_interval_secs);

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn rebuild_endpoint_debounces_and_never_waits() {
    // No coordinator loop running: the slot stays occupied.
    let server = server_with(vec!["v1"]).await;

    let response = post(&server.app, "/api/controllers/rebuild").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(body_text(response).await.contains("queued"));

    let response = post(&server.app, "/api/controllers/rebuild").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(body_text(response).await.contains("already-pending"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn trigger_driven_rebuild_picks_up_new_versions() {
    let mut server = server_with(vec!["v1"]).await;
    tokio::spawn(server.coordinator.take().unwrap().run(server.shutdown.subscribe()));

    assert_eq!(
        get(&server.app, "/versions/v2/index.html").await.status(),
        StatusCode::NOT_FOUND
    );

    server
        .catalog
        .set_versions(vec![common::version("v1", &[]), common::version("v2", &[])]);
    let response = post(&server.app, "/api/controllers/rebuild").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // The endpoint returns before the rebuild lands; poll for the swap.
    let mut installed = false;
    for _ in 0..100 {
        if get(&server.app, "/versions/v2/index.html").await.status() == StatusCode::OK {
            installed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(installed, "new version never became routable");
    // The old version keeps serving throughout.
    assert_eq!(
        get(&server.app, "/versions/v1/index.html").await.status(),
        StatusCode::OK
    );

    server.shutdown.trigger();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn broken_catalog_leaves_old_generation_serving() {
    let mut server = server_with(vec!["v1"]).await;
    tokio::spawn(server.coordinator.take().unwrap().run(server.shutdown.subscribe()));

    server.catalog.set_failing(true);
    assert_eq!(
        post(&server.app, "/api/controllers/rebuild").await.status(),
        StatusCode::ACCEPTED
    );
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(
        get(&server.app, "/versions/v1/index.html").await.status(),
        StatusCode::OK
    );

    server.shutdown.trigger();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn coordinator_stops_on_shutdown() {
    let mut server = server_with(vec!["v1"]).await;
    let task = tokio::spawn(server.coordinator.take().unwrap().run(server.shutdown.subscribe()));

    server.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("rebuild loop did not stop")
        .unwrap();

    // With the receiver gone, trigger requests report the drop.
    assert!(!server.trigger.request());
}
