//! API regression tests.
//!
//! Drives the full router over an in-memory state store: seeds an app and
//! release through the API, then reads and changes its formation.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use formation_api::{build_router, standalone_reconciler};
use formation_core::{App, Capacity, Event, EventSink};
use formation_state::StateStore;

const MANIFEST: &str = r#"
[[services]]
name = "web"
ports = ["80:5000"]

[[services]]
name = "queue-worker"
"#;

#[derive(Default)]
struct RecordingEvents(Mutex<Vec<Event>>);

impl EventSink for RecordingEvents {
    fn send(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }
}

fn test_router(store: &StateStore, events: Arc<RecordingEvents>) -> Router {
    let capacity = Capacity {
        instance_cpu: 1024,
        instance_memory: 2048,
    };
    let formations = standalone_reconciler(store.clone(), capacity, events);
    build_router(store.clone(), formations)
}

fn json_request(method: &str, uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create the `shop` app with mixed-scheme parameters and promote R1.
async fn seed(router: &Router) {
    let app = serde_json::json!({
        "name": "shop",
        "parameters": {
            "WebFormation": "2,256,512",
            "WebPort80Host": "30000",
            "WebPort443Host": "30001",
            "QueueWorkerDesiredCount": "1",
            "QueueWorkerMemory": "128"
        },
        "outputs": {
            "BalancerHost": "shared.lb",
            "BalancerWebHost": "web.lb"
        },
        "tags": { "Rack": "prod" }
    });
    let resp = router
        .clone()
        .oneshot(json_request("PUT", "/api/v1/apps/shop", app.to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let release = serde_json::json!({ "manifest": MANIFEST });
    let resp = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/apps/shop/releases/R1",
            release.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn list_formation_of_unreleased_app_is_empty() {
    let store = StateStore::open_in_memory().unwrap();
    store
        .put_app(&App {
            name: "fresh".to_string(),
            ..Default::default()
        })
        .unwrap();
    let router = test_router(&store, Arc::default());

    let resp = router
        .oneshot(get("/api/v1/apps/fresh/formation"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn list_formation_of_unknown_app() {
    let store = StateStore::open_in_memory().unwrap();
    let router = test_router(&store, Arc::default());

    let resp = router
        .oneshot(get("/api/v1/apps/ghost/formation"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_formation_in_manifest_order() {
    let store = StateStore::open_in_memory().unwrap();
    let router = test_router(&store, Arc::default());
    seed(&router).await;

    let resp = router
        .oneshot(get("/api/v1/apps/shop/formation"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);

    assert_eq!(data[0]["name"], "web");
    assert_eq!(data[0]["count"], 2);
    assert_eq!(data[0]["cpu"], 256);
    assert_eq!(data[0]["memory"], 512);
    assert_eq!(data[0]["ports"], serde_json::json!([80, 443]));
    assert_eq!(data[0]["balancer"], "web.lb");

    assert_eq!(data[1]["name"], "queue-worker");
    assert_eq!(data[1]["cpu"], 0);
    assert_eq!(data[1]["balancer"], "shared.lb");
}

#[tokio::test]
async fn save_formation_updates_parameters() {
    let store = StateStore::open_in_memory().unwrap();
    let events = Arc::new(RecordingEvents::default());
    let router = test_router(&store, events.clone());
    seed(&router).await;

    let resp = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/apps/shop/formation/queue-worker",
            r#"{"count":3,"memory":256}"#.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let app = store.get_app("shop").unwrap().unwrap();
    assert_eq!(app.parameters["QueueWorkerDesiredCount"], "3");
    assert_eq!(app.parameters["QueueWorkerCpu"], "0");
    assert_eq!(app.parameters["QueueWorkerMemory"], "256");
    assert!(!app.parameters.contains_key("QueueWorkerFormation"));

    let sent = events.0.lock().unwrap();
    assert_eq!(sent.as_slice(), &[Event::scale("shop", "R1")]);
}

#[tokio::test]
async fn save_formation_keeps_combined_scheme() {
    let store = StateStore::open_in_memory().unwrap();
    let router = test_router(&store, Arc::default());
    seed(&router).await;

    let resp = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/apps/shop/formation/web",
            r#"{"count":-1}"#.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let app = store.get_app("shop").unwrap().unwrap();
    assert_eq!(app.parameters["WebFormation"], "-1,256,512");
    assert!(!app.parameters.contains_key("WebDesiredCount"));
}

#[tokio::test]
async fn save_formation_rejects_invalid_requests() {
    let store = StateStore::open_in_memory().unwrap();
    let events = Arc::new(RecordingEvents::default());
    let router = test_router(&store, events.clone());
    seed(&router).await;

    for body in [r#"{"count":-2}"#, r#"{"cpu":2048}"#, r#"{"cpu":-1}"#, r#"{"memory":4096}"#] {
        let resp = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/apps/shop/formation/web",
                body.to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }

    assert!(events.0.lock().unwrap().is_empty());
    let app = store.get_app("shop").unwrap().unwrap();
    assert_eq!(app.parameters["WebFormation"], "2,256,512");
}

#[tokio::test]
async fn save_formation_without_changes_conflicts() {
    let store = StateStore::open_in_memory().unwrap();
    let router = test_router(&store, Arc::default());
    seed(&router).await;

    let resp = router
        .oneshot(json_request(
            "POST",
            "/api/v1/apps/shop/formation/web",
            r#"{"count":2}"#.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body = body_json(resp).await;
    assert_eq!(body["error"], "no updates are to be performed: shop");
}

#[tokio::test]
async fn colliding_stack_name_leaves_owner_untouched() {
    let store = StateStore::open_in_memory().unwrap();
    let router = test_router(&store, Arc::default());
    seed(&router).await;

    let squatter = serde_json::json!({
        "name": "prod-shop",
        "parameters": { "WebFormation": "1,0,256" }
    });
    let resp = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/apps/prod-shop",
            squatter.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = router
        .oneshot(json_request(
            "POST",
            "/api/v1/apps/shop/formation/web",
            r#"{"count":5}"#.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let app = store.get_app("shop").unwrap().unwrap();
    assert_eq!(app.parameters["WebFormation"], "5,256,512");
    assert!(store.get_app("prod-shop").unwrap().is_none());
}

#[tokio::test]
async fn get_formation_of_undeclared_process() {
    let store = StateStore::open_in_memory().unwrap();
    let router = test_router(&store, Arc::default());
    seed(&router).await;

    let resp = router
        .oneshot(get("/api/v1/apps/shop/formation/clock"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_stored_formation_is_reported() {
    let store = StateStore::open_in_memory().unwrap();
    let router = test_router(&store, Arc::default());
    seed(&router).await;

    let mut app = store.get_app("shop").unwrap().unwrap();
    app.parameters
        .insert("WebFormation".to_string(), "2,256".to_string());
    store.put_app(&app).unwrap();

    let resp = router
        .oneshot(get("/api/v1/apps/shop/formation/web"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(resp).await;
    assert_eq!(
        body["error"],
        "web formation settings not in Count,Cpu,Memory format"
    );
}
