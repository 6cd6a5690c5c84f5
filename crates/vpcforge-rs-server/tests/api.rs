//! HTTP surface tests driving the router in-process.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use vpcforge_rs_config::{OrchestratorConfig, ServerConfig};
use vpcforge_rs_core::Orchestrator;
use vpcforge_rs_protocol::Tag;
use vpcforge_rs_provider::{NetworkProvider, ProviderError};
use vpcforge_rs_server::{AppState, REQUEST_ID_HEADER, router};
use vpcforge_rs_store::InMemoryMetadataStore;
use vpcforge_rs_test_utils::{FaultyProvider, ProviderOp, local_provider};

const API_KEY: &str = "test-key";

fn app_with(provider: Arc<dyn NetworkProvider>, server: ServerConfig) -> Router {
    let orchestrator = Orchestrator::new(
        provider,
        Arc::new(InMemoryMetadataStore::new()),
        OrchestratorConfig::default(),
    );
    let state = AppState::new(orchestrator, &server).expect("state");
    router(state)
}

fn app() -> Router {
    app_with(Arc::new(local_provider()), ServerConfig::default())
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

async fn create(app: &Router, name: &str) -> Value {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/vpc",
            Some(json!({ "name": name, "cidr_block": "10.0.0.0/16" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

/// Create, read back, list and delete through the HTTP surface.
#[tokio::test]
async fn network_lifecycle() {
    let app = app();

    let created = create(&app, "test-vpc-1").await;
    assert_eq!(created["success"], json!(true));
    assert_eq!(created["message"], json!("VPC 'test-vpc-1' created successfully"));
    let data = &created["data"];
    let vpc_id = data["vpc_id"].as_str().expect("vpc id").to_string();
    assert_eq!(data["status"], json!("available"));
    assert_eq!(data["subnets"][0]["cidr_block"], json!("10.0.1.0/24"));
    assert_eq!(data["subnets"][0]["type"], json!("public"));
    assert_eq!(data["subnets"][1]["cidr_block"], json!("10.0.2.0/24"));
    assert_eq!(data["subnets"][1]["type"], json!("private"));
    assert!(data["route_tables"]["public"].is_string());

    let (status, fetched) = send(&app, request(Method::GET, &format!("/vpc/{vpc_id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&fetched["data"], data);

    let (status, listed) = send(&app, request(Method::GET, "/vpc", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"]["count"], json!(1));
    assert_eq!(listed["data"]["vpcs"][0]["vpc_id"], json!(vpc_id));

    let (status, deleted) =
        send(&app, request(Method::DELETE, &format!("/vpc/{vpc_id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"]["status"], json!("deleted"));
    assert_eq!(
        deleted["message"],
        json!(format!(
            "VPC '{vpc_id}' and all associated resources deleted successfully"
        ))
    );

    let (status, listed) = send(&app, request(Method::GET, "/vpc", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"]["count"], json!(0));

    let (status, body) =
        send(&app, request(Method::DELETE, &format!("/vpc/{vpc_id}"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
}

/// Missing and malformed bodies are validation errors.
#[tokio::test]
async fn create_rejects_bad_bodies() {
    let app = app();

    let (status, body) = send(&app, request(Method::POST, "/vpc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("Request body is required"));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/vpc")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .expect("request");
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("Invalid JSON in request body"));

    let (status, body) = send(&app, request(Method::POST, "/vpc", Some(json!({})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("VPC name is required"));

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/vpc",
            Some(json!({ "name": "web", "cidr_block": "10.0.0.0/8" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

/// Ids are validated before the store is consulted.
#[tokio::test]
async fn ids_are_checked() {
    let app = app();

    let (status, body) = send(&app, request(Method::GET, "/vpc/not-a-vpc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));

    let (status, body) = send(&app, request(Method::GET, "/vpc/vpc-12345678", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], json!("VPC not found: vpc-12345678"));
}

#[tokio::test]
async fn list_limit_is_parsed() {
    let app = app();
    create(&app, "first").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    create(&app, "second").await;

    let (status, body) = send(&app, request(Method::GET, "/vpc?limit=1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], json!(1));
    assert_eq!(body["data"]["vpcs"][0]["name"], json!("second"));

    let (status, body) = send(&app, request(Method::GET, "/vpc?limit=abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("limit must be a positive integer"));

    let (status, _) = send(&app, request(Method::GET, "/vpc?limit=0", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// A configured key is required on every route.
#[tokio::test]
async fn api_key_is_enforced() {
    let server = ServerConfig {
        api_key: Some(API_KEY.to_string()),
        ..Default::default()
    };
    let app = app_with(Arc::new(local_provider()), server);

    let (status, body) = send(&app, request(Method::GET, "/vpc", None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));

    let wrong = Request::builder()
        .uri("/vpc")
        .header("x-api-key", "nope")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let authorized = Request::builder()
        .uri("/vpc")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(&app, authorized).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], json!(0));
}

/// The caller's request id is echoed and tagged onto created resources.
#[tokio::test]
async fn request_id_flows_into_tags() {
    let provider = Arc::new(local_provider());
    let app = app_with(provider.clone(), ServerConfig::default());

    let req = Request::builder()
        .method(Method::POST)
        .uri("/vpc")
        .header(header::CONTENT_TYPE, "application/json")
        .header(REQUEST_ID_HEADER, "req-42")
        .body(Body::from(json!({ "name": "tagged" }).to_string()))
        .expect("request");
    let response = app.clone().oneshot(req).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok()),
        Some("req-42")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    let vpc_id = body["data"]["vpc_id"].as_str().expect("vpc id");
    assert!(
        provider
            .tags_for(vpc_id)
            .contains(&Tag::new("RequestId", "req-42"))
    );

    let response = app
        .oneshot(request(Method::GET, "/vpc", None))
        .await
        .expect("response");
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

/// Provider quota errors are the caller's problem: 400 with the provider code.
#[tokio::test]
async fn limit_exceeded_is_bad_request() {
    let app = app_with(
        Arc::new(local_provider().with_max_networks(1)),
        ServerConfig::default(),
    );
    create(&app, "one").await;

    let (status, body) = send(
        &app,
        request(Method::POST, "/vpc", Some(json!({ "name": "two" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        json!("VPC limit exceeded. Please delete unused VPCs or request a limit increase.")
    );
    assert_eq!(
        body["error"]["details"]["provider_error"],
        json!("VpcLimitExceeded")
    );
}

/// Transient provider failures are a bad gateway and leave nothing behind.
#[tokio::test]
async fn provider_failure_is_bad_gateway() {
    let provider = Arc::new(FaultyProvider::default());
    provider.fail_once(
        ProviderOp::CreateSubnet,
        ProviderError::Unavailable("injected".to_string()),
    );
    let app = app_with(provider.clone(), ServerConfig::default());

    let (status, body) = send(
        &app,
        request(Method::POST, "/vpc", Some(json!({ "name": "flaky" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], json!("PROVIDER_ERROR"));
    assert_eq!(
        body["error"]["details"]["step"],
        json!("create public subnet")
    );
    assert!(provider.inner().resource_counts().is_empty());

    let (_, listed) = send(&app, request(Method::GET, "/vpc", None)).await;
    assert_eq!(listed["data"]["count"], json!(0));
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let app = app();
    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/vpc")
        .header(header::ORIGIN, "https://console.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(preflight).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn unknown_routes_use_the_envelope() {
    let (status, body) = send(&app(), request(Method::GET, "/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
}
