use std::collections::HashMap;
use std::time::Duration;

use auto_core::api::{
    ApiError,
    ApiErrorKind,
    AutoApiClient,
    HttpTransport,
    HttpTransportConfig,
    ListQuery,
};
use auto_store::{LinkPerson, RelationType};
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve mock backend");
    });
    format!("http://{addr}")
}

fn client_for(base_url: &str) -> AutoApiClient {
    let transport =
        HttpTransport::new(HttpTransportConfig::new(base_url, "admin", "secret")).expect("transport");
    AutoApiClient::new(transport)
}

async fn list_applications(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some("Basic YWRtaW46c2VjcmV0");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid credentials"})));
    }
    let environment = query.get("environment").cloned().unwrap_or_default();
    let page: u32 = query
        .get("page")
        .and_then(|page| page.parse().ok())
        .unwrap_or(1);
    (
        StatusCode::OK,
        Json(json!({
            "data": [{
                "id": "app-1",
                "name": "Portal",
                "environment": environment,
                "status": "active",
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-01-01T00:00:00Z"
            }],
            "total": 1,
            "page": page,
            "per_page": 50,
            "total_pages": 1
        })),
    )
}

#[tokio::test]
async fn list_forwards_filters_and_credentials() {
    let base = spawn_backend(Router::new().route("/api/applications", get(list_applications))).await;
    let client = client_for(&base);

    let query = ListQuery::new()
        .with("page", 1)
        .with_opt("environment", Some("stg"));
    let page = client.list_applications(&query).await.expect("list");

    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].environment, "stg");
}

#[tokio::test]
async fn wrong_credentials_are_classified() {
    let base = spawn_backend(Router::new().route("/api/applications", get(list_applications))).await;
    let transport =
        HttpTransport::new(HttpTransportConfig::new(base.as_str(), "admin", "wrong")).expect("transport");
    let client = AutoApiClient::new(transport);

    let err = client
        .list_applications(&ListQuery::new())
        .await
        .expect_err("should fail");
    assert_eq!(err.kind(), Some(ApiErrorKind::Unauthorized));
    assert_eq!(
        err.to_string(),
        "Authentication failed: Invalid credentials. Please check your username and password."
    );
}

#[tokio::test]
async fn status_messages_come_from_body_or_reason() {
    let router = Router::new()
        .route(
            "/api/applications/:id",
            get(|Path(id): Path<String>| async move {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": format!("Application {id} not found")})),
                )
            }),
        )
        .route(
            "/api/applications/:id/people/:person",
            post(|| async { (StatusCode::CONFLICT, Json(json!({"error": "already linked"}))) }),
        )
        .route(
            "/api/dashboard/stats",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
    let client = client_for(&spawn_backend(router).await);

    let missing = client.get_application("app-9").await.expect_err("404");
    assert_eq!(
        missing.to_string(),
        "Resource not found: Application app-9 not found. Please check the ID is correct."
    );

    let conflict = client
        .link_application("app-1", RelationType::Person, "p-1", &LinkPerson::default())
        .await
        .expect_err("409");
    assert_eq!(conflict.kind(), Some(ApiErrorKind::Conflict));
    assert!(conflict.to_string().starts_with("Conflict: already linked."));

    let server = client.dashboard_stats().await.expect_err("500");
    assert_eq!(
        server.to_string(),
        "Server error: Internal Server Error. Please try again later or contact support."
    );
}

#[tokio::test]
async fn empty_responses_and_search() {
    let router = Router::new()
        .route(
            "/api/applications/:id/stacks/:stack",
            delete(|| async { StatusCode::NO_CONTENT }),
        )
        .route(
            "/api/search",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "applications": [],
                    "domains": [{"id": "d-1", "fqdn": format!("{}.example.org", query["q"])}]
                }))
            }),
        );
    let client = client_for(&spawn_backend(router).await);

    client
        .unlink_application("app-1", RelationType::Stack, "s-1")
        .await
        .expect("204 is success");

    let results = client.global_search("git").await.expect("search");
    assert_eq!(results.total(), 1);
    assert_eq!(results.domains[0].fqdn, "git.example.org");
}

#[tokio::test]
async fn unreachable_backend_names_instance() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let base = format!("http://{addr}");
    let err = client_for(&base)
        .dashboard_stats()
        .await
        .expect_err("nothing listening");
    assert_eq!(err, ApiError::Unreachable { base_url: base });
}

#[tokio::test]
async fn slow_backend_times_out() {
    let router = Router::new().route(
        "/api/dashboard/stats",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    );
    let base = spawn_backend(router).await;
    let config = HttpTransportConfig::new(base, "admin", "secret")
        .with_timeout(Duration::from_millis(200));
    let client = AutoApiClient::new(HttpTransport::new(config).expect("transport"));

    let err = client.dashboard_stats().await.expect_err("timeout");
    assert_eq!(err, ApiError::Timeout);
}
