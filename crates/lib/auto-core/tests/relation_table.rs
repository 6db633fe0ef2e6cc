use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use auto_core::api::{ApiErrorKind, AutoApiClient, HttpTransport, HttpTransportConfig};
use auto_core::relations::{
    LinkMode,
    ParentAccessor,
    RelationConfigTable,
    RelationEntity,
};
use auto_store::{ApplicationDetail, PageRequest, RelationType, ServiceDetail};
use axum::extract::{Path, Query};
use axum::routing::{get, post};
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

fn detail(infra: &[&str]) -> ApplicationDetail {
    let infra: Vec<Value> = infra
        .iter()
        .map(|id| json!({"id": id, "name": format!("host-{id}"), "type": "vm"}))
        .collect();
    serde_json::from_value(json!({
        "id": "app-1",
        "name": "Portal",
        "environment": "prd",
        "status": "active",
        "infra": infra,
        "stacks": [{"id": "s-1", "name": "Rust"}]
    }))
    .expect("application detail")
}

fn shared_parent(initial: ApplicationDetail) -> (Arc<Mutex<Option<ApplicationDetail>>>, ParentAccessor<ApplicationDetail>) {
    let cell = Arc::new(Mutex::new(Some(initial)));
    let accessor: ParentAccessor<ApplicationDetail> = {
        let cell = Arc::clone(&cell);
        Arc::new(move || cell.lock().expect("parent").clone())
    };
    (cell, accessor)
}

fn offline_table() -> RelationConfigTable {
    let (_, parent) = shared_parent(detail(&[]));
    RelationConfigTable::for_application(&client_for("http://127.0.0.1:9"), "app-1", parent)
}

#[test]
fn application_table_covers_every_type() {
    let table = offline_table();
    assert_eq!(table.len(), RelationType::ALL.len());
    assert_eq!(table.kinds().collect::<Vec<_>>(), RelationType::ALL);

    let stack = table.get(RelationType::Stack).expect("stack");
    assert_eq!(stack.mode(), LinkMode::Direct);
    assert!(!stack.can_edit());
    assert!(!stack.has_link_form());

    let health = table.get(RelationType::Health).expect("health");
    assert!(health.create_only());
    assert!(health.has_fetch_for_edit());
    assert_eq!(health.titles().title, "Healthchecks");
    assert_eq!(health.titles().empty_message, "No healthchecks configured");

    for kind in [
        RelationType::Infra,
        RelationType::Service,
        RelationType::Domain,
        RelationType::Person,
        RelationType::Share,
    ] {
        let config = table.get(kind).expect("configured");
        assert_eq!(config.mode(), LinkMode::Form);
        assert!(config.can_edit());
    }
    assert_eq!(table.get(RelationType::Stack).expect("stack").titles().title, "Tech Stack");
}

#[test]
fn exclude_ids_follow_the_parent() {
    let (cell, parent) = shared_parent(detail(&["i-1"]));
    let table = RelationConfigTable::for_application(&client_for("http://127.0.0.1:9"), "app-1", parent);
    let infra = table.get(RelationType::Infra).expect("infra");

    assert_eq!(infra.exclude_ids(), ["i-1"]);
    *cell.lock().expect("parent") = Some(detail(&["i-1", "i-2"]));
    assert_eq!(infra.exclude_ids(), ["i-1", "i-2"]);
    assert_eq!(
        table.get(RelationType::Stack).expect("stack").exclude_ids(),
        ["s-1"]
    );

    *cell.lock().expect("parent") = None;
    assert!(infra.exclude_ids().is_empty());
}

#[test]
fn health_create_form_starts_from_parent() {
    let (_, parent) = shared_parent(detail(&[]));
    let table = RelationConfigTable::for_application(&client_for("http://127.0.0.1:9"), "app-1", parent);
    let defaults = table
        .get(RelationType::Health)
        .expect("health")
        .create_form_defaults()
        .expect("defaults");

    assert_eq!(defaults.application_id.as_deref(), Some("app-1"));
    assert_eq!(defaults.service_id, None);
    assert_eq!(defaults.name.as_deref(), Some("Portal"));
    assert_eq!(defaults.target_name.as_deref(), Some("Portal"));
}

#[test]
fn service_table_has_infra_and_health() {
    let service: ServiceDetail = serde_json::from_value(json!({
        "id": "svc-1",
        "name": "Postgres",
        "environment": "prd",
        "infra": [{"id": "i-3", "name": "db-1", "type": "server"}]
    }))
    .expect("service detail");
    let parent: ParentAccessor<ServiceDetail> = Arc::new(move || Some(service.clone()));
    let table = RelationConfigTable::for_service(&client_for("http://127.0.0.1:9"), "svc-1", parent);

    assert_eq!(
        table.kinds().collect::<Vec<_>>(),
        [RelationType::Infra, RelationType::Health]
    );
    assert_eq!(table.get(RelationType::Infra).expect("infra").exclude_ids(), ["i-3"]);
    let defaults = table
        .get(RelationType::Health)
        .expect("health")
        .create_form_defaults()
        .expect("defaults");
    assert_eq!(defaults.service_id.as_deref(), Some("svc-1"));
    assert_eq!(defaults.name.as_deref(), Some("Postgres"));
}

#[tokio::test]
async fn domain_listing_uses_fqdn_as_name() {
    let router = Router::new().route(
        "/api/domains",
        get(|Query(query): Query<HashMap<String, String>>| async move {
            let per_page: u32 = query
                .get("per_page")
                .and_then(|value| value.parse().ok())
                .unwrap_or(50);
            Json(json!({
                "data": [{"id": "d-1", "fqdn": "portal.example.org"}],
                "total": 1,
                "page": 1,
                "per_page": per_page,
                "total_pages": 1
            }))
        }),
    );
    let base = spawn_backend(router).await;
    let (_, parent) = shared_parent(detail(&[]));
    let table = RelationConfigTable::for_application(&client_for(&base), "app-1", parent);

    let page = table
        .get(RelationType::Domain)
        .expect("domain")
        .list(PageRequest::new(1, 20))
        .await
        .expect("list");
    assert_eq!(page.data[0].id, "d-1");
    assert_eq!(page.data[0].name, "portal.example.org");
    assert_eq!(page.data[0].environment, None);
    assert_eq!(page.per_page, 20);
}

#[tokio::test]
async fn link_posts_typed_metadata() {
    let received = Arc::new(Mutex::new(Vec::<(String, String, Value)>::new()));
    let router = {
        let received = Arc::clone(&received);
        Router::new().route(
            "/api/applications/:app/infra/:child",
            post(move |Path((app, child)): Path<(String, String)>, Json(body): Json<Value>| {
                let received = Arc::clone(&received);
                async move {
                    received.lock().expect("received").push((app, child, body));
                    Json(json!({"ok": true}))
                }
            }),
        )
    };
    let base = spawn_backend(router).await;
    let (_, parent) = shared_parent(detail(&[]));
    let table = RelationConfigTable::for_application(&client_for(&base), "app-1", parent);
    let infra = table.get(RelationType::Infra).expect("infra");

    infra
        .link("i-9".to_string(), json!({"notes": "primary"}))
        .await
        .expect("link");
    assert_eq!(
        *received.lock().expect("received"),
        [("app-1".to_string(), "i-9".to_string(), json!({"notes": "primary"}))]
    );
}

#[tokio::test]
async fn invalid_metadata_is_rejected_before_any_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = {
        let hits = Arc::clone(&hits);
        Router::new().fallback(move || {
            hits.fetch_add(1, Ordering::SeqCst);
            async { Json(json!({})) }
        })
    };
    let base = spawn_backend(router).await;
    let (_, parent) = shared_parent(detail(&[]));
    let table = RelationConfigTable::for_application(&client_for(&base), "app-1", parent);

    let err = table
        .get(RelationType::Stack)
        .expect("stack")
        .link("s-2".to_string(), json!({"notes": "stacks take none"}))
        .await
        .expect_err("rejected");
    assert_eq!(err.kind(), Some(ApiErrorKind::Validation));

    let err = table
        .get(RelationType::Domain)
        .expect("domain")
        .create(json!({"name": "missing fqdn"}))
        .await
        .expect_err("rejected");
    assert_eq!(err.kind(), Some(ApiErrorKind::Validation));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn health_edit_loads_full_record_and_unlink_deletes() {
    let deleted = Arc::new(Mutex::new(Vec::<String>::new()));
    let router = {
        let deleted = Arc::clone(&deleted);
        Router::new().route(
            "/api/healthchecks/:id",
            get(|Path(id): Path<String>| async move {
                Json(json!({
                    "id": id,
                    "name": "Portal up",
                    "domain_id": "d-1",
                    "protocol": "https",
                    "path": "/health",
                    "method": "GET",
                    "expected_status": 200,
                    "timeout_seconds": 10,
                    "is_enabled": true,
                    "domain_fqdn": "portal.example.org"
                }))
            })
            .delete(move |Path(id): Path<String>| {
                let deleted = Arc::clone(&deleted);
                async move {
                    deleted.lock().expect("deleted").push(id);
                    axum::http::StatusCode::NO_CONTENT
                }
            }),
        )
    };
    let base = spawn_backend(router).await;
    let (_, parent) = shared_parent(detail(&[]));
    let table = RelationConfigTable::for_application(&client_for(&base), "app-1", parent);
    let health = table.get(RelationType::Health).expect("health");

    let full = health
        .fetch_for_edit(RelationEntity::new("h-1", "Portal up"))
        .await
        .expect("fetch");
    assert_eq!(full.id, "h-1");
    assert_eq!(full.name, "Portal up");
    assert_eq!(full.data["timeout_seconds"], json!(10));
    assert_eq!(full.data["domain_fqdn"], json!("portal.example.org"));

    health.unlink("h-1".to_string()).await.expect("unlink");
    assert_eq!(*deleted.lock().expect("deleted"), ["h-1"]);
}
