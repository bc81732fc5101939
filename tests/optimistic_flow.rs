//! End-to-end runs of the optimistic mutation flow against a mock service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use todo_sync::model::{PageKey, TodoPatch};
use todo_sync::store::TodoStore;
use todo_sync::sync::{MutationIntent, MutationOutcome};
use todo_sync::TodoClient;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn entry_json(id: Uuid, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": "placeholder",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": null,
        "deleted": false,
        "done": false
    })
}

fn list_body(entries: &[serde_json::Value], total: u64) -> serde_json::Value {
    json!({
        "success": true,
        "results": total,
        "todo_entries": entries
    })
}

async fn mount_list(server: &MockServer, body: serde_json::Value, times: Option<u64>) {
    let mut mock = Mock::given(method("GET"))
        .and(path("/todo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body));
    if let Some(times) = times {
        mock = mock.up_to_n_times(times);
    }
    mock.mount(server).await;
}

// Scenario: empty list, create one entry, remote succeeds, refetch confirms.
#[tokio::test]
async fn test_create_inserts_optimistically_and_reconciles() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/todo"))
        .and(body_partial_json(json!({ "title": "Buy groceries" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "todo_entry": entry_json(Uuid::new_v4(), "Buy groceries")
        })))
        .mount(&mock_server)
        .await;
    mount_list(
        &mock_server,
        list_body(&[entry_json(Uuid::new_v4(), "Buy groceries")], 1),
        None,
    )
    .await;

    let client = TodoClient::new(&mock_server.uri());
    let coordinator = client.coordinator(PageKey::new(10, 1));
    assert_eq!(coordinator.snapshot().total, 0);

    // The title reaches the wire trimmed.
    let outcome = coordinator.create("  Buy groceries  ", None).await.unwrap();
    assert!(matches!(
        outcome,
        MutationOutcome::Reconciled { confirmed: Some(_) }
    ));

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.total, 1);
    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(snapshot.entries[0].title, "Buy groceries");
}

// Scenario: an update is visible immediately, then rolls back when the
// remote call fails, and the handed-back intent retries cleanly.
#[tokio::test]
async fn test_failed_update_rolls_back_and_retries() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4();

    mount_list(&mock_server, list_body(&[entry_json(id, "Original todo")], 1), None).await;

    // First attempt fails after a delay, so the optimistic state is
    // observable in flight; the retry then succeeds.
    Mock::given(method("PUT"))
        .and(path(format!("/todo/{}", id)))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("upstream unavailable")
                .set_delay(Duration::from_millis(200)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/todo/{}", id)))
        .and(body_partial_json(json!({ "title": "Updated todo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "todo_entry": entry_json(id, "Updated todo")
        })))
        .mount(&mock_server)
        .await;

    let client = TodoClient::new(&mock_server.uri());
    let coordinator = Arc::new(client.coordinator(PageKey::new(10, 1)));
    coordinator.refresh().await.unwrap();
    assert_eq!(coordinator.snapshot().entries[0].title, "Original todo");

    let patch = TodoPatch::new().with_title("Updated todo");
    let pending = {
        let coordinator = Arc::clone(&coordinator);
        let patch = patch.clone();
        tokio::spawn(async move { coordinator.update(id, patch).await })
    };

    // The optimistic title shows before the remote call resolves.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(coordinator.snapshot().entries[0].title, "Updated todo");

    let outcome = pending.await.unwrap().unwrap();
    let retry = match outcome {
        MutationOutcome::RolledBack { error, retry } => {
            assert!(error.is_transport());
            retry
        }
        other => panic!("expected RolledBack, got {:?}", other),
    };
    assert_eq!(coordinator.snapshot().entries[0].title, "Original todo");
    assert_eq!(
        retry,
        MutationIntent::Update {
            id,
            patch: patch.clone()
        }
    );

    let outcome = coordinator.retry(retry).await.unwrap();
    assert!(matches!(outcome, MutationOutcome::Reconciled { .. }));
}

// Scenario: deleting an id that is not on the current page touches nothing
// locally, and the remote 404 needs no rollback.
#[tokio::test]
async fn test_delete_of_unknown_id_leaves_cache_unchanged() {
    let mock_server = MockServer::start().await;
    let cached = Uuid::new_v4();
    let missing = Uuid::new_v4();

    mount_list(&mock_server, list_body(&[entry_json(cached, "Kept")], 1), None).await;
    Mock::given(method("DELETE"))
        .and(path(format!("/todo/{}", missing)))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Todo not found" })),
        )
        .mount(&mock_server)
        .await;

    let client = TodoClient::new(&mock_server.uri());
    let coordinator = client.coordinator(PageKey::new(10, 1));
    coordinator.refresh().await.unwrap();
    let before = coordinator.snapshot();

    let outcome = coordinator.delete(missing).await.unwrap();
    match outcome {
        MutationOutcome::RolledBack { error, .. } => assert!(error.is_not_found()),
        other => panic!("expected RolledBack, got {:?}", other),
    }
    assert_eq!(coordinator.snapshot(), before);
    assert_eq!(coordinator.snapshot().total, 1);
}

// Scenario: two independent mutations in flight at once, each reconciling on
// its own without disturbing the other.
#[tokio::test]
async fn test_independent_mutations_resolve_independently() {
    let mock_server = MockServer::start().await;
    let delete_id = Uuid::new_v4();
    let update_id = Uuid::new_v4();

    mount_list(
        &mock_server,
        list_body(
            &[entry_json(delete_id, "Old entry"), entry_json(update_id, "Keep me")],
            2,
        ),
        Some(1),
    )
    .await;
    mount_list(&mock_server, list_body(&[entry_json(update_id, "Keep me, done")], 1), None).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/todo/{}", delete_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "Todo removed." }))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/todo/{}", update_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "success": true,
                    "todo_entry": entry_json(update_id, "Keep me, done")
                }))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&mock_server)
        .await;

    let client = TodoClient::new(&mock_server.uri());
    let coordinator = client.coordinator(PageKey::new(10, 1));
    coordinator.refresh().await.unwrap();
    assert_eq!(coordinator.snapshot().total, 2);

    let (deleted, updated) = tokio::join!(
        coordinator.delete(delete_id),
        coordinator.set_done(update_id, true)
    );
    assert!(matches!(
        deleted.unwrap(),
        MutationOutcome::Reconciled { confirmed: None }
    ));
    assert!(matches!(
        updated.unwrap(),
        MutationOutcome::Reconciled { confirmed: Some(_) }
    ));

    // Both refetches have landed; the cache holds server truth.
    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.total, 1);
    assert_eq!(snapshot.entries[0].id, update_id);
}

// Round-trip: create, then fetch by id; the stored entry matches the input.
#[tokio::test]
async fn test_create_then_fetch_round_trip() {
    let mock_server = MockServer::start().await;
    let client = TodoClient::new(&mock_server.uri());
    let store = client.store();

    let candidate = todo_sync::model::NewTodo::new("Cycle around town", None);
    let body = entry_json(candidate.id, "Cycle around town");

    Mock::given(method("POST"))
        .and(path("/todo"))
        .and(body_partial_json(json!({ "id": candidate.id })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "todo_entry": body
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/todo/{}", candidate.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "todo_entry": body
        })))
        .mount(&mock_server)
        .await;

    let created = store.create(&candidate).await.unwrap();
    let fetched = store.fetch(candidate.id).await.unwrap();

    assert_eq!(fetched.id, candidate.id);
    assert_eq!(fetched.title, "Cycle around town");
    assert_eq!(fetched, created);
    assert!(!fetched.done);
    assert!(!fetched.deleted);
    assert!(fetched.updated_at.is_none());
}

// The limit and page of the coordinator's key reach the wire on refetch.
#[tokio::test]
async fn test_refresh_requests_the_coordinators_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/todo"))
        .and(query_param("limit", "5"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[], 42)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TodoClient::new(&mock_server.uri());
    let coordinator = client.coordinator(PageKey::new(5, 3));
    coordinator.refresh().await.unwrap();

    assert_eq!(coordinator.snapshot().total, 42);
    assert!(coordinator.snapshot().entries.is_empty());
}
