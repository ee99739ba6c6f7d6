//! Integration tests for RemoteSyncStore against the in-memory remote
//!
//! These tests verify that:
//! - Every successful mutation is followed by a full refetch
//! - Failed mutations leave the collection untouched and surface the server message
//! - Refresh failures degrade to an empty collection
//! - Outcomes reach the injected notifier

use recordsync::prelude::*;
use serde_json::json;
use std::sync::Mutex;

// =============================================================================
// Helpers
// =============================================================================

type Seen = Arc<Mutex<Vec<(String, NotifyKind)>>>;

fn recording_notifier() -> (Arc<dyn Notifier>, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let notifier = move |message: &str, kind: NotifyKind| {
        sink.lock().unwrap().push((message.to_string(), kind));
    };
    (Arc::new(notifier), seen)
}

fn debtors_remote() -> InMemoryRemote {
    let remote = InMemoryRemote::new();
    remote.seed(
        "debtors",
        vec![
            json!({
                "name": "Ann",
                "amount": "300.00",
                "payments": "[{\"date\":\"2025-07-01\",\"amount\":100}]",
            }),
            json!({"name": "Bob", "amount": "100.00", "due_date": "2025-08-01"}),
        ],
    );
    remote
}

fn store_for(remote: &InMemoryRemote, resource: EntityResource) -> (RemoteSyncStore, Seen) {
    let (notifier, seen) = recording_notifier();
    let store = RemoteSyncStore::new(resource, Arc::new(remote.clone())).with_notifier(notifier);
    (store, seen)
}

fn names(store: &RemoteSyncStore) -> Vec<String> {
    store.records().iter().map(|r| r.name.clone()).collect()
}

// =============================================================================
// Refresh
// =============================================================================

mod refresh_tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_normalizes_wire_records() {
        let remote = debtors_remote();
        let (store, _) = store_for(&remote, EntityResource::debtors());

        let records = store.refresh().await;
        assert_eq!(records.len(), 2);

        let ann = &records[0];
        assert_eq!(ann.id, Some(RecordId::Int(1)));
        assert_eq!(ann.amount, 300.0);
        assert_eq!(ann.total_paid(), 100.0);
        assert_eq!(ann.state, RecordState::Due);

        let bob = &records[1];
        assert_eq!(bob.due_date.as_deref(), Some("2025-08-01"));
        assert!(bob.payments.is_empty());
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test]
    async fn test_envelope_and_bare_array_give_same_records() {
        let bare = debtors_remote();
        let wrapped = debtors_remote().with_envelope(true);

        let (bare_store, _) = store_for(&bare, EntityResource::debtors());
        let (wrapped_store, _) = store_for(&wrapped, EntityResource::debtors());

        let from_bare = bare_store.refresh().await;
        let from_envelope = wrapped_store.refresh().await;
        assert_eq!(from_bare.len(), 2);
        assert_eq!(from_bare, from_envelope);
    }

    #[tokio::test]
    async fn test_refresh_failure_empties_collection() {
        let remote = debtors_remote();
        let (store, _) = store_for(&remote, EntityResource::debtors());
        assert_eq!(store.refresh().await.len(), 2);

        remote.set_offline(true);
        let records = store.refresh().await;

        assert!(records.is_empty());
        assert!(store.records().is_empty());
        assert_eq!(store.last_error().as_deref(), Some("connection refused"));
        assert_eq!(store.phase(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn test_refresh_error_status_empties_collection() {
        let remote = debtors_remote();
        let (store, _) = store_for(&remote, EntityResource::debtors());
        store.refresh().await;

        remote.fail_next(RemoteResponse::new(500, "Internal Server Error"));
        assert!(store.refresh().await.is_empty());
        assert!(store.last_error().is_some());

        // Recovers on the next successful refresh
        assert_eq!(store.refresh().await.len(), 2);
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test]
    async fn test_refresh_unexpected_shape_empties_collection() {
        let remote = debtors_remote();
        let (store, _) = store_for(&remote, EntityResource::debtors());
        store.refresh().await;

        remote.fail_next(RemoteResponse::json(200, &json!({"data": []})));
        assert!(store.refresh().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_skips_non_object_items() {
        let remote = InMemoryRemote::new();
        let (store, _) = store_for(&remote, EntityResource::suppliers());

        remote.fail_next(RemoteResponse::json(
            200,
            &json!([{"name": "A"}, 42, null, {"name": "B"}]),
        ));
        let records = store.refresh().await;
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_survives_refresh() {
        let remote = debtors_remote();
        let (store, _) = store_for(&remote, EntityResource::debtors());
        store.refresh().await;

        let before = store.records();
        remote.set_offline(true);
        store.refresh().await;

        assert_eq!(before.len(), 2);
        assert!(store.records().is_empty());
    }
}

// =============================================================================
// Mutations
// =============================================================================

mod mutation_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_refetch() {
        let remote = debtors_remote();
        let (store, seen) = store_for(&remote, EntityResource::debtors());
        store.refresh().await;

        let created = store
            .create(
                RecordPatch::new()
                    .name("Cara")
                    .amount(50.0)
                    .payments(&[LedgerEntry::new("2025-07-02", 20.0)]),
            )
            .await
            .unwrap();

        assert_eq!(created.id, Some(RecordId::Int(3)));
        assert_eq!(created.amount, 50.0);
        assert_eq!(names(&store), ["Ann", "Bob", "Cara"]);

        let stored = remote.stored("debtors");
        assert!(stored[2]["payments"].is_string());
        assert_eq!(store.find(&RecordId::Int(3)).map(|r| r.total_paid()), Some(20.0));

        // GET, POST, GET
        assert_eq!(remote.request_count(Method::Get), 2);
        assert_eq!(remote.request_count(Method::Post), 1);

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            [("Debtor created".to_string(), NotifyKind::Success)]
        );
        assert_eq!(store.phase(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn test_mutation_picks_up_remote_changes() {
        let remote = debtors_remote();
        let (store, _) = store_for(&remote, EntityResource::debtors());
        store.refresh().await;

        // Someone else adds a debtor
        remote.seed("debtors", vec![json!({"name": "Zed", "amount": 5})]);
        assert_eq!(store.records().len(), 2);

        store
            .update(&RecordId::Int(1), RecordPatch::new().state(RecordState::Paid))
            .await
            .unwrap();

        assert_eq!(names(&store), ["Ann", "Bob", "Zed"]);
        assert_eq!(store.records()[0].state, RecordState::Paid);
    }

    #[tokio::test]
    async fn test_update_sends_wire_keys() {
        let remote = debtors_remote();
        let (store, seen) = store_for(&remote, EntityResource::debtors());
        store.refresh().await;

        let updated = store
            .update(&RecordId::Int(2), RecordPatch::new().due_date("2025-09-30"))
            .await
            .unwrap();
        assert_eq!(updated.due_date.as_deref(), Some("2025-09-30"));

        let patch = remote
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Patch)
            .unwrap();
        assert_eq!(patch.path, "debtors/2/");
        let body = patch.body.unwrap();
        assert_eq!(body.get("due_date"), Some(&json!("2025-09-30")));
        assert!(body.get("dueDate").is_none());

        assert_eq!(seen.lock().unwrap()[0].0, "Debtor updated");
    }

    #[tokio::test]
    async fn test_delete_then_refetch() {
        let remote = debtors_remote();
        let (store, seen) = store_for(&remote, EntityResource::debtors());
        store.refresh().await;

        assert!(store.delete(&RecordId::Int(1)).await.unwrap());
        assert_eq!(names(&store), ["Bob"]);
        assert_eq!(seen.lock().unwrap()[0].0, "Debtor deleted");
    }

    #[tokio::test]
    async fn test_create_failure_keeps_records_and_reports_message() {
        let remote = debtors_remote();
        let (store, seen) = store_for(&remote, EntityResource::debtors());
        let before = store.refresh().await;

        remote.fail_next(RemoteResponse::json(
            400,
            &json!({"message": "name required"}),
        ));
        let err = store.create(RecordPatch::new().amount(10.0)).await.unwrap_err();

        assert_eq!(err, SyncError::CreateFailed("name required".to_string()));
        assert_eq!(err.to_string(), "name required");
        assert_eq!(store.records(), before);
        assert_eq!(store.last_error().as_deref(), Some("name required"));
        assert_eq!(store.phase(), SyncPhase::Idle);

        // No refetch after a failure
        assert_eq!(remote.request_count(Method::Get), 1);

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            [("name required".to_string(), NotifyKind::Error)]
        );
    }

    #[tokio::test]
    async fn test_validation_errors_without_message_use_body_text() {
        let remote = InMemoryRemote::new();
        let (store, _) = store_for(&remote, EntityResource::suppliers());

        let err = store.create(RecordPatch::new().phone("0711")).await.unwrap_err();
        assert_eq!(err.message(), r#"{"name":["This field is required."]}"#);
        assert!(remote.stored("suppliers").is_empty());
    }

    #[tokio::test]
    async fn test_update_failure_falls_back_to_generic_message() {
        let remote = debtors_remote();
        let (store, _) = store_for(&remote, EntityResource::debtors());
        store.refresh().await;

        remote.fail_next(RemoteResponse::new(500, ""));
        let err = store
            .update(&RecordId::Int(1), RecordPatch::new().amount(1.0))
            .await
            .unwrap_err();

        assert_eq!(err, SyncError::UpdateFailed("Update failed".to_string()));
        assert_eq!(store.records()[0].amount, 300.0);
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let remote = debtors_remote();
        let (store, _) = store_for(&remote, EntityResource::debtors());
        store.refresh().await;

        let err = store.delete(&RecordId::Int(99)).await.unwrap_err();
        assert!(matches!(err, SyncError::DeleteFailed(_)));
        assert_eq!(err.message(), r#"{"detail":"Not found."}"#);
        assert_eq!(store.records().len(), 2);
    }

    #[tokio::test]
    async fn test_network_failure_during_mutation() {
        let remote = debtors_remote();
        let (store, seen) = store_for(&remote, EntityResource::debtors());
        store.refresh().await;

        remote.set_offline(true);
        let err = store.delete(&RecordId::Int(1)).await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(store.records().len(), 2);
        assert_eq!(seen.lock().unwrap()[0].1, NotifyKind::Error);
    }
}

// =============================================================================
// Authentication and notifiers
// =============================================================================

mod collaborator_tests {
    use super::*;

    #[tokio::test]
    async fn test_bearer_token_is_attached() {
        let remote = debtors_remote().with_required_token("s3cret");
        let store = RemoteSyncStore::new(EntityResource::debtors(), Arc::new(remote.clone()))
            .with_token_source(Arc::new(StaticToken("s3cret".to_string())));

        assert_eq!(store.refresh().await.len(), 2);
        let requests = remote.requests();
        assert_eq!(requests[0].authorization().as_deref(), Some("Bearer s3cret"));
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected_by_remote() {
        let remote = debtors_remote().with_required_token("s3cret");
        let (store, _) = store_for(&remote, EntityResource::debtors());

        assert!(store.refresh().await.is_empty());
        assert_eq!(remote.requests()[0].bearer_token, None);

        let err = store.create(RecordPatch::new().name("X")).await.unwrap_err();
        assert_eq!(
            err.message(),
            r#"{"detail":"Authentication credentials were not provided."}"#
        );
    }

    #[tokio::test]
    async fn test_token_source_is_read_per_request() {
        let remote = debtors_remote();
        let token = Arc::new(Mutex::new(None::<String>));
        let reader = token.clone();
        let store = RemoteSyncStore::new(EntityResource::debtors(), Arc::new(remote.clone()))
            .with_token_source(Arc::new(move || reader.lock().unwrap().clone()));

        store.refresh().await;
        *token.lock().unwrap() = Some("later".to_string());
        store.refresh().await;

        let requests = remote.requests();
        assert_eq!(requests[0].bearer_token, None);
        assert_eq!(requests[1].bearer_token.as_deref(), Some("later"));
    }

    #[tokio::test]
    async fn test_channel_notifier_receives_outcomes() {
        let remote = debtors_remote();
        let notifier = ChannelNotifier::new(8);
        let mut rx = notifier.subscribe();
        let store = RemoteSyncStore::new(EntityResource::suppliers(), Arc::new(remote))
            .with_notifier(Arc::new(notifier));

        store.create(RecordPatch::new().name("Acme")).await.unwrap();
        let toast = rx.recv().await.unwrap();
        assert_eq!(toast.message, "Supplier created");
        assert_eq!(toast.kind, NotifyKind::Success);
    }

    #[tokio::test]
    async fn test_store_without_notifier() {
        let remote = debtors_remote();
        let store = RemoteSyncStore::new(EntityResource::debtors(), Arc::new(remote));
        store.refresh().await;
        assert!(store.delete(&RecordId::Int(2)).await.unwrap());
        assert_eq!(names(&store), ["Ann"]);
    }
}
