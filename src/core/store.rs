//! Remote-backed record collection for one entity type
//!
//! The store owns the canonical collection and never patches it in place:
//! every successful mutation is followed by a full refetch, and the new
//! collection replaces the old one as a single snapshot swap. Readers take a
//! snapshot with [`RemoteSyncStore::records`] and keep it for as long as they
//! like without observing a half-applied change.
//!
//! A mutating call moves through
//! `Idle → Sending → Succeeded → Refreshing → Idle` or
//! `Idle → Sending → Failed → Idle`. Nothing is retried automatically.

use crate::core::error::{SyncError, SyncResult, failure_message};
use crate::core::normalize::{
    RecordPatch, WireRecord, denormalize_patch, normalize, normalize_value,
};
use crate::core::notify::{Notifier, NotifyKind};
use crate::core::record::{Record, RecordId};
use crate::core::transport::{
    Method, NoToken, RemoteRequest, RemoteResponse, RemoteTransport, TokenSource,
};
use serde_json::{Map, Value};
use std::sync::{Arc, PoisonError, RwLock};

/// Where an entity type lives on the remote API and how it is labelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityResource {
    /// Collection path segment (e.g. "suppliers")
    pub path: String,
    /// Display label used in notifications (e.g. "Supplier")
    pub singular: String,
}

impl EntityResource {
    pub fn new(path: impl Into<String>, singular: impl Into<String>) -> Self {
        Self {
            path: path.into().trim_matches('/').to_string(),
            singular: singular.into(),
        }
    }

    pub fn suppliers() -> Self {
        Self::new("suppliers", "Supplier")
    }

    pub fn debtors() -> Self {
        Self::new("debtors", "Debtor")
    }

    /// `{entity}/`
    pub fn collection_path(&self) -> String {
        format!("{}/", self.path)
    }

    /// `{entity}/{id}/`
    pub fn item_path(&self, id: &RecordId) -> String {
        format!("{}/{}/", self.path, id)
    }
}

/// Most recent phase of the store's mutation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Sending,
    Succeeded,
    Failed,
    Refreshing,
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Create,
    Update,
    Delete,
}

impl Mutation {
    fn past_tense(self) -> &'static str {
        match self {
            Mutation::Create => "created",
            Mutation::Update => "updated",
            Mutation::Delete => "deleted",
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            Mutation::Create => "Create failed",
            Mutation::Update => "Update failed",
            Mutation::Delete => "Delete failed",
        }
    }

    fn failed(self, message: String) -> SyncError {
        match self {
            Mutation::Create => SyncError::CreateFailed(message),
            Mutation::Update => SyncError::UpdateFailed(message),
            Mutation::Delete => SyncError::DeleteFailed(message),
        }
    }
}

/// Process-wide collection of canonical records for one entity type
///
/// Share it behind an `Arc`; all methods take `&self`.
pub struct RemoteSyncStore {
    resource: EntityResource,
    transport: Arc<dyn RemoteTransport>,
    tokens: Arc<dyn TokenSource>,
    notifier: Option<Arc<dyn Notifier>>,
    records: RwLock<Arc<Vec<Record>>>,
    last_error: RwLock<Option<String>>,
    phase: RwLock<SyncPhase>,
}

impl RemoteSyncStore {
    /// Create an empty store; call [`refresh`](Self::refresh) to load it
    pub fn new(resource: EntityResource, transport: Arc<dyn RemoteTransport>) -> Self {
        Self {
            resource,
            transport,
            tokens: Arc::new(NoToken),
            notifier: None,
            records: RwLock::new(Arc::new(Vec::new())),
            last_error: RwLock::new(None),
            phase: RwLock::new(SyncPhase::Idle),
        }
    }

    /// Attach a notifier for mutation outcomes
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Attach a bearer token source
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn resource(&self) -> &EntityResource {
        &self.resource
    }

    /// The committed collection snapshot
    pub fn records(&self) -> Arc<Vec<Record>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Message of the last failed call, cleared by a successful refresh
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn phase(&self) -> SyncPhase {
        *self.phase.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Find a record in the current snapshot
    pub fn find(&self, id: &RecordId) -> Option<Record> {
        self.records()
            .iter()
            .find(|r| r.id.as_ref() == Some(id))
            .cloned()
    }

    /// Refetch the full collection and replace the snapshot
    ///
    /// Any failure (transport error, non-success status, unexpected body)
    /// leaves the store empty rather than stale.
    pub async fn refresh(&self) -> Arc<Vec<Record>> {
        self.set_phase(SyncPhase::Refreshing);

        let request = self.request(Method::Get, self.resource.collection_path());
        let outcome = match self.transport.send(request).await {
            Ok(response) if response.is_success() => {
                unwrap_collection(&response).ok_or_else(|| "unexpected response shape".to_string())
            }
            Ok(response) => Err(format!("list request returned status {}", response.status)),
            Err(e) => Err(e.message),
        };

        let records = match outcome {
            Ok(items) => {
                let records: Vec<Record> = items.iter().filter_map(normalize_value).collect();
                tracing::debug!(
                    entity = %self.resource.path,
                    count = records.len(),
                    "collection refreshed"
                );
                self.set_last_error(None);
                records
            }
            Err(message) => {
                tracing::warn!(
                    entity = %self.resource.path,
                    error = %message,
                    "refresh failed, clearing collection"
                );
                self.set_last_error(Some(message));
                Vec::new()
            }
        };

        let snapshot = Arc::new(records);
        *self.records.write().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        self.set_phase(SyncPhase::Idle);
        snapshot
    }

    /// Create a record; the remote assigns its id
    ///
    /// Returns the server-echoed record.
    pub async fn create(&self, payload: RecordPatch) -> SyncResult<Record> {
        let wire = denormalize_patch(&payload);
        let request = self
            .request(Method::Post, self.resource.collection_path())
            .with_body(wire.clone());

        let response = self.send_mutation(Mutation::Create, request).await?;
        Ok(echoed_record(&response, &wire))
    }

    /// Partially update the record with `id`
    pub async fn update(&self, id: &RecordId, payload: RecordPatch) -> SyncResult<Record> {
        let wire = denormalize_patch(&payload);
        let request = self
            .request(Method::Patch, self.resource.item_path(id))
            .with_body(wire.clone());

        let response = self.send_mutation(Mutation::Update, request).await?;
        Ok(echoed_record(&response, &wire))
    }

    /// Delete the record with `id`
    pub async fn delete(&self, id: &RecordId) -> SyncResult<bool> {
        let request = self.request(Method::Delete, self.resource.item_path(id));
        self.send_mutation(Mutation::Delete, request).await?;
        Ok(true)
    }

    async fn send_mutation(
        &self,
        mutation: Mutation,
        request: RemoteRequest,
    ) -> SyncResult<RemoteResponse> {
        self.set_phase(SyncPhase::Sending);
        let method = request.method;
        let path = request.path.clone();

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                self.fail(&e.message);
                return Err(SyncError::Transport(e.message));
            }
        };

        if !response.is_success() {
            let message = failure_message(&response.body, mutation.fallback_message());
            tracing::warn!(
                entity = %self.resource.path,
                %method,
                %path,
                status = response.status,
                error = %message,
                "mutation rejected"
            );
            self.fail(&message);
            return Err(mutation.failed(message));
        }

        self.set_phase(SyncPhase::Succeeded);
        tracing::info!(
            entity = %self.resource.path,
            %method,
            %path,
            status = response.status,
            "mutation accepted"
        );

        self.refresh().await;
        self.notify(
            &format!("{} {}", self.resource.singular, mutation.past_tense()),
            NotifyKind::Success,
        );
        Ok(response)
    }

    fn fail(&self, message: &str) {
        self.set_phase(SyncPhase::Failed);
        self.set_last_error(Some(message.to_string()));
        self.notify(message, NotifyKind::Error);
        self.set_phase(SyncPhase::Idle);
    }

    fn request(&self, method: Method, path: String) -> RemoteRequest {
        RemoteRequest::new(method, path).with_bearer_token(self.tokens.token())
    }

    fn notify(&self, message: &str, kind: NotifyKind) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(message, kind);
        }
    }

    fn set_last_error(&self, error: Option<String>) {
        *self.last_error.write().unwrap_or_else(PoisonError::into_inner) = error;
    }

    fn set_phase(&self, next: SyncPhase) {
        let mut phase = self.phase.write().unwrap_or_else(PoisonError::into_inner);
        let previous = *phase;
        tracing::debug!(
            entity = %self.resource.path,
            from = ?previous,
            to = ?next,
            "sync phase"
        );
        *phase = next;
    }
}

/// Accept a bare array or a `{results: [...]}` envelope
fn unwrap_collection(response: &RemoteResponse) -> Option<Vec<Value>> {
    match response.json_body()? {
        Value::Array(items) => Some(items),
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// The record the server echoed back, or the payload that was sent
fn echoed_record(response: &RemoteResponse, sent: &WireRecord) -> Record {
    response
        .json_body()
        .as_ref()
        .and_then(normalize_value)
        .unwrap_or_else(|| {
            let raw: Map<String, Value> = sent.clone().into_iter().collect();
            normalize(&raw)
        })
}
