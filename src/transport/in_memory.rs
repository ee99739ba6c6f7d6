//! In-memory remote authority for testing and development
//!
//! Behaves like the dashboard's REST backend: it assigns integer ids, stores
//! list-valued fields as the text it was given, renders `amount` as a
//! two-decimal string, answers validation failures with field-error bodies,
//! and can wrap list responses in a paginated `results` envelope.

use crate::core::error::TransportError;
use crate::core::normalize::WireRecord;
use crate::core::record::parse_number;
use crate::core::transport::{Method, RemoteRequest, RemoteResponse, RemoteTransport};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct RemoteState {
    collections: HashMap<String, BTreeMap<i64, WireRecord>>,
    next_id: i64,
    envelope: bool,
    offline: bool,
    required_token: Option<String>,
    queued: VecDeque<RemoteResponse>,
    log: Vec<RemoteRequest>,
}

/// In-memory remote entity API
///
/// Clones share state, so a test can keep a handle while the store owns
/// another.
#[derive(Clone, Default)]
pub struct InMemoryRemote {
    state: Arc<RwLock<RemoteState>>,
}

impl InMemoryRemote {
    /// Create an empty remote
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap list responses in `{count, next, previous, results}`
    pub fn with_envelope(self, envelope: bool) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.envelope = envelope;
        }
        self
    }

    /// Reject requests whose bearer token differs from `token`
    pub fn with_required_token(self, token: impl Into<String>) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.required_token = Some(token.into());
        }
        self
    }

    /// Insert wire records directly, assigning ids where missing
    pub fn seed(&self, entity: &str, records: Vec<Value>) -> Vec<i64> {
        let Ok(mut state) = self.state.write() else {
            return Vec::new();
        };

        records
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(obj) => Some(obj.into_iter().collect::<WireRecord>()),
                _ => None,
            })
            .map(|record| state.insert(entity, record))
            .collect()
    }

    /// Make every following request fail at the transport level
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.state.write() {
            state.offline = offline;
        }
    }

    /// Answer the next request with `response` regardless of its content
    pub fn fail_next(&self, response: RemoteResponse) {
        if let Ok(mut state) = self.state.write() {
            state.queued.push_back(response);
        }
    }

    /// Stored wire records for `entity`, ordered by id
    pub fn stored(&self, entity: &str) -> Vec<WireRecord> {
        self.state
            .read()
            .map(|state| {
                state
                    .collections
                    .get(entity)
                    .map(|c| c.values().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.state
            .read()
            .map(|state| state.log.clone())
            .unwrap_or_default()
    }

    /// Number of requests received with `method`
    pub fn request_count(&self, method: Method) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }
}

impl RemoteState {
    fn insert(&mut self, entity: &str, mut record: WireRecord) -> i64 {
        let id = match record.get("id").and_then(Value::as_i64) {
            Some(id) => id,
            None => {
                self.next_id += 1;
                self.next_id
            }
        };
        self.next_id = self.next_id.max(id);

        record.shift_remove("id");
        record.insert_before(0, "id".to_string(), json!(id));
        apply_server_defaults(&mut record);

        self.collections
            .entry(entity.to_string())
            .or_default()
            .insert(id, record);
        id
    }

    fn handle(&mut self, request: &RemoteRequest) -> RemoteResponse {
        if let Some(response) = self.queued.pop_front() {
            return response;
        }

        if let Some(required) = &self.required_token {
            if request.bearer_token.as_deref() != Some(required.as_str()) {
                return RemoteResponse::json(
                    401,
                    &json!({"detail": "Authentication credentials were not provided."}),
                );
            }
        }

        let segments: Vec<&str> = request.path.split('/').filter(|s| !s.is_empty()).collect();
        let (entity, id) = match segments.as_slice() {
            [entity] => (*entity, None),
            [entity, id] => match id.parse::<i64>() {
                Ok(id) => (*entity, Some(id)),
                Err(_) => return not_found(),
            },
            _ => return not_found(),
        };

        match (request.method, id) {
            (Method::Get, None) => self.list(entity),
            (Method::Get, Some(id)) => match self.get(entity, id) {
                Some(record) => RemoteResponse::json(200, &record_value(record)),
                None => not_found(),
            },
            (Method::Post, None) => {
                let body = request.body.clone().unwrap_or_default();
                if let Some(errors) = validate(&body, true) {
                    return RemoteResponse::json(400, &errors);
                }
                let id = self.insert(entity, body);
                match self.get(entity, id) {
                    Some(record) => RemoteResponse::json(201, &record_value(record)),
                    None => not_found(),
                }
            }
            (Method::Patch, Some(id)) => {
                let body = request.body.clone().unwrap_or_default();
                if let Some(errors) = validate(&body, false) {
                    return RemoteResponse::json(400, &errors);
                }
                let Some(existing) = self.collections.get_mut(entity).and_then(|c| c.get_mut(&id))
                else {
                    return not_found();
                };
                for (key, value) in body {
                    if key != "id" {
                        existing.insert(key, value);
                    }
                }
                apply_server_defaults(existing);
                RemoteResponse::json(200, &record_value(existing))
            }
            (Method::Delete, Some(id)) => {
                match self.collections.get_mut(entity).and_then(|c| c.remove(&id)) {
                    Some(_) => RemoteResponse::new(204, ""),
                    None => not_found(),
                }
            }
            (method, _) => RemoteResponse::json(
                405,
                &json!({"detail": format!("Method \"{}\" not allowed.", method)}),
            ),
        }
    }

    fn get(&self, entity: &str, id: i64) -> Option<&WireRecord> {
        self.collections.get(entity).and_then(|c| c.get(&id))
    }

    fn list(&self, entity: &str) -> RemoteResponse {
        let items: Vec<Value> = self
            .collections
            .get(entity)
            .map(|c| c.values().map(record_value).collect())
            .unwrap_or_default();

        if self.envelope {
            RemoteResponse::json(
                200,
                &json!({
                    "count": items.len(),
                    "next": null,
                    "previous": null,
                    "results": items,
                }),
            )
        } else {
            RemoteResponse::json(200, &Value::Array(items))
        }
    }
}

#[async_trait]
impl RemoteTransport for InMemoryRemote {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, TransportError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| TransportError::new(format!("Failed to acquire write lock: {}", e)))?;

        state.log.push(request.clone());
        if state.offline {
            return Err(TransportError::new("connection refused"));
        }

        Ok(state.handle(&request))
    }
}

fn not_found() -> RemoteResponse {
    RemoteResponse::json(404, &json!({"detail": "Not found."}))
}

fn record_value(record: &WireRecord) -> Value {
    Value::Object(record.clone().into_iter().collect())
}

/// Field errors for a create (`partial == false`) or update body
fn validate(body: &WireRecord, creating: bool) -> Option<Value> {
    let name_ok = match body.get("name") {
        Some(Value::String(s)) => !s.trim().is_empty(),
        None => !creating,
        _ => false,
    };
    if !name_ok {
        return Some(json!({"name": ["This field is required."]}));
    }

    if let Some(amount) = body.get("amount") {
        if !amount.is_null() && parse_number(amount).is_none() {
            return Some(json!({"amount": ["A valid number is required."]}));
        }
    }
    None
}

/// Render stored values the way the backend serializer does
fn apply_server_defaults(record: &mut WireRecord) {
    let amount = record.get("amount").and_then(parse_number).unwrap_or(0.0);
    record.insert("amount".to_string(), json!(format!("{:.2}", amount)));

    let state_missing = !matches!(record.get("state"), Some(Value::String(s)) if !s.is_empty());
    if state_missing {
        record.insert("state".to_string(), json!("due"));
    }

    for key in ["previous", "future", "payments", "products_supplied"] {
        if !record.contains_key(key) {
            record.insert(key.to_string(), json!(""));
        }
    }
}
