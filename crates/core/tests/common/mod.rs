// ═══════════════════════════════════════════════════════════════════
// Shared test doubles — an in-memory Notion that speaks the same JSON
// as the real API, with optional scripted failures in front of it.
// ═══════════════════════════════════════════════════════════════════

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use portfolio_notion_core::errors::CoreError;
use portfolio_notion_core::transport::retry::RetryPolicy;
use portfolio_notion_core::transport::traits::{ApiRequest, ApiResponse, Method, NotionTransport};

pub const HOLDINGS_DB: &str = "11111111-1111-1111-1111-111111111111";
pub const SCRAPS_DB: &str = "22222222-2222-2222-2222-222222222222";

/// What the double does with the next request before consulting its store.
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(ApiResponse),
    NetworkError,
}

#[derive(Debug, Clone)]
struct StoredPage {
    id: String,
    database_id: String,
    archived: bool,
    /// Request-shaped properties: `{"name": {"number": 1.0}}`.
    properties: Map<String, Value>,
}

#[derive(Default)]
struct MockState {
    pages: Vec<StoredPage>,
    requests: Vec<ApiRequest>,
    call_times: Vec<tokio::time::Instant>,
    scripted: VecDeque<Scripted>,
}

/// In-memory stand-in for the Notion REST API.
pub struct MockNotion {
    state: Mutex<MockState>,
    page_size: usize,
}

impl MockNotion {
    pub fn new() -> Self {
        Self::with_page_size(100)
    }

    /// Query pages hold at most `page_size` rows, whatever the client asks for.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            page_size,
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Queue responses served before the in-memory store is consulted.
    pub fn script(&self, steps: impl IntoIterator<Item = Scripted>) {
        self.state.lock().unwrap().scripted.extend(steps);
    }

    /// Seed a row directly, bypassing the API. Returns its id.
    pub fn seed(&self, database_id: &str, properties: Value) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let properties = properties.as_object().cloned().unwrap_or_default();
        self.state.lock().unwrap().pages.push(StoredPage {
            id: id.clone(),
            database_id: database_id.to_string(),
            archived: false,
            properties,
        });
        id
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Gaps between consecutive calls, measured on the tokio clock.
    pub fn call_gaps(&self) -> Vec<Duration> {
        let state = self.state.lock().unwrap();
        state
            .call_times
            .windows(2)
            .map(|w| w[1].duration_since(w[0]))
            .collect()
    }

    pub fn is_archived(&self, id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .pages
            .iter()
            .any(|p| p.id == id && p.archived)
    }

    pub fn stored_properties(&self, id: &str) -> Option<Map<String, Value>> {
        self.state
            .lock()
            .unwrap()
            .pages
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.properties.clone())
    }

    fn handle(&self, state: &mut MockState, request: &ApiRequest) -> ApiResponse {
        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();
        let body = request.body.clone().unwrap_or(Value::Null);

        match (request.method, segments.as_slice()) {
            (Method::Post, ["databases", db, "query"]) => self.query(state, db, &body),
            (Method::Post, ["pages"]) => {
                let db = body["parent"]["database_id"].as_str().unwrap_or_default();
                let properties = body["properties"].as_object().cloned().unwrap_or_default();
                let page = StoredPage {
                    id: uuid::Uuid::new_v4().to_string(),
                    database_id: db.to_string(),
                    archived: false,
                    properties,
                };
                let response = ok(page_json(&page));
                state.pages.push(page);
                response
            }
            (Method::Get, ["pages", id]) => match state.pages.iter().find(|p| p.id == *id) {
                Some(page) => ok(page_json(page)),
                None => not_found(id),
            },
            (Method::Patch, ["pages", id]) => {
                let Some(page) = state.pages.iter_mut().find(|p| p.id == *id) else {
                    return not_found(id);
                };
                if body.get("archived") == Some(&Value::Bool(true)) {
                    page.archived = true;
                    return ok(page_json(page));
                }
                if page.archived {
                    return error(
                        400,
                        "validation_error",
                        "Can't edit block that is archived. You must unarchive the block before editing.",
                    );
                }
                if let Some(props) = body["properties"].as_object() {
                    for (k, v) in props {
                        page.properties.insert(k.clone(), v.clone());
                    }
                }
                ok(page_json(page))
            }
            _ => error(400, "invalid_request_url", "Invalid request URL."),
        }
    }

    fn query(&self, state: &MockState, db: &str, body: &Value) -> ApiResponse {
        let rows: Vec<&StoredPage> = state
            .pages
            .iter()
            .filter(|p| p.database_id == db && !p.archived)
            .collect();
        let start: usize = body["start_cursor"]
            .as_str()
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);
        let end = (start + self.page_size).min(rows.len());
        let has_more = end < rows.len();
        let results: Vec<Value> = rows[start.min(end)..end].iter().map(|p| page_json(p)).collect();
        let next_cursor = if has_more {
            Value::String(end.to_string())
        } else {
            Value::Null
        };
        ok(json!({
            "object": "list",
            "results": results,
            "has_more": has_more,
            "next_cursor": next_cursor,
        }))
    }
}

#[async_trait]
impl NotionTransport for MockNotion {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, CoreError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        state.call_times.push(tokio::time::Instant::now());

        let next = state.scripted.pop_front();
        match next {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::NetworkError) => Err(CoreError::Network("connection reset".into())),
            None => Ok(self.handle(&mut state, request)),
        }
    }
}

/// Convert request-shaped properties into the response shape, which
/// carries a `"type"` tag next to each value.
fn page_json(page: &StoredPage) -> Value {
    let properties: Map<String, Value> = page
        .properties
        .iter()
        .map(|(name, value)| {
            let mut typed = value.as_object().cloned().unwrap_or_default();
            if let Some(kind) = typed.keys().next().cloned() {
                typed.insert("type".into(), Value::String(kind));
            }
            typed.insert("id".into(), Value::String(format!("prop-{name}")));
            (name.clone(), Value::Object(typed))
        })
        .collect();
    json!({
        "object": "page",
        "id": page.id,
        "archived": page.archived,
        "in_trash": false,
        "parent": { "type": "database_id", "database_id": page.database_id },
        "properties": properties,
    })
}

pub fn ok(body: Value) -> ApiResponse {
    ApiResponse::new(200, body.to_string())
}

pub fn error(status: u16, code: &str, message: &str) -> ApiResponse {
    ApiResponse::new(
        status,
        json!({ "object": "error", "status": status, "code": code, "message": message }).to_string(),
    )
}

fn not_found(id: &str) -> ApiResponse {
    error(
        404,
        "object_not_found",
        &format!("Could not find page with ID: {id}."),
    )
}

/// Fast, deterministic retries for tests.
pub fn test_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(5),
        jitter: false,
    }
}
