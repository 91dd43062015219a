//! In-process AskAny backend for integration tests.
//!
//! Serves the REST routes the client uses from an in-memory state that tests
//! can seed, inspect and bend (lagging reads, failing fetches, legacy stats).

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use askany_client::{ApiClient, EventSink, SessionClient};
use askany_shared::SessionSlug;
use askany_store::{KeyValueStore, LocalState, MemoryStore, StoreError};

type Reply = (StatusCode, Json<Value>);

#[derive(Debug, Clone)]
struct StoredQuestion {
    slug: String,
    /// Hidden questions exist but are not yet returned by session fetches.
    visible: bool,
    record: Value,
}

#[derive(Debug, Default)]
pub struct Backend {
    sessions: HashMap<String, Value>,
    questions: Vec<StoredQuestion>,
    next_id: i64,
    upvoters: HashSet<(String, String)>,

    /// Number of `GET /api/sessions/{slug}` requests served.
    pub fetches: usize,
    /// Number of `POST /api/questions/{id}/upvote` requests served.
    pub upvote_calls: usize,
    /// New questions are accepted but left out of fetches.
    pub lag_new_questions: bool,
    /// Session fetches answer 500.
    pub fail_fetches: bool,
    /// Drop `clientId` from every question returned.
    pub strip_client_ids: bool,
    /// Only the old `/api/stats` route exists.
    pub legacy_stats: bool,
}

impl Backend {
    pub fn add_session(&mut self, slug: &str) {
        self.sessions.insert(
            slug.to_string(),
            json!({ "slug": slug, "title": null, "mode": "normal" }),
        );
    }

    /// Insert a visible question and return its id.
    pub fn add_question(&mut self, slug: &str, content: &str, upvotes: u32) -> i64 {
        self.insert_question(
            slug,
            true,
            json!({
                "content": content,
                "nickname": "guest",
                "isAnonymous": false,
                "upvoteCount": upvotes,
                "isAnswered": false,
                "isSpotlighted": false,
            }),
        )
    }

    pub fn add_upvoter(&mut self, id: i64, client: &str) {
        self.upvoters.insert((id.to_string(), client.to_string()));
    }

    pub fn question(&self, id: i64) -> Option<&Value> {
        let id = id.to_string();
        self.questions
            .iter()
            .find(|q| id_of(&q.record) == id)
            .map(|q| &q.record)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn has_session(&self, slug: &str) -> bool {
        self.sessions.contains_key(slug)
    }

    fn insert_question(&mut self, slug: &str, visible: bool, mut record: Value) -> i64 {
        self.next_id += 1;
        let id = self.next_id;
        record["id"] = json!(id);
        self.questions.push(StoredQuestion {
            slug: slug.to_string(),
            visible,
            record,
        });
        id
    }

    fn public(&self, record: &Value) -> Value {
        let mut record = record.clone();
        if self.strip_client_ids {
            if let Some(obj) = record.as_object_mut() {
                obj.remove("clientId");
            }
        }
        record
    }

    fn question_mut(&mut self, id: &str) -> Option<&mut Value> {
        self.questions
            .iter_mut()
            .find(|q| id_of(&q.record) == id)
            .map(|q| &mut q.record)
    }
}

fn id_of(record: &Value) -> String {
    record["id"].to_string()
}

fn error(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "error": message })))
}

pub type Shared = Arc<Mutex<Backend>>;

pub struct TestServer {
    pub base_url: String,
    pub backend: Shared,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(Backend::default()).await
    }

    pub async fn start_with(backend: Backend) -> Self {
        let backend = Arc::new(Mutex::new(backend));
        let app = router(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            backend,
            task,
        }
    }

    pub fn backend(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.backend.lock().unwrap()
    }

    pub fn api(&self) -> Arc<ApiClient> {
        Arc::new(ApiClient::new(&self.base_url, Duration::from_secs(2)).unwrap())
    }

    /// A session view with its own in-memory storage and no event receiver.
    pub fn open(&self, slug: &str) -> (SessionClient, LocalState) {
        let local = memory_state();
        let client = self.open_with(slug, local.clone(), EventSink::disabled());
        (client, local)
    }

    pub fn open_with(&self, slug: &str, local: LocalState, events: EventSink) -> SessionClient {
        SessionClient::open(self.api(), local, SessionSlug(slug.to_string()), events).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn memory_state() -> LocalState {
    LocalState::new(Arc::new(MemoryStore::new()))
}

/// Memory store that refuses writes to keys starting with `prefix`.
pub struct FailingWrites {
    inner: MemoryStore,
    prefix: &'static str,
}

impl KeyValueStore for FailingWrites {
    fn get(&self, key: &str) -> askany_store::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> askany_store::Result<()> {
        if key.starts_with(self.prefix) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> askany_store::Result<bool> {
        self.inner.remove(key)
    }
}

pub fn failing_writes(prefix: &'static str) -> LocalState {
    LocalState::new(Arc::new(FailingWrites {
        inner: MemoryStore::new(),
        prefix,
    }))
}

/// An API client pointed at a port nothing listens on.
pub fn unreachable_api() -> Arc<ApiClient> {
    Arc::new(ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap())
}

fn router(backend: Shared) -> Router {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/stats", get(session_stats))
        .route("/api/sessions/:slug", get(fetch_session))
        .route("/api/sessions/:slug/mode", patch(set_mode))
        .route("/api/questions", post(submit_question))
        .route("/api/questions/:id/upvote", post(upvote))
        .route("/api/questions/:id/answer", patch(mark_answered))
        .route("/api/questions/:id/spotlight", patch(set_spotlight))
        .route("/api/stats", get(legacy_stats))
        .with_state(backend)
}

async fn create_session(State(backend): State<Shared>) -> Reply {
    let mut backend = backend.lock().unwrap();
    let slug = format!("room-{}", backend.sessions.len() + 1);
    backend.add_session(&slug);
    (StatusCode::CREATED, Json(json!({ "slug": slug })))
}

async fn fetch_session(State(backend): State<Shared>, Path(slug): Path<String>) -> Reply {
    let mut backend = backend.lock().unwrap();
    backend.fetches += 1;

    if backend.fail_fetches {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    let Some(session) = backend.sessions.get(&slug).cloned() else {
        return error(StatusCode::NOT_FOUND, "Session not found");
    };

    let questions: Vec<Value> = backend
        .questions
        .iter()
        .filter(|q| q.slug == slug && q.visible)
        .map(|q| backend.public(&q.record))
        .collect();

    (
        StatusCode::OK,
        Json(json!({ "session": session, "questions": questions })),
    )
}

async fn set_mode(
    State(backend): State<Shared>,
    Path(slug): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut backend = backend.lock().unwrap();
    let Some(session) = backend.sessions.get_mut(&slug) else {
        return error(StatusCode::NOT_FOUND, "Session not found");
    };
    session["mode"] = body["mode"].clone();
    (StatusCode::OK, Json(session.clone()))
}

async fn submit_question(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut backend = backend.lock().unwrap();

    let slug = body["sessionSlug"].as_str().unwrap_or_default().to_string();
    if !backend.sessions.contains_key(&slug) {
        return error(StatusCode::NOT_FOUND, "Session not found");
    }
    let content = body["content"].as_str().unwrap_or_default();
    if content.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Question content is required");
    }
    if content.chars().count() > 500 {
        return error(StatusCode::BAD_REQUEST, "Question is too long");
    }

    let visible = !backend.lag_new_questions;
    let record = json!({
        "content": content,
        "nickname": body["nickname"],
        "isAnonymous": body["is_anonymous"],
        "upvoteCount": 0,
        "isAnswered": false,
        "clientId": body["clientId"],
    });
    let id = backend.insert_question(&slug, visible, record);
    let created = backend.question(id).cloned().unwrap_or_default();
    let created = backend.public(&created);
    (StatusCode::CREATED, Json(created))
}

async fn upvote(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut backend = backend.lock().unwrap();
    backend.upvote_calls += 1;

    let client = body["clientId"].as_str().unwrap_or_default().to_string();
    if backend.question_mut(&id).is_none() {
        return error(StatusCode::NOT_FOUND, "Question not found");
    }
    if !backend.upvoters.insert((id.clone(), client)) {
        return error(StatusCode::CONFLICT, "Already upvoted");
    }

    let Some(record) = backend.question_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "Question not found");
    };
    let count = record["upvoteCount"].as_u64().unwrap_or(0);
    record["upvoteCount"] = json!(count + 1);
    let record = record.clone();
    (StatusCode::OK, Json(backend.public(&record)))
}

async fn mark_answered(State(backend): State<Shared>, Path(id): Path<String>) -> Reply {
    let mut backend = backend.lock().unwrap();
    let Some(record) = backend.question_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "Question not found");
    };
    record["isAnswered"] = json!(true);
    let record = record.clone();
    (StatusCode::OK, Json(backend.public(&record)))
}

async fn set_spotlight(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut backend = backend.lock().unwrap();
    let Some(record) = backend.question_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "Question not found");
    };
    record["isSpotlighted"] = body["isSpotlighted"].clone();
    let record = record.clone();
    (StatusCode::OK, Json(backend.public(&record)))
}

fn stats_body(backend: &Backend) -> Value {
    json!({
        "totalSessions": backend.sessions.len(),
        "totalParticipants": 42,
        "lastUpdated": "2026-01-02T03:04:05Z",
    })
}

async fn session_stats(State(backend): State<Shared>) -> Reply {
    let backend = backend.lock().unwrap();
    if backend.legacy_stats {
        return error(StatusCode::NOT_FOUND, "Not found");
    }
    (StatusCode::OK, Json(stats_body(&backend)))
}

async fn legacy_stats(State(backend): State<Shared>) -> Reply {
    let backend = backend.lock().unwrap();
    (StatusCode::OK, Json(stats_body(&backend)))
}
