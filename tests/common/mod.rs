// Shared fixtures: an in-process fake schema service and a recording
// surface, plus client/config helpers with strict timeouts so tests never
// hang on a dead endpoint.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use mockboard::{AdminConfig, AdminSurface, Control, SchemaServiceClient};

#[derive(Debug, Clone)]
pub struct StoredSchema {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub content: String,
}

#[derive(Default)]
pub struct FakeState {
    pub schemas: Mutex<Vec<StoredSchema>>,
    next_id: AtomicU64,
    pub list_requests: AtomicUsize,
    pub delete_calls: Mutex<Vec<String>>,
    pub list_failures_remaining: AtomicUsize,
    pub fail_delete_ids: Mutex<HashSet<String>>,
    pub list_delay_ms: AtomicU64,
    pub active_spec: Mutex<Option<Value>>,
}

impl FakeState {
    fn allocate_id(&self) -> String {
        format!("s{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn seed_schema(&self, name: &str, content: &str) -> String {
        let id = self.allocate_id();
        self.schemas.lock().unwrap().push(StoredSchema {
            id: id.clone(),
            name: name.to_string(),
            active: false,
            content: content.to_string(),
        });
        id
    }

    pub fn set_active_spec(&self, doc: Value) {
        *self.active_spec.lock().unwrap() = Some(doc);
    }

    pub fn fail_next_lists(&self, count: usize) {
        self.list_failures_remaining.store(count, Ordering::SeqCst);
    }

    pub fn fail_delete_of(&self, id: &str) {
        self.fail_delete_ids.lock().unwrap().insert(id.to_string());
    }
}

pub struct FakeService {
    pub state: Arc<FakeState>,
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl FakeService {
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.handle.await;
    }
}

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once so `RUST_LOG` surfaces crate logs
/// during test runs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub async fn spawn_fake_service() -> FakeService {
    init_tracing();
    let state = Arc::new(FakeState::default());
    let router = Router::new()
        .route("/api/schemas", post(upload_schema).get(list_schemas))
        .route("/api/schemas/load-samples", post(load_samples))
        .route("/api/schemas/{id}", get(get_schema).delete(delete_schema))
        .route("/api/schemas/{id}/activate", post(activate_schema))
        .route("/api/schemas/{id}/export", get(export_schema))
        .route("/api-spec", get(active_spec))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake service");
    let addr = listener.local_addr().expect("local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let serve = axum::serve(listener, router.into_make_service());
        let _ = serve
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
    });
    wait_for_listen(addr).await;

    FakeService {
        state,
        base_url: format!("http://{addr}"),
        shutdown: Some(shutdown_tx),
        handle,
    }
}

async fn wait_for_listen(addr: SocketAddr) {
    let deadline = Instant::now() + Duration::from_secs(1);
    loop {
        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return,
            Err(err) => {
                if Instant::now() >= deadline {
                    panic!("fake service not ready at {addr}: {err}");
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

async fn upload_schema(
    State(state): State<Arc<FakeState>>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> impl IntoResponse {
    if body.trim().is_empty() || body.contains("INVALID") {
        return (
            StatusCode::BAD_REQUEST,
            "Unable to parse specification".to_string(),
        )
            .into_response();
    }
    let name = params.get("name").cloned().unwrap_or_default();
    let id = state.allocate_id();
    state.schemas.lock().unwrap().push(StoredSchema {
        id: id.clone(),
        name,
        active: false,
        content: body,
    });
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Schema stored" })),
    )
        .into_response()
}

async fn list_schemas(State(state): State<Arc<FakeState>>) -> impl IntoResponse {
    state.list_requests.fetch_add(1, Ordering::SeqCst);
    let delay = state.list_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if state
        .list_failures_remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        return (StatusCode::INTERNAL_SERVER_ERROR, "listing unavailable").into_response();
    }
    let listing: Vec<Value> = state
        .schemas
        .lock()
        .unwrap()
        .iter()
        .map(|s| json!({ "id": s.id, "name": s.name, "active": s.active }))
        .collect();
    Json(listing).into_response()
}

async fn get_schema(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let schemas = state.schemas.lock().unwrap();
    match schemas.iter().find(|s| s.id == id) {
        Some(s) => Json(json!({ "id": s.id, "name": s.name, "active": s.active })).into_response(),
        None => (StatusCode::NOT_FOUND, "Schema not found").into_response(),
    }
}

async fn activate_schema(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut schemas = state.schemas.lock().unwrap();
    if !schemas.iter().any(|s| s.id == id) {
        return (StatusCode::NOT_FOUND, "Schema not found").into_response();
    }
    for s in schemas.iter_mut() {
        s.active = s.id == id;
    }
    StatusCode::OK.into_response()
}

async fn delete_schema(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.delete_calls.lock().unwrap().push(id.clone());
    if state.fail_delete_ids.lock().unwrap().contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "delete unavailable").into_response();
    }
    let mut schemas = state.schemas.lock().unwrap();
    let before = schemas.len();
    schemas.retain(|s| s.id != id);
    if schemas.len() == before {
        (StatusCode::NOT_FOUND, "Schema not found").into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn load_samples(State(state): State<Arc<FakeState>>) -> impl IntoResponse {
    for name in ["petstore", "bookstore", "weather"] {
        state.seed_schema(name, &format!("openapi: 3.0.0 # {name}"));
    }
    Json(json!({ "loaded": 3 }))
}

async fn export_schema(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let schemas = state.schemas.lock().unwrap();
    match schemas.iter().find(|s| s.id == id) {
        Some(s) => (StatusCode::OK, s.content.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Schema not found").into_response(),
    }
}

async fn active_spec(State(state): State<Arc<FakeState>>) -> impl IntoResponse {
    match state.active_spec.lock().unwrap().clone() {
        Some(doc) => Json(doc).into_response(),
        None => (StatusCode::NOT_FOUND, "No active specification").into_response(),
    }
}

/// Surface that records every host interaction for assertions.
#[derive(Default)]
pub struct RecordingSurface {
    pub reloads: AtomicUsize,
    pub confirm_answer: std::sync::atomic::AtomicBool,
    pub confirms: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<String>>,
    pub saved: Mutex<Vec<(String, Vec<u8>)>>,
    pub busy_events: Mutex<Vec<(Control, bool)>>,
    pub form_resets: AtomicUsize,
    pub documents: Mutex<Vec<(String, String)>>,
}

impl RecordingSurface {
    pub fn approving() -> Arc<Self> {
        let surface = Self::default();
        surface.confirm_answer.store(true, Ordering::SeqCst);
        Arc::new(surface)
    }

    pub fn declining() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl AdminSurface for RecordingSurface {
    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }

    fn open_external(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }

    fn save_file(&self, name: &str, contents: &[u8]) {
        self.saved
            .lock()
            .unwrap()
            .push((name.to_string(), contents.to_vec()));
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.confirms.lock().unwrap().push(prompt.to_string());
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn set_control_busy(&self, control: Control, busy: bool) {
        self.busy_events.lock().unwrap().push((control, busy));
    }

    fn reset_upload_form(&self) {
        self.form_resets.fetch_add(1, Ordering::SeqCst);
    }

    fn show_document(&self, title: &str, body: &str) {
        self.documents
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }
}

/// Config tuned for tests: short reload delays, strict request timeout.
pub fn test_config(base_url: &str) -> AdminConfig {
    AdminConfig {
        base_url: base_url.to_string(),
        poll_interval_ms: 50,
        reload_delay_ms: 50,
        upload_reload_delay_ms: 80,
        notice_ttl_ms: 5_000,
        request_timeout_ms: Some(1_000),
    }
}

pub fn test_client(base_url: &str) -> SchemaServiceClient {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .no_proxy()
        .build()
        .expect("build test http client");
    SchemaServiceClient::with_client(base_url, client)
}
