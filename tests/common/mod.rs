//! In-process stand-ins for the ComfyUI and ElevenLabs HTTP APIs.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PROMPT_ID: &str = "job-1";

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// ComfyUI
// ---------------------------------------------------------------------------

pub struct MockComfy {
    submit_status: StatusCode,
    submit_body: String,
    pending_polls: usize,
    entry: Value,
    submits: AtomicUsize,
    polls: AtomicUsize,
    views: AtomicUsize,
    last_prompt: Mutex<Option<Value>>,
}

impl MockComfy {
    /// Answers `pending_polls` history requests with `{}`, then with `entry`.
    pub fn new(pending_polls: usize, entry: Value) -> Self {
        Self {
            submit_status: StatusCode::OK,
            submit_body: json!({"prompt_id": PROMPT_ID, "number": 0, "node_errors": {}})
                .to_string(),
            pending_polls,
            entry,
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            views: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn with_submit_response(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.submit_status = status;
        self.submit_body = body.into();
        self
    }

    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn views(&self) -> usize {
        self.views.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<Value> {
        self.last_prompt.lock().unwrap().clone()
    }
}

/// A successful history entry listing the given files under node "2".
pub fn video_entry(filenames: &[&str]) -> Value {
    let videos: Vec<Value> = filenames
        .iter()
        .map(|f| json!({"filename": f, "subfolder": "", "type": "output"}))
        .collect();
    json!({
        "prompt": [0, PROMPT_ID, {}, {}, ["2"]],
        "outputs": {"2": {"videos": videos}},
        "status": {"status_str": "success", "completed": true, "messages": []}
    })
}

pub async fn spawn_comfy(mock: Arc<MockComfy>) -> String {
    let router = Router::new()
        .route("/prompt", post(queue_prompt))
        .route("/history/{prompt_id}", get(history))
        .route("/view", get(view))
        .with_state(mock);
    serve(router).await
}

async fn queue_prompt(
    State(mock): State<Arc<MockComfy>>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    mock.submits.fetch_add(1, Ordering::SeqCst);
    *mock.last_prompt.lock().unwrap() = Some(body);
    (mock.submit_status, mock.submit_body.clone())
}

async fn history(
    State(mock): State<Arc<MockComfy>>,
    Path(prompt_id): Path<String>,
) -> Json<Value> {
    let seen = mock.polls.fetch_add(1, Ordering::SeqCst);
    let mut history = Map::new();
    if seen >= mock.pending_polls {
        history.insert(prompt_id, mock.entry.clone());
    }
    Json(Value::Object(history))
}

async fn view(
    State(mock): State<Arc<MockComfy>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Vec<u8>) {
    mock.views.fetch_add(1, Ordering::SeqCst);
    match params.get("filename") {
        Some(name) if name != "missing.mp4" && params.get("type").is_some() => {
            (StatusCode::OK, format!("bytes-of-{name}").into_bytes())
        }
        _ => (StatusCode::NOT_FOUND, b"not found".to_vec()),
    }
}

// ---------------------------------------------------------------------------
// ElevenLabs
// ---------------------------------------------------------------------------

pub struct MockMusic {
    status: StatusCode,
    body: Vec<u8>,
    requests: AtomicUsize,
    last_key: Mutex<Option<String>>,
    last_body: Mutex<Option<Value>>,
}

impl MockMusic {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            requests: AtomicUsize::new(0),
            last_key: Mutex::new(None),
            last_body: Mutex::new(None),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn last_key(&self) -> Option<String> {
        self.last_key.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }
}

pub async fn spawn_music(mock: Arc<MockMusic>) -> String {
    let router = Router::new()
        .route("/v1/text-to-music", post(text_to_music))
        .with_state(mock);
    serve(router).await
}

async fn text_to_music(
    State(mock): State<Arc<MockMusic>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    mock.requests.fetch_add(1, Ordering::SeqCst);
    *mock.last_key.lock().unwrap() = headers
        .get("xi-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *mock.last_body.lock().unwrap() = Some(body);

    let content_type = if mock.status.is_success() {
        "audio/mpeg"
    } else {
        "application/json"
    };
    (
        mock.status,
        [(header::CONTENT_TYPE, content_type)],
        mock.body.clone(),
    )
}
