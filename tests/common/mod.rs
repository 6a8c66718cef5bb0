#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures_util::StreamExt;
use llm_playground::client::GenerationClient;
use reqwest::Url;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub type Responder = Arc<dyn Fn(&Value) -> (StatusCode, String) + Send + Sync>;

pub fn output(text: &str) -> (StatusCode, String) {
    (StatusCode::OK, json!({ "output": text }).to_string())
}

/// Lane A runs at temperature 0.5 by default, lane B at 0.8.
pub fn is_lane_b(body: &Value) -> bool {
    body["temperature"].as_f64().unwrap_or_default() > 0.6
}

#[derive(Clone)]
struct MockState {
    calls: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Value>>>,
    delay: Duration,
    responder: Responder,
    stream_status: StatusCode,
    stream_frames: Arc<Vec<Vec<u8>>>,
    frame_gap: Duration,
}

pub struct MockBuilder {
    delay: Duration,
    responder: Responder,
    stream_status: StatusCode,
    stream_frames: Vec<Vec<u8>>,
    frame_gap: Duration,
}

impl MockBuilder {
    pub fn respond_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> (StatusCode, String) + Send + Sync + 'static,
    {
        self.responder = Arc::new(f);
        self
    }

    pub fn output(self, text: &'static str) -> Self {
        self.respond_with(move |_| output(text))
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn stream_frames(mut self, frames: Vec<Vec<u8>>) -> Self {
        self.stream_frames = frames;
        self
    }

    pub fn stream_status(mut self, status: StatusCode) -> Self {
        self.stream_status = status;
        self
    }

    pub fn frame_gap(mut self, gap: Duration) -> Self {
        self.frame_gap = gap;
        self
    }

    pub async fn start(self) -> MockBackend {
        let state = MockState {
            calls: Arc::default(),
            active: Arc::default(),
            max_active: Arc::default(),
            requests: Arc::default(),
            delay: self.delay,
            responder: self.responder,
            stream_status: self.stream_status,
            stream_frames: Arc::new(self.stream_frames),
            frame_gap: self.frame_gap,
        };

        let app = Router::new()
            .route("/generate-local", post(generate))
            .route("/generate-local/stream", post(generate_stream))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockBackend {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            state,
        }
    }
}

pub struct MockBackend {
    pub url: Url,
    state: MockState,
}

impl MockBackend {
    pub fn builder() -> MockBuilder {
        MockBuilder {
            delay: Duration::ZERO,
            responder: Arc::new(|_| output("")),
            stream_status: StatusCode::OK,
            stream_frames: Vec::new(),
            frame_gap: Duration::from_millis(10),
        }
    }

    pub fn client(&self) -> GenerationClient {
        GenerationClient::new(self.url.clone())
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.state.max_active.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    pub async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.calls() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("backend never saw the expected calls");
    }
}

async fn generate(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let active = state.active.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_active.fetch_max(active, Ordering::SeqCst);
    state.requests.lock().unwrap().push(body.clone());

    tokio::time::sleep(state.delay).await;

    state.active.fetch_sub(1, Ordering::SeqCst);
    let (status, text) = (state.responder)(&body);
    (status, [(header::CONTENT_TYPE, "application/json")], text).into_response()
}

async fn generate_stream(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push(body);

    if !state.stream_status.is_success() {
        return (state.stream_status, "stream unavailable").into_response();
    }

    let frames = state.stream_frames.clone();
    let gap = state.frame_gap;
    let stream = futures_util::stream::iter(0..frames.len()).then(move |i| {
        let frames = frames.clone();
        async move {
            tokio::time::sleep(gap).await;
            Ok::<_, Infallible>(frames[i].clone())
        }
    });

    Body::from_stream(stream).into_response()
}
