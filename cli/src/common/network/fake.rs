//! In-process fake of the deployment service, for unit tests.
//!
//! Serves the upload and status endpoints on an ephemeral localhost port. The
//! upload answer is fixed per service; status answers are replayed in order,
//! and the last one repeats forever.
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use reqwest::Url;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub struct FakeServiceConfig {
    pub upload_status: u16,
    pub upload_body: String,
    pub statuses: Vec<(u16, String)>,
}

impl Default for FakeServiceConfig {
    fn default() -> Self {
        Self {
            upload_status: 202,
            upload_body: r#"{"deploymentId":"abc123"}"#.to_string(),
            statuses: vec![(200, r#"{"status":"READY"}"#.to_string())],
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub package: String,
    pub api_key: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

struct FakeState {
    upload_status: StatusCode,
    upload_body: String,
    statuses: Mutex<VecDeque<(u16, String)>>,
    uploads: Mutex<Vec<RecordedUpload>>,
    polls: Mutex<Vec<String>>,
}

pub struct FakeService {
    base_url: Url,
    state: Arc<FakeState>,
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn upload(
    State(state): State<Arc<FakeState>>,
    Path(package): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    state.uploads.lock().unwrap().push(RecordedUpload {
        package,
        api_key: header_str(&headers, "x-api-key"),
        content_type: header_str(&headers, header::CONTENT_TYPE.as_str()),
        body: body.to_vec(),
    });
    (state.upload_status, state.upload_body.clone())
}

async fn status(
    State(state): State<Arc<FakeState>>,
    Path((package, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let key = header_str(&headers, "x-api-key").unwrap_or_default();
    state
        .polls
        .lock()
        .unwrap()
        .push(format!("{}/{} key={}", package, id, key));

    let (code, body) = {
        let mut queue = state.statuses.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    };
    (
        StatusCode::from_u16(code).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

impl FakeService {
    pub async fn start(config: FakeServiceConfig) -> Self {
        assert!(!config.statuses.is_empty(), "at least one status answer is required");
        let state = Arc::new(FakeState {
            upload_status: StatusCode::from_u16(config.upload_status).unwrap(),
            upload_body: config.upload_body,
            statuses: Mutex::new(config.statuses.into()),
            uploads: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/packages/{package}", post(upload))
            .route("/status/packages/{package}/deployments/{id}", get(status))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{}", addr)).unwrap(),
            state,
        }
    }

    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        self.state.polls.lock().unwrap().len()
    }

    pub fn last_poll(&self) -> Option<String> {
        self.state.polls.lock().unwrap().last().cloned()
    }
}
