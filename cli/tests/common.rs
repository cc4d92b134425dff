//! # Luma CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`:
//!
//! - `luma_cmd()`: the compiled binary, isolated from the developer's own
//!   configuration and keyring.
//! - `Project`: a throwaway Luma project on disk.
//! - `FakeDeployService`: an `axum` fake of the deployment service running on
//!   its own Tokio runtime, so blocking `assert_cmd` calls can talk to it.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// # Get Luma Command (`luma_cmd`)
///
/// An `assert_cmd::Command` for the `luma` binary with an empty configuration
/// file, a fixed API key and no inherited log filter.
///
/// The returned `TempDir` holds the configuration file and must outlive the command.
pub fn luma_cmd() -> (Command, TempDir) {
    let config_dir = tempfile::tempdir().expect("Failed to create config dir");
    let config_path = config_dir.path().join("config.toml");
    fs::write(&config_path, "").expect("Failed to write config file");

    let mut cmd = Command::cargo_bin("luma").expect("Failed to find luma binary for testing");
    cmd.env("LUMA_CONFIG", &config_path)
        .env("LUMA_API_KEY", "integration-key")
        .env_remove("LUMA_API_URL")
        .env_remove("RUST_LOG");
    (cmd, config_dir)
}

/// A project directory with a manifest, an ignore file and a little content.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new(manifest: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create project dir");
        if let Some(manifest) = manifest {
            fs::write(dir.path().join("luma.yaml"), manifest).unwrap();
        }
        fs::write(dir.path().join(".gitignore"), "node_modules/\n.luma/\n").unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(dir.path().join("pages/index.md"), "# Welcome\n").unwrap();
        fs::create_dir_all(dir.path().join("node_modules/dep")).unwrap();
        fs::write(dir.path().join("node_modules/dep/index.js"), "module.exports = 1;").unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

struct ServiceState {
    upload: (StatusCode, String),
    statuses: Mutex<VecDeque<String>>,
    uploads: Mutex<Vec<(String, usize)>>,
    polls: Mutex<usize>,
}

/// Fake deployment service. Status bodies are replayed in order; the last repeats.
pub struct FakeDeployService {
    runtime: tokio::runtime::Runtime,
    url: String,
    state: Arc<ServiceState>,
}

async fn upload(
    State(state): State<Arc<ServiceState>>,
    Path(package): Path<String>,
    body: axum::body::Bytes,
) -> (StatusCode, String) {
    state.uploads.lock().unwrap().push((package, body.len()));
    state.upload.clone()
}

async fn status(
    State(state): State<Arc<ServiceState>>,
    Path((_package, _id)): Path<(String, String)>,
) -> ([(header::HeaderName, &'static str); 1], String) {
    *state.polls.lock().unwrap() += 1;
    let body = {
        let mut queue = state.statuses.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    };
    ([(header::CONTENT_TYPE, "application/json")], body)
}

impl FakeDeployService {
    pub fn start(upload_status: u16, upload_body: &str, statuses: &[&str]) -> Self {
        let state = Arc::new(ServiceState {
            upload: (
                StatusCode::from_u16(upload_status).unwrap(),
                upload_body.to_string(),
            ),
            statuses: Mutex::new(statuses.iter().map(|s| s.to_string()).collect()),
            uploads: Mutex::new(Vec::new()),
            polls: Mutex::new(0),
        });
        let app = Router::new()
            .route("/dev/packages/{package}", post(upload))
            .route("/dev/status/packages/{package}/deployments/{id}", get(status))
            .with_state(state.clone());

        let runtime = tokio::runtime::Runtime::new().expect("Failed to start runtime");
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("Failed to bind fake service");
        let addr = listener.local_addr().unwrap();
        runtime.spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            runtime,
            url: format!("http://{}/dev", addr),
            state,
        }
    }

    /// Accepts uploads with id `abc123` and answers polls with `statuses`.
    pub fn accepting(statuses: &[&str]) -> Self {
        Self::start(202, r#"{"deploymentId":"abc123"}"#, statuses)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Package names and body sizes of all received uploads.
    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        *self.state.polls.lock().unwrap()
    }
}
