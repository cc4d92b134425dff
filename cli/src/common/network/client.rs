//! # Luma Deploy Client (`common::network::client`)
//!
//! File: cli/src/common/network/client.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `DeployClient` is the HTTP client for the deployment service. It uploads a
//! built artifact and fetches deployment status snapshots. Every request
//! carries the API key in the `x-api-key` header. The key is resolved before
//! the client is built, so no request ever waits on a keyring or a prompt.
//!
//! ## Error Mapping
//!
//! - Artifact missing or unreadable before upload: `LumaError::Build`.
//! - Upload answered with anything but `202 Accepted` plus a JSON body with a
//!   `deploymentId`: `LumaError::Deployment` carrying status and raw body.
//! - Status endpoint answered with a non-2xx code: `LumaError::Deployment`.
//! - Connection, TLS, timeout or undecodable status body: `LumaError::Transport`.
//!
use super::{DeploymentStatus, StatusSource};
use crate::common::credentials::ApiKey;
use crate::core::error::{LumaError, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, StatusCode, Url};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const STATUS_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    deployment_id: String,
}

/// # Deploy Client (`DeployClient`)
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct DeployClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: ApiKey,
}

impl DeployClient {
    /// # New Client (`new`)
    ///
    /// ## Arguments
    ///
    /// * `base_url` - Root of the deployment API. May carry a path prefix
    ///   such as a stage name (`https://host/dev`).
    /// * `api_key` - Key sent with every request.
    ///
    /// ## Errors
    ///
    /// Returns `LumaError::Config` if the URL cannot carry path segments, or
    /// `LumaError::Transport` if the HTTP client cannot be initialized.
    pub fn new(base_url: Url, api_key: ApiKey) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(LumaError::Config(format!("API URL '{}' cannot be a base URL", base_url)).into());
        }
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("luma/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LumaError::from)?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                LumaError::Config(format!("API URL '{}' cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// # Upload Artifact (`upload`)
    ///
    /// Streams the archive at `artifact` to `POST <base>/packages/{package}`.
    /// The file is read in chunks, never loaded into memory whole.
    ///
    /// ## Returns
    ///
    /// The deployment identifier assigned by the service.
    ///
    /// ## Errors
    ///
    /// See the module documentation for the mapping of failures to `LumaError`.
    #[instrument(skip(self))]
    pub async fn upload(&self, artifact: &Path, package: &str) -> Result<String> {
        if !artifact.is_file() {
            return Err(LumaError::Build(format!(
                "Build artifact not found: {}",
                artifact.display()
            ))
            .into());
        }

        let url = self.endpoint(&["packages", package])?;
        debug!("POST {}", url);

        let file = tokio::fs::File::open(artifact).await.map_err(|e| {
            LumaError::Build(format!("Cannot open {}: {}", artifact.display(), e))
        })?;
        let length = file
            .metadata()
            .await
            .map_err(|e| LumaError::Build(format!("Cannot stat {}: {}", artifact.display(), e)))?
            .len();

        info!("Uploading {} bytes for package '{}'", length, package);
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .header(CONTENT_TYPE, "application/zip")
            .header(CONTENT_LENGTH, length)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await
            .map_err(LumaError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(LumaError::from)?;
        debug!("Upload answered {}: {}", status, body);

        if status != StatusCode::ACCEPTED {
            return Err(LumaError::Deployment {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        match serde_json::from_str::<UploadResponse>(&body) {
            Ok(parsed) if !parsed.deployment_id.is_empty() => {
                info!("Deployment accepted with id {}", parsed.deployment_id);
                Ok(parsed.deployment_id)
            }
            _ => Err(LumaError::Deployment {
                status: status.as_u16(),
                body,
            }
            .into()),
        }
    }

    /// # Fetch Status (`fetch_status`)
    ///
    /// One `GET <base>/status/packages/{package}/deployments/{id}` request.
    #[instrument(skip(self))]
    pub async fn fetch_status(&self, package: &str, deployment_id: &str) -> Result<DeploymentStatus> {
        let url = self.endpoint(&["status", "packages", package, "deployments", deployment_id])?;

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .timeout(STATUS_REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(LumaError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LumaError::Deployment {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed = response
            .json::<DeploymentStatus>()
            .await
            .map_err(LumaError::from)?;
        debug!("Deployment {} status: {}", deployment_id, parsed.state());
        Ok(parsed)
    }
}

#[async_trait]
impl StatusSource for DeployClient {
    async fn fetch_status(&self, package: &str, deployment_id: &str) -> Result<DeploymentStatus> {
        DeployClient::fetch_status(self, package, deployment_id).await
    }
}
