//! # Luma Network Utilities Module (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Everything that talks to the remote deployment service lives here.
//!
//! ## Architecture
//!
//! - **Wire types** (this file): `DeploymentStatus` as returned by the status
//!   endpoint and the `DeploymentState` it maps to.
//! - **`StatusSource`** (this file): the seam the deployment monitor polls
//!   through. `DeployClient` implements it against the real service; tests
//!   substitute scripted sources.
//! - **`client`**: `DeployClient`, the `reqwest`-based HTTP client for the
//!   upload and status endpoints.
//!
//! ## Endpoints
//!
//! - `POST <base>/packages/{package}` with the zip as body, answered by
//!   `202 {"deploymentId": "..."}`.
//! - `GET <base>/status/packages/{package}/deployments/{id}`, answered by
//!   `{"status": "...", "deploymentUrl"?: "...", "errorMessage"?: "..."}`.
//!
use crate::core::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

pub mod client;
#[cfg(test)]
pub mod fake;

pub use client::DeployClient;

/// Remote lifecycle of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentState {
    Queued,
    Ready,
    Error,
    Canceled,
    /// A status value this client does not know, or no status at all.
    Unknown(String),
}

impl DeploymentState {
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("QUEUED") => Self::Queued,
            Some("READY") => Self::Ready,
            Some("ERROR") => Self::Error,
            Some("CANCELED") => Self::Canceled,
            Some(other) => Self::Unknown(other.to_string()),
            None => Self::Unknown(String::new()),
        }
    }

    /// READY, ERROR and CANCELED are final; everything else may still change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Error | Self::Canceled)
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => f.write_str("QUEUED"),
            Self::Ready => f.write_str("READY"),
            Self::Error => f.write_str("ERROR"),
            Self::Canceled => f.write_str("CANCELED"),
            Self::Unknown(raw) if raw.is_empty() => f.write_str("<none>"),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Body of the status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub deployment_url: Option<String>,
    #[serde(default, alias = "error_message")]
    pub error_message: Option<String>,
}

impl DeploymentStatus {
    pub fn state(&self) -> DeploymentState {
        DeploymentState::from_wire(self.status.as_deref())
    }
}

/// Source of deployment status snapshots, polled by the deployment monitor.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, package: &str, deployment_id: &str) -> Result<DeploymentStatus>;
}
