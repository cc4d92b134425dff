//! # Luma Deploy Command
//!
//! File: cli/src/commands/deploy/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `luma deploy` packages a project, uploads it to the deployment service and
//! follows the deployment until it finishes.
//!
//! ## Architecture
//!
//! - `pipeline.rs`: the archive, upload and monitor stages behind one `run` call
//! - `monitor.rs`: status polling and its `MonitorOutcome`
//! - `schedule.rs`: the `Clock` abstraction and deadline arithmetic for polling
//!
//! `handle_deploy` resolves settings, reads the project manifest, wires Ctrl+C
//! to the pipeline's cancellation token and maps the outcome to an exit status.
//!
//! ## Examples
//!
//! ```bash
//! # Deploy the project in the current directory
//! luma deploy
//!
//! # Deploy another directory against a staging API, without waiting
//! luma deploy ./site --api-url https://staging.example.com/dev --no-monitor
//!
//! # CI usage: key from the environment, shorter budget
//! LUMA_API_KEY=... luma deploy --timeout 300 --poll-interval 5
//! ```
//!
//! Exit status is 0 when the deployment is READY, when monitoring times out
//! (reported as a warning) and with `--no-monitor`. Everything else exits 1.
//!
use crate::common::credentials;
use crate::core::config::{self, ConfigOverrides};
use crate::core::error::Result;
use crate::core::manifest::ProjectManifest;
use anyhow::{anyhow, Context};
use clap::Args;
use monitor::MonitorOutcome;
use pipeline::PipelineContext;
use schedule::TokioClock;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub mod monitor;
pub mod pipeline;
pub mod schedule;

/// Arguments for `luma deploy`.
#[derive(Args)]
pub struct DeployArgs {
    /// Project directory to deploy (must contain luma.yaml and .gitignore).
    #[arg(default_value = ".")]
    pub project_root: PathBuf,

    /// Base URL of the deployment API.
    #[arg(long, env = "LUMA_API_URL")]
    pub api_url: Option<String>,

    /// API key; skips the secret store and the prompt.
    #[arg(long, env = "LUMA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Give up monitoring after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seconds between two status polls.
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Directory receiving the temporary archive [default: OS temp dir].
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Exit after the upload is accepted instead of waiting for the deployment.
    #[arg(long)]
    pub no_monitor: bool,
}

// Written by hand so the API key never reaches the logs.
impl fmt::Debug for DeployArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployArgs")
            .field("project_root", &self.project_root)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("build_dir", &self.build_dir)
            .field("no_monitor", &self.no_monitor)
            .finish()
    }
}

/// # Handle Deploy Command (`handle_deploy`)
///
/// ## Returns
///
/// * `Result<()>` - `Ok` for READY, a timed-out monitor, or a skipped monitor.
///   `Err` for configuration, build, credential and upload failures, a
///   terminal ERROR/CANCELED status, and aborted monitoring.
pub async fn handle_deploy(args: DeployArgs) -> Result<()> {
    info!("Handling deploy command with args: {:?}", args);

    let settings = config::load_settings(ConfigOverrides {
        api_url: args.api_url.clone(),
        timeout_secs: args.timeout,
        poll_interval_secs: args.poll_interval,
        build_dir: args.build_dir.clone(),
    })?;
    let manifest = ProjectManifest::load(&args.project_root)?;
    let credentials = credentials::default_provider(args.api_key.clone())
        .context("Failed to set up API key lookup")?;

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling deployment.");
            ctrl_c_token.cancel();
        }
    });

    let ctx = PipelineContext {
        settings,
        credentials,
        clock: Arc::new(TokioClock),
        cancel,
    };

    println!("🚀 Deploying package '{}'", manifest.name);
    let result = pipeline::run(&ctx, &args.project_root, &manifest.name, !args.no_monitor).await;
    ctrl_c.abort();
    let report = result?;
    debug!("Build artifact {} removed.", report.artifact_path.display());

    match report.outcome {
        None => {
            println!(
                "Monitoring skipped. Deployment {} is in progress.",
                report.deployment_id
            );
            Ok(())
        }
        Some(MonitorOutcome::Ready { url }) => {
            match url {
                Some(url) => println!("🎉 Deployment ready: {}", url),
                None => println!("🎉 Deployment ready."),
            }
            Ok(())
        }
        Some(MonitorOutcome::TimedOut { elapsed }) => {
            warn!(
                "Deployment {} did not finish within {}s.",
                report.deployment_id,
                elapsed.as_secs()
            );
            println!(
                "⚠️  Stopped waiting after {}s. Deployment {} may still complete.",
                elapsed.as_secs(),
                report.deployment_id
            );
            Ok(())
        }
        Some(MonitorOutcome::Failed { status, message }) => Err(anyhow!(
            "Deployment {} ended with status {}: {}",
            report.deployment_id,
            status,
            message.as_deref().unwrap_or("no error message provided")
        )),
        Some(MonitorOutcome::Aborted { reason }) => Err(anyhow!(
            "Stopped monitoring deployment {}: {}",
            report.deployment_id,
            reason
        )),
    }
}
