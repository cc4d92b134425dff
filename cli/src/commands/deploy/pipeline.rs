//! # Luma Deploy Pipeline (`commands::deploy::pipeline`)
//!
//! File: cli/src/commands/deploy/pipeline.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Runs one deployment end to end: archive the project, upload the archive,
//! and track the resulting deployment.
//!
//! ## Architecture
//!
//! Everything a stage needs travels in a `PipelineContext` built by the caller:
//! resolved settings, the credential provider, the clock and the cancellation
//! token. Stages run strictly one after the other.
//!
//! 1. Load `<root>/.gitignore` into an `IgnoreSpec`.
//! 2. Build the artifact into the configured build directory.
//! 3. Resolve the API key on a blocking thread, since the keyring and the
//!    terminal prompt are synchronous.
//! 4. Upload the artifact. It is deleted right after the upload attempt,
//!    whatever its result; on every other early exit it is deleted on drop.
//! 5. Monitor the deployment (unless skipped).
//!
//! Build and upload failures are returned as errors. Monitoring always yields a
//! `MonitorOutcome`, which the caller turns into an exit status.
//!
use super::monitor::{DeploymentMonitor, MonitorOutcome};
use super::schedule::Clock;
use crate::common::archive;
use crate::common::credentials::{ApiKey, CredentialProvider};
use crate::common::fs::ignore::{IgnoreSpec, IGNORE_FILENAME};
use crate::common::network::DeployClient;
use crate::core::config::DeploySettings;
use crate::core::error::{LumaError, Result};
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Shared collaborators of one pipeline run.
pub struct PipelineContext {
    pub settings: DeploySettings,
    pub credentials: Arc<dyn CredentialProvider>,
    pub clock: Arc<dyn Clock>,
    pub cancel: CancellationToken,
}

/// Result of a pipeline run that got past the upload.
#[derive(Debug)]
pub struct PipelineReport {
    pub deployment_id: String,
    /// `None` when monitoring was skipped.
    pub outcome: Option<MonitorOutcome>,
    /// Where the artifact lived. The file no longer exists when the report is returned.
    pub artifact_path: PathBuf,
}

/// # Run Pipeline (`run`)
///
/// ## Arguments
///
/// * `ctx` - Settings and collaborators for this run.
/// * `project_root` - Directory to archive; must contain `.gitignore`.
/// * `package` - Package name the deployment is filed under.
/// * `monitor` - Whether to poll the deployment after upload.
///
/// ## Errors
///
/// * `LumaError::Config` - missing or invalid ignore file, unusable API URL.
/// * `LumaError::Build` - archiving failed.
/// * `LumaError::Credential` - no API key could be obtained.
/// * `LumaError::Deployment` / `LumaError::Transport` - the upload failed.
///
/// Cancellation during the upload is also an error.
pub async fn run(
    ctx: &PipelineContext,
    project_root: &Path,
    package: &str,
    monitor: bool,
) -> Result<PipelineReport> {
    let ignore_spec = IgnoreSpec::load(&project_root.join(IGNORE_FILENAME))?;
    info!(
        "Loaded {} ignore patterns from {}",
        ignore_spec.pattern_count(),
        IGNORE_FILENAME
    );

    let artifact = archive::zip::build(project_root, &ignore_spec, &ctx.settings.build_dir)
        .context("Failed to build the deploy archive")?;
    let artifact_path = artifact.path().to_path_buf();
    println!(
        "📦 Built archive with {} files ({} bytes).",
        artifact.file_count(),
        artifact.size()
    );

    let api_key = resolve_api_key(ctx.credentials.clone()).await?;
    let client = DeployClient::new(ctx.settings.api_url.clone(), api_key)?;

    println!("⬆️  Uploading package '{}'...", package);
    let uploaded = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => None,
        result = client.upload(artifact.path(), package) => Some(result),
    };

    if let Err(e) = artifact.cleanup() {
        warn!("{:#}", e);
    }

    let deployment_id = match uploaded {
        Some(result) => result.context("Failed to upload the deploy archive")?,
        None => bail!("Deployment cancelled during upload"),
    };
    println!("✅ Upload accepted. Deployment id: {}", deployment_id);

    if !monitor {
        info!("Monitoring skipped for deployment {}", deployment_id);
        return Ok(PipelineReport {
            deployment_id,
            outcome: None,
            artifact_path,
        });
    }

    println!("⏳ Waiting for deployment to finish...");
    let outcome = DeploymentMonitor::new(&client, ctx.clock.as_ref(), &ctx.cancel)
        .monitor(
            &deployment_id,
            package,
            ctx.settings.timeout,
            ctx.settings.poll_interval,
        )
        .await;

    Ok(PipelineReport {
        deployment_id,
        outcome: Some(outcome),
        artifact_path,
    })
}

/// Asks the provider for the key on the blocking pool.
async fn resolve_api_key(credentials: Arc<dyn CredentialProvider>) -> Result<ApiKey> {
    tokio::task::spawn_blocking(move || credentials.api_key())
        .await
        .map_err(|e| LumaError::Credential(format!("API key lookup did not complete: {}", e)))?
}
