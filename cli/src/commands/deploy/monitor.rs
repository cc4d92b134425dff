//! # Luma Deployment Monitor (`commands::deploy::monitor`)
//!
//! File: cli/src/commands/deploy/monitor.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! After an upload is accepted the deployment runs remotely. The monitor polls
//! its status until it reaches a terminal state, the time budget is spent, or
//! the pipeline is cancelled.
//!
//! ## Outcomes
//!
//! Monitoring never fails with an error; every way it can end is a
//! `MonitorOutcome`:
//!
//! - `Ready`: status `READY`, with the deployment URL when the service sent one.
//! - `Failed`: status `ERROR` or `CANCELED`, with the service's error message.
//! - `TimedOut`: no terminal status before the deadline. A status request
//!   still in flight when the deadline passes is dropped.
//! - `Aborted`: a poll failed (transport error, non-success status,
//!   undecodable body) or the pipeline was cancelled. Failed polls are not retried.
//!
//! Any status other than the three terminal ones, including a missing one, is
//! treated as "still running".
//!
use super::schedule::{Clock, PollScheduler};
use crate::common::network::{DeploymentState, StatusSource};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Reason recorded when monitoring ends through the cancellation token.
pub const CANCELLED_REASON: &str = "cancelled";

/// How a monitoring session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    Ready { url: Option<String> },
    Failed { status: DeploymentState, message: Option<String> },
    TimedOut { elapsed: Duration },
    Aborted { reason: String },
}

/// # Deployment Monitor (`DeploymentMonitor`)
///
/// Borrows its collaborators from the pipeline context for one session.
pub struct DeploymentMonitor<'a> {
    source: &'a dyn StatusSource,
    clock: &'a dyn Clock,
    cancel: &'a CancellationToken,
}

impl<'a> DeploymentMonitor<'a> {
    pub fn new(
        source: &'a dyn StatusSource,
        clock: &'a dyn Clock,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            source,
            clock,
            cancel,
        }
    }

    /// # Monitor Deployment (`monitor`)
    ///
    /// Polls immediately, then every `poll_interval`, until an outcome is
    /// reached. The timeout is measured from the start of this call and covers
    /// the status requests as well as the waits between them: the last wait is
    /// shortened so it ends exactly at the deadline, and a request that is
    /// still pending then is abandoned.
    ///
    /// ## Arguments
    ///
    /// * `deployment_id` - Identifier returned by the upload.
    /// * `package` - Package the deployment belongs to.
    /// * `timeout` - Total time budget for monitoring.
    /// * `poll_interval` - Pause between two polls.
    pub async fn monitor(
        &self,
        deployment_id: &str,
        package: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> MonitorOutcome {
        let scheduler = PollScheduler::new(self.clock.now(), timeout, poll_interval);
        let mut last_state = DeploymentState::Queued;
        let mut polls: u32 = 0;

        loop {
            let now = self.clock.now();
            if scheduler.expired(now) {
                let elapsed = scheduler.elapsed(now);
                warn!(
                    "Deployment {} still {} after {:?} ({} polls); giving up.",
                    deployment_id, last_state, elapsed, polls
                );
                return MonitorOutcome::TimedOut { elapsed };
            }
            if self.cancel.is_cancelled() {
                return cancelled();
            }

            polls += 1;
            let remaining = scheduler.remaining(now);
            let fetched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return cancelled(),
                result = self.source.fetch_status(package, deployment_id) => result,
                _ = self.clock.sleep(remaining) => {
                    let elapsed = scheduler.elapsed(self.clock.now());
                    warn!(
                        "Status poll {} for {} did not answer before the deadline; giving up.",
                        polls, deployment_id
                    );
                    return MonitorOutcome::TimedOut { elapsed };
                }
            };
            let snapshot = match fetched {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Status poll {} for {} failed: {:#}", polls, deployment_id, e);
                    return MonitorOutcome::Aborted {
                        reason: format!("{:#}", e),
                    };
                }
            };

            let state = snapshot.state();
            if state != last_state {
                info!("Deployment {} is now {}", deployment_id, state);
                last_state = state.clone();
            } else {
                debug!("Deployment {} still {} (poll {})", deployment_id, state, polls);
            }

            if state.is_terminal() {
                return match state {
                    DeploymentState::Ready => MonitorOutcome::Ready {
                        url: snapshot.deployment_url,
                    },
                    _ => MonitorOutcome::Failed {
                        status: state,
                        message: snapshot.error_message,
                    },
                };
            }

            let delay = scheduler.next_delay(self.clock.now());
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return cancelled(),
                _ = self.clock.sleep(delay) => {}
            }
        }
    }
}

fn cancelled() -> MonitorOutcome {
    info!("Deployment monitoring cancelled.");
    MonitorOutcome::Aborted {
        reason: CANCELLED_REASON.to_string(),
    }
}
