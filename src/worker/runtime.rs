//! Claim/execute/complete cycle and the polling loop around it.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::AgentConfig;
use crate::error::ClientError;
use crate::worker::api::JobStatus;
use crate::worker::client::ControllerClient;
use crate::worker::dispatch;
use crate::worker::heartbeat::HeartbeatTask;

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The controller had no work.
    Idle,
    /// A job was executed and its outcome reported.
    Completed { job_id: u64, status: JobStatus },
}

/// Drives jobs from the controller through execution.
pub struct WorkerRuntime {
    client: ControllerClient,
    heartbeat_interval: Duration,
    poll_interval: Duration,
}

impl WorkerRuntime {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: ControllerClient::new(config),
            heartbeat_interval: config.heartbeat_interval,
            poll_interval: config.poll_interval,
        }
    }

    /// Run exactly one cycle.
    ///
    /// Claim and complete failures end the cycle and are returned. Heartbeat
    /// failures are only logged. Completion is sent after the heartbeat task
    /// has fully stopped, so the controller never sees a heartbeat for a job
    /// it already considers finished.
    pub async fn run_once(&self) -> Result<CycleOutcome, ClientError> {
        let Some(job) = self.client.claim().await? else {
            tracing::debug!("No job available");
            return Ok(CycleOutcome::Idle);
        };

        tracing::info!(job_id = job.id, job_type = %job.job_type, "Claimed job");

        let mut heartbeat =
            HeartbeatTask::spawn(self.client.clone(), job.id, self.heartbeat_interval);
        let state = heartbeat.active().await;
        tracing::debug!(job_id = heartbeat.job_id(), ?state, "Heartbeat running");

        let outcome = dispatch::execute(&job);

        let beats = heartbeat.stop().await;

        let status = outcome.status;
        if let Some(ref error) = outcome.error {
            tracing::warn!(job_id = job.id, "Job failed: {}", error);
        }

        self.client.complete(job.id, &outcome.into_report()).await?;

        tracing::info!(job_id = job.id, %status, heartbeats = beats, "Job completed");

        Ok(CycleOutcome::Completed {
            job_id: job.id,
            status,
        })
    }

    /// Run cycles until `shutdown` is cancelled.
    ///
    /// Cycle errors are logged and the loop continues. The poll interval is
    /// slept after every cycle regardless of its result.
    pub async fn run_forever(&self, shutdown: CancellationToken) {
        tracing::info!(poll_interval = ?self.poll_interval, "Worker loop started");

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            if let Err(e) = self.run_once().await {
                tracing::error!("{}", e);
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        tracing::info!("Worker loop stopped");
    }
}
