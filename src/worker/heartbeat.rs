//! Heartbeats for the job currently being executed.
//!
//! A [`HeartbeatTask`] is spawned right after a job is claimed. It sends one
//! heartbeat immediately, then one per interval, until it is asked to stop.
//!
//! ```text
//!   Idle ──spawn──▶ Active ──request_stop──▶ Stopped
//!                     │
//!                     └─ heartbeat() every interval (failures logged only)
//! ```
//!
//! Stopping is cooperative: a heartbeat already in flight is allowed to
//! finish, and no new one starts once the stop request has been seen.
//! Awaiting [`HeartbeatTask::stopped`] therefore guarantees that no
//! heartbeat for the job is still on the wire.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::worker::client::ControllerClient;

/// Lifecycle of a heartbeat task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatState {
    Idle,
    Active,
    Stopped,
}

/// Handle to a running heartbeat loop for one job.
pub struct HeartbeatTask {
    job_id: u64,
    cancel: CancellationToken,
    state: watch::Receiver<HeartbeatState>,
    handle: JoinHandle<u64>,
}

impl HeartbeatTask {
    /// Start sending heartbeats for `job_id`.
    pub fn spawn(client: ControllerClient, job_id: u64, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let (state_tx, state) = watch::channel(HeartbeatState::Idle);

        let handle = tokio::spawn(run(client, job_id, interval, cancel.clone(), state_tx));

        Self {
            job_id,
            cancel,
            state,
            handle,
        }
    }

    pub fn job_id(&self) -> u64 {
        self.job_id
    }

    pub fn state(&self) -> HeartbeatState {
        *self.state.borrow()
    }

    /// Wait until the loop has left `Idle`.
    ///
    /// `spawn` only schedules the loop; callers that must not start work
    /// before heartbeats are running await this first.
    pub async fn active(&mut self) -> HeartbeatState {
        match self.state.wait_for(|s| *s != HeartbeatState::Idle).await {
            Ok(state) => *state,
            // Sender gone means the loop already exited.
            Err(_) => HeartbeatState::Stopped,
        }
    }

    /// Ask the loop to stop. Does not wait.
    pub fn request_stop(&self) {
        self.cancel.cancel();
    }

    /// Wait until the loop has exited. Returns the number of heartbeats sent.
    pub async fn stopped(self) -> u64 {
        match self.handle.await {
            Ok(sent) => sent,
            Err(e) => {
                tracing::error!(job_id = self.job_id, "Heartbeat task aborted: {}", e);
                0
            }
        }
    }

    /// Request a stop and wait for it.
    pub async fn stop(self) -> u64 {
        self.request_stop();
        self.stopped().await
    }
}

async fn run(
    client: ControllerClient,
    job_id: u64,
    interval: Duration,
    cancel: CancellationToken,
    state: watch::Sender<HeartbeatState>,
) -> u64 {
    state.send_replace(HeartbeatState::Active);
    tracing::debug!(job_id, ?interval, "Heartbeat started");

    let mut sent = 0;
    beat(&client, job_id).await;
    sent += 1;

    // tokio panics on a zero period.
    let period = interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                beat(&client, job_id).await;
                sent += 1;
            }
        }
    }

    state.send_replace(HeartbeatState::Stopped);
    tracing::debug!(job_id, sent, "Heartbeat stopped");
    sent
}

async fn beat(client: &ControllerClient, job_id: u64) {
    match client.heartbeat(job_id).await {
        Ok(()) => tracing::debug!(job_id, "Heartbeat sent"),
        Err(e) => tracing::warn!(job_id, "{}", e),
    }
}
