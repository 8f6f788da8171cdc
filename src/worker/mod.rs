//! Worker mode: claim jobs from the controller, run them, report back.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ fennec-agent work                            │
//! │                                              │
//! │  WorkerRuntime::run_forever                  │
//! │    └─ run_once                               │
//! │        ├─ ControllerClient::claim ───────────┼──▶ POST /agent/v1/jobs/claim
//! │        ├─ HeartbeatTask (concurrent) ────────┼──▶ POST /agent/v1/jobs/{id}/heartbeat
//! │        ├─ dispatch::execute                  │
//! │        └─ ControllerClient::complete ────────┼──▶ POST /agent/v1/jobs/{id}/complete
//! └──────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod client;
pub mod dispatch;
pub mod heartbeat;
pub mod runtime;

pub use api::{CompletionReport, Job, JobStatus, JsonMap};
pub use client::ControllerClient;
pub use dispatch::{JobKind, Outcome};
pub use heartbeat::{HeartbeatState, HeartbeatTask};
pub use runtime::{CycleOutcome, WorkerRuntime};
