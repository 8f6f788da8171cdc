//! Fennec agent: claims jobs from a Fennec controller, executes them, and
//! reports the outcome while sending heartbeats.

pub mod config;
pub mod error;
pub mod shutdown;
pub mod worker;

pub use config::AgentConfig;
pub use error::{ClientError, ConfigError};
pub use worker::{CycleOutcome, WorkerRuntime};
