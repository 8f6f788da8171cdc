//! Error types for the agent.

use std::fmt;

/// Configuration errors. Fatal before any cycle runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is required")]
    MissingRequired { key: String },

    #[error("{key} must be a positive integer")]
    InvalidValue { key: String },
}

/// The controller call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Claim,
    Heartbeat,
    Complete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Claim => "claim",
            Operation::Heartbeat => "heartbeat",
            Operation::Complete => "complete",
        })
    }
}

/// Errors produced by the controller client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP call could not be completed (connect, timeout, body read).
    #[error("{operation} request failed: {reason}")]
    Transport { operation: Operation, reason: String },

    /// The controller answered with a non-success status, or a claim
    /// response carried no usable job.
    #[error("{operation} failed: {message}")]
    Protocol {
        operation: Operation,
        status: u16,
        message: String,
    },

    /// A success body could not be parsed into the expected shape.
    #[error("{operation} response could not be decoded: {reason}")]
    Decode { operation: Operation, reason: String },
}

impl ClientError {
    pub fn operation(&self) -> Operation {
        match self {
            ClientError::Transport { operation, .. }
            | ClientError::Protocol { operation, .. }
            | ClientError::Decode { operation, .. } => *operation,
        }
    }
}

/// Result type for controller client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
