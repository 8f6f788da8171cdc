//! Job type dispatch.
//!
//! Each supported job type is a [`JobKind`] variant. Unknown types are not
//! an error: they produce a normal `failed` outcome.

use serde_json::json;

use crate::worker::api::{CompletionReport, Job, JobStatus, JsonMap};

/// Terminal outcome of executing a job.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: JobStatus,
    pub result: JsonMap,
    pub error: Option<String>,
}

impl Outcome {
    pub fn succeeded(result: JsonMap) -> Self {
        Self {
            status: JobStatus::Succeeded,
            result,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            result: JsonMap::new(),
            error: Some(error.into()),
        }
    }

    pub fn into_report(self) -> CompletionReport {
        CompletionReport {
            status: self.status,
            result: self.result,
            error: self.error,
        }
    }
}

/// Job types this agent knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Noop,
}

impl JobKind {
    const ALL: &'static [JobKind] = &[JobKind::Noop];

    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Noop => "noop",
        }
    }

    /// Look up a kind by its wire name.
    pub fn from_type(job_type: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == job_type)
    }

    fn run(&self, _payload: &JsonMap) -> Outcome {
        match self {
            JobKind::Noop => {
                let mut result = JsonMap::new();
                result.insert("message".to_string(), json!("noop"));
                Outcome::succeeded(result)
            }
        }
    }
}

/// Execute a claimed job. Never fails and performs no I/O.
pub fn execute(job: &Job) -> Outcome {
    match JobKind::from_type(&job.job_type) {
        Some(kind) => kind.run(&job.payload),
        None => Outcome::failed(format!("unsupported job type: {}", job.job_type)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn job(job_type: &str) -> Job {
        Job {
            id: 1,
            job_type: job_type.to_string(),
            payload: JsonMap::new(),
            status: None,
            result: JsonMap::new(),
            last_error: None,
        }
    }

    #[test]
    fn test_noop_succeeds() {
        let outcome = execute(&job("noop"));
        assert_eq!(outcome.status, JobStatus::Succeeded);
        assert_eq!(serde_json::Value::Object(outcome.result), json!({"message": "noop"}));
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn test_unknown_types_fail_with_message() {
        for ty in ["unknown", "", "NOOP", "noop "] {
            let outcome = execute(&job(ty));
            assert_eq!(outcome.status, JobStatus::Failed);
            assert!(outcome.result.is_empty());
            assert_eq!(outcome.error, Some(format!("unsupported job type: {}", ty)));
        }
    }

    #[test]
    fn test_kind_lookup() {
        assert_eq!(JobKind::from_type("noop"), Some(JobKind::Noop));
        assert_eq!(JobKind::from_type("shell"), None);
    }
}
