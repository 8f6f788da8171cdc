//! Wire types for agent-to-controller communication.

use serde::{Deserialize, Deserializer, Serialize};

/// Handler-specific input or output. `serde_json::Value` is the tagged
/// value type (null, bool, number, string, array, object).
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// A unit of work assigned by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Controller-assigned identifier. Zero means "no job".
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[serde(default, deserialize_with = "lenient_map")]
    pub payload: JsonMap,
    /// Lifecycle label as last seen by the controller (e.g. `running`).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub result: JsonMap,
    #[serde(default)]
    pub last_error: Option<String>,
}

/// Body of a `200` claim response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    #[serde(default)]
    pub job: Option<Job>,
}

/// Terminal status the agent reports for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /agent/v1/jobs/{id}/complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub status: JobStatus,
    pub result: JsonMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// RFC 7807 problem body returned by the controller on failure.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type", default)]
    pub problem_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Turn a non-success response body into a human-readable message.
///
/// `"<title>: <detail>"` for a problem body with both fields, `"<title>"`
/// without a detail, the raw body otherwise, and `"empty response"` for an
/// empty body.
pub fn format_problem(body: &str) -> String {
    if body.is_empty() {
        return "empty response".to_string();
    }

    // Only a JSON object is a problem body; serde would also accept an array.
    let problem = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value::<ProblemDetails>(v).ok());

    if let Some(problem) = problem {
        let title = problem.title.unwrap_or_default();
        if !title.is_empty() {
            return match problem.detail.filter(|d| !d.is_empty()) {
                Some(detail) => format!("{}: {}", title, detail),
                None => title,
            };
        }
    }

    body.to_string()
}

// The controller encodes an empty map as `[]`, and may send `null`.
fn lenient_map<'de, D>(deserializer: D) -> Result<JsonMap, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(JsonMap::new()),
        serde_json::Value::Array(items) if items.is_empty() => Ok(JsonMap::new()),
        other => Err(D::Error::custom(format!(
            "expected a JSON object, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_problem_title_and_detail() {
        let body = r#"{"type":"about:blank","title":"busy","status":503,"detail":"retry later"}"#;
        assert_eq!(format_problem(body), "busy: retry later");
    }

    #[test]
    fn test_format_problem_title_only() {
        assert_eq!(format_problem(r#"{"title":"Unauthorized","detail":""}"#), "Unauthorized");
        assert_eq!(format_problem(r#"{"title":"Unauthorized"}"#), "Unauthorized");
    }

    #[test]
    fn test_format_problem_falls_back_to_raw_body() {
        assert_eq!(format_problem("gateway exploded"), "gateway exploded");
        assert_eq!(format_problem(r#"{"title":"","detail":"x"}"#), r#"{"title":"","detail":"x"}"#);
        assert_eq!(format_problem(r#"{"title":42}"#), r#"{"title":42}"#);
        assert_eq!(format_problem("[1,2]"), "[1,2]");
        let array = r#"["about:blank","busy",503,"retry later"]"#;
        assert_eq!(format_problem(array), array);
    }

    #[test]
    fn test_format_problem_empty_body() {
        assert_eq!(format_problem(""), "empty response");
    }

    #[test]
    fn test_job_decodes_controller_shape() {
        let job: Job = serde_json::from_value(json!({
            "id": 7,
            "type": "noop",
            "payload": {"n": 1, "tags": ["a", "b"], "nested": {"ok": true}},
            "status": "running",
            "result": [],
            "last_error": null
        }))
        .unwrap();

        assert_eq!(job.id, 7);
        assert_eq!(job.job_type, "noop");
        assert_eq!(job.payload["tags"], json!(["a", "b"]));
        assert_eq!(job.payload["nested"], json!({"ok": true}));
        assert_eq!(job.status.as_deref(), Some("running"));
        assert!(job.result.is_empty());
        assert_eq!(job.last_error, None);
    }

    #[test]
    fn test_job_rejects_non_object_payload() {
        let err = serde_json::from_value::<Job>(json!({"id": 1, "type": "noop", "payload": "x"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_claim_response_without_job() {
        let resp: ClaimResponse = serde_json::from_str(r#"{"job":null}"#).unwrap();
        assert!(resp.job.is_none());
        let resp: ClaimResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.job.is_none());
    }

    #[test]
    fn test_completion_report_error_key_only_when_present() {
        let mut result = JsonMap::new();
        result.insert("message".to_string(), json!("noop"));
        let ok = CompletionReport {
            status: JobStatus::Succeeded,
            result,
            error: None,
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"status": "succeeded", "result": {"message": "noop"}})
        );

        let failed = CompletionReport {
            status: JobStatus::Failed,
            result: JsonMap::new(),
            error: Some("unsupported job type: x".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"status": "failed", "result": {}, "error": "unsupported job type: x"})
        );
    }
}
