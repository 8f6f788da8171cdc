//! HTTP client for the controller's agent API.
//!
//! ```text
//! POST /agent/v1/jobs/claim           200 {job} | 204 (no work)
//! POST /agent/v1/jobs/{id}/heartbeat  200
//! POST /agent/v1/jobs/{id}/complete   200, body {status, result, error?}
//! ```
//!
//! Every request carries `Authorization: Bearer <token>` and
//! `Accept: application/json`. The client is cheap to clone and safe to
//! share between the cycle and its heartbeat task.

use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};

use crate::config::AgentConfig;
use crate::error::{ClientError, Operation, Result};
use crate::worker::api::{ClaimResponse, CompletionReport, Job, format_problem};

/// Client for the controller's `/agent/v1` endpoints.
#[derive(Clone)]
pub struct ControllerClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl ControllerClient {
    pub fn new(config: &AgentConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.controller_url.clone(),
            token: config.token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/agent/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Ask the controller for the next job.
    ///
    /// `Ok(None)` means no work is available right now.
    pub async fn claim(&self) -> Result<Option<Job>> {
        let op = Operation::Claim;
        let (status, body) = self.send(op, self.client.post(self.url("jobs/claim"))).await?;

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status != StatusCode::OK {
            return Err(protocol_error(op, status, &body));
        }
        if body.is_empty() {
            return Ok(None);
        }

        let response: ClaimResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode {
                operation: op,
                reason: e.to_string(),
            })?;

        match response.job {
            Some(job) if job.id != 0 => Ok(Some(job)),
            _ => Err(ClientError::Protocol {
                operation: op,
                status: status.as_u16(),
                message: "claim response missing job".to_string(),
            }),
        }
    }

    /// Signal that the agent is still working on `job_id`.
    pub async fn heartbeat(&self, job_id: u64) -> Result<()> {
        let op = Operation::Heartbeat;
        let url = self.url(&format!("jobs/{}/heartbeat", job_id));
        let (status, body) = self.send(op, self.client.post(url)).await?;

        if status != StatusCode::OK {
            return Err(protocol_error(op, status, &body));
        }
        Ok(())
    }

    /// Report the terminal outcome of `job_id`.
    pub async fn complete(&self, job_id: u64, report: &CompletionReport) -> Result<()> {
        let op = Operation::Complete;
        let payload = serde_json::to_vec(report).map_err(|e| ClientError::Decode {
            operation: op,
            reason: e.to_string(),
        })?;

        let request = self
            .client
            .post(self.url(&format!("jobs/{}/complete", job_id)))
            .header("Content-Type", "application/json")
            .body(payload);
        let (status, body) = self.send(op, request).await?;

        if status != StatusCode::OK {
            return Err(protocol_error(op, status, &body));
        }
        Ok(())
    }

    /// Attach auth headers, send, and read the whole body.
    async fn send(&self, op: Operation, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let response = request
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                operation: op,
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::Transport {
            operation: op,
            reason: e.to_string(),
        })?;

        tracing::debug!(operation = %op, status = status.as_u16(), "Controller response");

        Ok((status, body))
    }
}

impl std::fmt::Debug for ControllerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn protocol_error(operation: Operation, status: StatusCode, body: &str) -> ClientError {
    ClientError::Protocol {
        operation,
        status: status.as_u16(),
        message: format_problem(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = ControllerClient::new(&AgentConfig::new("http://controller:8080/", "t"));
        assert_eq!(
            client.url("jobs/claim"),
            "http://controller:8080/agent/v1/jobs/claim"
        );
        assert_eq!(
            client.url("/jobs/42/heartbeat"),
            "http://controller:8080/agent/v1/jobs/42/heartbeat"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let client = ControllerClient::new(&AgentConfig::new("http://c", "super-secret"));
        let rendered = format!("{:?}", client);
        assert!(rendered.contains("http://c"));
        assert!(!rendered.contains("super-secret"));
    }

    #[tokio::test]
    async fn test_unreachable_controller_is_transport_error() {
        // Port 1 on loopback refuses connections.
        let config = AgentConfig::new("http://127.0.0.1:1", "t")
            .with_request_timeout(std::time::Duration::from_secs(2));
        let client = ControllerClient::new(&config);

        let err = client.claim().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport {
                operation: Operation::Claim,
                ..
            }
        ));
    }
}
