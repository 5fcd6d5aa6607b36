use std::time::Duration;

use thiserror::Error;

/// Error type for healthcheck failures
#[derive(Debug, Error)]
pub enum HealthcheckError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Health endpoint returned status: {0}")]
    Status(reqwest::StatusCode),
}

/// Probe `GET /v1/health` on the local server listening on `port`
pub async fn healthcheck_with_port(port: u16) -> Result<(), HealthcheckError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .map_err(|e| HealthcheckError::Client(e.to_string()))?;

    let url = format!("http://127.0.0.1:{port}/v1/health");

    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| HealthcheckError::Request(e.to_string()))?;

    if resp.status().is_success() {
        Ok(())
    } else {
        Err(HealthcheckError::Status(resp.status()))
    }
}
