//! Service liveness check (`GET /healthz`)

use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::settings::ClientSettings;

pub const HEALTH_PATH: &str = "/healthz";

#[derive(Debug, Deserialize)]
struct HealthStatus {
    status: String,
}

/// `Ok(())` when the service answers `{"status": "ok"}`
pub async fn check_health(client: &Client, settings: &ClientSettings) -> Result<(), String> {
    let url = settings.endpoint(HEALTH_PATH)?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| format!("Health request failed: {}", e))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(format!("Health check failed: {} - {}", status, text));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| format!("Failed to read health response: {}", e))?;
    let health: HealthStatus = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse health response: {}", e))?;
    debug!("health: {} status={}", url, health.status);

    if health.status == "ok" {
        Ok(())
    } else {
        Err(format!("Service reported status '{}'", health.status))
    }
}
