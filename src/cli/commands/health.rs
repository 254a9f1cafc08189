use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

pub async fn handle(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let (status, body) = client.health().await?;
    let store = body["data"]["store"].as_str().unwrap_or("unknown");

    if status.is_success() {
        output_success(
            &output_format,
            &format!("Server healthy ({} store)", store),
            Some(json!({ "health": body })),
        )
    } else {
        output_error(
            &output_format,
            &format!("Server unhealthy: HTTP {} ({} store)", status.as_u16(), store),
            Some("SERVICE_UNAVAILABLE"),
        )?;
        anyhow::bail!("health check failed")
    }
}
