//! Shared plumbing for the subcommands: client construction, token
//! loading, JSON output, and job polling.

use std::time::Duration;

use localagent_app_state::tracker::{JobDriver, JobRecord, JobTracker};
use localagent_client::{ApiClient, ApiClientConfig, load_token, resolve_base_url};

pub(crate) async fn api_client() -> anyhow::Result<ApiClient> {
    let resolved = resolve_base_url(None);
    tracing::debug!(
        base_url = %resolved.base_url,
        source = %resolved.source,
        "resolved backend"
    );
    let client = ApiClient::new(ApiClientConfig::new(resolved.base_url))?;
    if let Some(token) = load_token()? {
        client.set_token(token).await;
    }
    Ok(client)
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Polls a tracked job until its status goes terminal, printing every
/// status or progress transition along the way.
pub(crate) async fn wait_for_terminal<D: JobDriver>(
    tracker: &JobTracker<D>,
    id: &str,
) -> anyhow::Result<D::Record> {
    let mut last: Option<String> = None;
    loop {
        let Some(record) = tracker.job(id).await else {
            if let Some(error) = tracker.last_error().await {
                anyhow::bail!(error);
            }
            anyhow::bail!("job {id} is no longer tracked");
        };

        let line = match record.progress() {
            Some(progress) => format!("{} {} {:.0}%", record.id(), record.status(), progress),
            None => format!("{} {}", record.id(), record.status()),
        };
        if last.as_deref() != Some(line.as_str()) {
            println!("{line}");
            last = Some(line);
        }

        if record.status().is_terminal() {
            return Ok(record);
        }
        if let Some(error) = tracker.last_error().await {
            anyhow::bail!(error);
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}
