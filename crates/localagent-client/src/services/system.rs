use localagent_types::system::SystemConfig;
use localagent_types::{
    DashboardMetrics, HistoryKind, HistoryRecord, SystemEvent, SystemMetrics, SystemStatus,
};

use crate::client::{ApiClient, ApiError};
use crate::services::query_suffix;

#[derive(Debug, Clone)]
pub struct SystemService {
    client: ApiClient,
}

impl SystemService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn metrics(&self) -> Result<SystemMetrics, ApiError> {
        self.client.get_json("/system/metrics").await
    }

    pub async fn config(&self) -> Result<SystemConfig, ApiError> {
        self.client.get_json("/system/config").await
    }

    pub async fn set_config(&self, config: &SystemConfig) -> Result<SystemConfig, ApiError> {
        self.client.put_json("/system/config", config).await
    }

    pub async fn status(&self) -> Result<SystemStatus, ApiError> {
        self.client.get_json("/system/status").await
    }

    pub async fn events(&self, limit: Option<u32>) -> Result<Vec<SystemEvent>, ApiError> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = limit {
            pairs.push(("limit", limit.to_string()));
        }
        self.client
            .get_json(format!("/system/events{}", query_suffix(&pairs)).as_str())
            .await
    }

    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, ApiError> {
        self.client.get_json("/dashboard/metrics").await
    }

    /// Audit trail of past task or event activity.
    pub async fn history(&self, kind: HistoryKind) -> Result<Vec<HistoryRecord>, ApiError> {
        self.client
            .get_json(format!("/history/{}", kind.as_str()).as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClientConfig;

    #[tokio::test]
    async fn history_fetches_the_named_trail() {
        let mut server = mockito::Server::new_async().await;
        let _tasks = server
            .mock("GET", "/api/history/tasks")
            .with_status(200)
            .with_body(
                r#"[{
                    "id": "h1", "type": "task", "action": "created",
                    "status": "completed",
                    "timestamp": "2026-01-01T00:00:00Z",
                    "details": {"taskId": "t1"}
                }]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(ApiClientConfig::new(server.url())).expect("client");
        let service = SystemService::new(client);

        let records = service.history(HistoryKind::Tasks).await.expect("history");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "h1");
        assert_eq!(records[0].action, "created");
        assert_eq!(records[0].details["taskId"], "t1");
    }
}
