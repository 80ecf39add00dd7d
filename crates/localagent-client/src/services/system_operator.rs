//! Host-level operations: processes, filesystem jobs, services, logs.

use localagent_types::{
    CommandOutput, FsOperation, FsOperationRequest, JobAccepted, LogEntry, ProcessInfo,
    ServiceInfo,
};
use localagent_types::system::SystemMetrics;
use serde_json::json;

use crate::client::{ApiClient, ApiError};
use crate::services::query_suffix;

#[derive(Debug, Clone)]
pub struct SystemOperatorService {
    client: ApiClient,
}

impl SystemOperatorService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn process_path(pid: u32) -> String {
        format!("/system/processes/{pid}")
    }

    #[must_use]
    pub fn fs_operation_path(id: &str) -> String {
        format!("/system/fs-operations/{}", id.trim())
    }

    #[must_use]
    pub fn service_path(name: &str) -> String {
        format!("/system/services/{}", name.trim())
    }

    #[must_use]
    pub fn service_action_path(name: &str, action: &str) -> String {
        format!("/system/services/{}/{action}", name.trim())
    }

    #[must_use]
    pub fn permissions_path(path: &str) -> String {
        format!(
            "/system/fs/permissions{}",
            query_suffix(&[("path", path.to_string())])
        )
    }

    pub async fn processes(&self) -> Result<Vec<ProcessInfo>, ApiError> {
        self.client.get_json("/system/processes").await
    }

    pub async fn process(&self, pid: u32) -> Result<Option<ProcessInfo>, ApiError> {
        self.client
            .get_optional_json(Self::process_path(pid).as_str())
            .await
    }

    pub async fn kill_process(&self, pid: u32) -> Result<(), ApiError> {
        self.client
            .post_empty(format!("{}/kill", Self::process_path(pid)).as_str())
            .await
    }

    pub async fn metrics(&self) -> Result<SystemMetrics, ApiError> {
        self.client.get_json("/system/metrics").await
    }

    /// Submits a filesystem operation; acknowledged with the operation id
    /// and an initial `pending` status.
    pub async fn start_fs_operation(
        &self,
        request: &FsOperationRequest,
    ) -> Result<JobAccepted, ApiError> {
        self.client.post_json("/system/fs-operations", request).await
    }

    pub async fn fs_operation_status(&self, id: &str) -> Result<FsOperation, ApiError> {
        self.client
            .get_json(Self::fs_operation_path(id).as_str())
            .await
    }

    pub async fn cancel_fs_operation(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(format!("{}/cancel", Self::fs_operation_path(id)).as_str())
            .await
    }

    pub async fn permissions(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.client
            .get_json(Self::permissions_path(path).as_str())
            .await
    }

    pub async fn set_permissions(
        &self,
        path: &str,
        mode: &str,
    ) -> Result<serde_json::Value, ApiError> {
        self.client
            .put_json(
                Self::permissions_path(path).as_str(),
                &json!({ "mode": mode }),
            )
            .await
    }

    pub async fn services(&self) -> Result<Vec<ServiceInfo>, ApiError> {
        self.client.get_json("/system/services").await
    }

    pub async fn service(&self, name: &str) -> Result<Option<ServiceInfo>, ApiError> {
        self.client
            .get_optional_json(Self::service_path(name).as_str())
            .await
    }

    pub async fn start_service(&self, name: &str) -> Result<ServiceInfo, ApiError> {
        self.service_action(name, "start").await
    }

    pub async fn stop_service(&self, name: &str) -> Result<ServiceInfo, ApiError> {
        self.service_action(name, "stop").await
    }

    pub async fn restart_service(&self, name: &str) -> Result<ServiceInfo, ApiError> {
        self.service_action(name, "restart").await
    }

    pub async fn enable_service(&self, name: &str) -> Result<ServiceInfo, ApiError> {
        self.service_action(name, "enable").await
    }

    pub async fn disable_service(&self, name: &str) -> Result<ServiceInfo, ApiError> {
        self.service_action(name, "disable").await
    }

    async fn service_action(&self, name: &str, action: &str) -> Result<ServiceInfo, ApiError> {
        self.client
            .post_json(Self::service_action_path(name, action).as_str(), &json!({}))
            .await
    }

    pub async fn logs(&self, limit: Option<u32>) -> Result<Vec<LogEntry>, ApiError> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = limit {
            pairs.push(("limit", limit.to_string()));
        }
        self.client
            .get_json(format!("/system/logs{}", query_suffix(&pairs)).as_str())
            .await
    }

    pub async fn execute_command(
        &self,
        command: &str,
        args: &[String],
    ) -> Result<CommandOutput, ApiError> {
        self.client
            .post_json(
                "/system/execute",
                &json!({ "command": command, "args": args }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_deterministic() {
        assert_eq!(SystemOperatorService::process_path(42), "/system/processes/42");
        assert_eq!(
            SystemOperatorService::fs_operation_path("op1"),
            "/system/fs-operations/op1"
        );
        assert_eq!(
            SystemOperatorService::service_action_path("nginx", "restart"),
            "/system/services/nginx/restart"
        );
        assert_eq!(
            SystemOperatorService::permissions_path("/etc/hosts"),
            "/system/fs/permissions?path=%2Fetc%2Fhosts"
        );
    }
}
