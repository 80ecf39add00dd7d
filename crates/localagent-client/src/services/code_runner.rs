//! Sandboxed runtime wrapper: runtimes, code executions, packages, files.

use localagent_types::{
    CodeInput, ExecutionRecord, JobAccepted, PackageInfo, RuntimeConfig, RuntimeInstance,
};
use serde_json::json;

use crate::client::{ApiClient, ApiError};
use crate::services::query_suffix;

#[derive(Debug, Clone)]
pub struct CodeRunnerService {
    client: ApiClient,
}

impl CodeRunnerService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn runtimes_path() -> &'static str {
        "/code-runner/runtimes"
    }

    #[must_use]
    pub fn runtime_path(id: &str) -> String {
        format!("/code-runner/runtimes/{}", id.trim())
    }

    #[must_use]
    pub fn execute_path(runtime_id: &str) -> String {
        format!("/code-runner/runtimes/{}/execute", runtime_id.trim())
    }

    #[must_use]
    pub fn execution_path(id: &str) -> String {
        format!("/code-runner/executions/{}", id.trim())
    }

    #[must_use]
    pub fn execution_cancel_path(id: &str) -> String {
        format!("/code-runner/executions/{}/cancel", id.trim())
    }

    #[must_use]
    pub fn packages_path(runtime_id: &str) -> String {
        format!("/code-runner/runtimes/{}/packages", runtime_id.trim())
    }

    #[must_use]
    pub fn files_path(runtime_id: &str, path: &str) -> String {
        format!(
            "/code-runner/runtimes/{}/files{}",
            runtime_id.trim(),
            query_suffix(&[("path", path.to_string())])
        )
    }

    pub async fn runtimes(&self) -> Result<Vec<RuntimeInstance>, ApiError> {
        self.client.get_json(Self::runtimes_path()).await
    }

    pub async fn runtime(&self, id: &str) -> Result<Option<RuntimeInstance>, ApiError> {
        self.client
            .get_optional_json(Self::runtime_path(id).as_str())
            .await
    }

    pub async fn create_runtime(&self, config: &RuntimeConfig) -> Result<RuntimeInstance, ApiError> {
        self.client.post_json(Self::runtimes_path(), config).await
    }

    pub async fn delete_runtime(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(Self::runtime_path(id).as_str()).await
    }

    /// Submits code for execution; the backend acknowledges with the
    /// execution id and an initial `pending` status.
    pub async fn execute(&self, runtime_id: &str, input: &CodeInput) -> Result<JobAccepted, ApiError> {
        self.client
            .post_json(Self::execute_path(runtime_id).as_str(), input)
            .await
    }

    pub async fn execution(&self, id: &str) -> Result<ExecutionRecord, ApiError> {
        self.client.get_json(Self::execution_path(id).as_str()).await
    }

    pub async fn cancel_execution(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(Self::execution_cancel_path(id).as_str())
            .await
    }

    pub async fn packages(&self, runtime_id: &str) -> Result<Vec<PackageInfo>, ApiError> {
        self.client
            .get_json(Self::packages_path(runtime_id).as_str())
            .await
    }

    pub async fn install_package(
        &self,
        runtime_id: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<PackageInfo, ApiError> {
        self.client
            .post_json(
                Self::packages_path(runtime_id).as_str(),
                &json!({ "name": name, "version": version }),
            )
            .await
    }

    pub async fn uninstall_package(&self, runtime_id: &str, name: &str) -> Result<(), ApiError> {
        self.client
            .delete(format!("{}/{}", Self::packages_path(runtime_id), name.trim()).as_str())
            .await
    }

    pub async fn update_package(&self, runtime_id: &str, name: &str) -> Result<PackageInfo, ApiError> {
        self.client
            .put_json(
                format!("{}/{}", Self::packages_path(runtime_id), name.trim()).as_str(),
                &json!({}),
            )
            .await
    }

    pub async fn metrics(&self, runtime_id: &str) -> Result<serde_json::Value, ApiError> {
        self.client
            .get_json(format!("{}/metrics", Self::runtime_path(runtime_id)).as_str())
            .await
    }

    pub async fn logs(&self, runtime_id: &str) -> Result<Vec<String>, ApiError> {
        self.client
            .get_json(format!("{}/logs", Self::runtime_path(runtime_id)).as_str())
            .await
    }

    pub async fn list_files(&self, runtime_id: &str, path: &str) -> Result<Vec<String>, ApiError> {
        self.client
            .get_json(Self::files_path(runtime_id, path).as_str())
            .await
    }

    pub async fn read_file(&self, runtime_id: &str, path: &str) -> Result<String, ApiError> {
        self.client
            .get_json(Self::files_path(runtime_id, path).as_str())
            .await
    }

    pub async fn write_file(
        &self,
        runtime_id: &str,
        path: &str,
        content: &str,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .client
            .put_json(
                format!("/code-runner/runtimes/{}/files", runtime_id.trim()).as_str(),
                &json!({ "path": path, "content": content }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_file(&self, runtime_id: &str, path: &str) -> Result<(), ApiError> {
        self.client
            .delete(Self::files_path(runtime_id, path).as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_deterministic() {
        assert_eq!(CodeRunnerService::runtimes_path(), "/code-runner/runtimes");
        assert_eq!(
            CodeRunnerService::execute_path("rt1"),
            "/code-runner/runtimes/rt1/execute"
        );
        assert_eq!(
            CodeRunnerService::execution_cancel_path("ex1"),
            "/code-runner/executions/ex1/cancel"
        );
        assert_eq!(
            CodeRunnerService::files_path("rt1", "/tmp/work"),
            "/code-runner/runtimes/rt1/files?path=%2Ftmp%2Fwork"
        );
    }
}
