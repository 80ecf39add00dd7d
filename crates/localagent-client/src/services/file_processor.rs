//! File processor wrapper: directory listings, conversions, batches, and
//! the one-shot archive/merge/split operations.

use localagent_types::{
    BatchKind, BatchOperation, ConversionJob, FileInfo, FileOperationConfig, FileOperationResult,
    JobAccepted,
};
use serde_json::json;

use crate::client::{ApiClient, ApiError};
use crate::services::query_suffix;

#[derive(Debug, Clone)]
pub struct FileProcessorService {
    client: ApiClient,
}

impl FileProcessorService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn files_path(directory: Option<&str>) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(directory) = directory {
            pairs.push(("path", directory.to_string()));
        }
        format!("/files{}", query_suffix(&pairs))
    }

    #[must_use]
    pub fn conversion_path(job_id: &str) -> String {
        format!("/files/convert/{}", job_id.trim())
    }

    #[must_use]
    pub fn batch_path(operation_id: &str) -> String {
        format!("/files/batch/{}", operation_id.trim())
    }

    #[must_use]
    pub fn metadata_path(path: &str) -> String {
        format!("/files/metadata{}", query_suffix(&[("path", path.to_string())]))
    }

    pub async fn list(&self, directory: Option<&str>) -> Result<Vec<FileInfo>, ApiError> {
        self.client
            .get_json(Self::files_path(directory).as_str())
            .await
    }

    pub async fn upload(&self, payload: &serde_json::Value) -> Result<FileInfo, ApiError> {
        self.client.post_json("/files", payload).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.client.delete(Self::files_path(Some(path)).as_str()).await
    }

    /// Submits a conversion; the backend acknowledges with the job id and
    /// an initial `pending` status.
    pub async fn start_conversion(
        &self,
        config: &FileOperationConfig,
    ) -> Result<JobAccepted, ApiError> {
        self.client.post_json("/files/convert", config).await
    }

    pub async fn conversion_status(&self, job_id: &str) -> Result<ConversionJob, ApiError> {
        self.client
            .get_json(Self::conversion_path(job_id).as_str())
            .await
    }

    pub async fn cancel_conversion(&self, job_id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(format!("{}/cancel", Self::conversion_path(job_id)).as_str())
            .await
    }

    pub async fn start_batch(
        &self,
        kind: BatchKind,
        files: &[String],
        config: &FileOperationConfig,
    ) -> Result<JobAccepted, ApiError> {
        self.client
            .post_json(
                "/files/batch",
                &json!({ "type": kind, "files": files, "config": config }),
            )
            .await
    }

    pub async fn batch_status(&self, operation_id: &str) -> Result<BatchOperation, ApiError> {
        self.client
            .get_json(Self::batch_path(operation_id).as_str())
            .await
    }

    pub async fn cancel_batch(&self, operation_id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(format!("{}/cancel", Self::batch_path(operation_id)).as_str())
            .await
    }

    pub async fn preview(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.client
            .get_json(format!("/files/preview{}", query_suffix(&[("path", path.to_string())])).as_str())
            .await
    }

    pub async fn compress(
        &self,
        paths: &[String],
        target: &str,
    ) -> Result<FileOperationResult, ApiError> {
        self.client
            .post_json("/files/compress", &json!({ "paths": paths, "target": target }))
            .await
    }

    pub async fn extract(&self, archive: &str, target: &str) -> Result<FileOperationResult, ApiError> {
        self.client
            .post_json("/files/extract", &json!({ "archive": archive, "target": target }))
            .await
    }

    pub async fn merge(&self, paths: &[String], target: &str) -> Result<FileOperationResult, ApiError> {
        self.client
            .post_json("/files/merge", &json!({ "paths": paths, "target": target }))
            .await
    }

    pub async fn split(
        &self,
        path: &str,
        options: &serde_json::Value,
    ) -> Result<Vec<FileOperationResult>, ApiError> {
        self.client
            .post_json("/files/split", &json!({ "path": path, "options": options }))
            .await
    }

    pub async fn metadata(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.client.get_json(Self::metadata_path(path).as_str()).await
    }

    pub async fn update_metadata(
        &self,
        path: &str,
        metadata: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.client
            .put_json(Self::metadata_path(path).as_str(), metadata)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_deterministic() {
        assert_eq!(FileProcessorService::files_path(None), "/files");
        assert_eq!(
            FileProcessorService::files_path(Some("/home/user")),
            "/files?path=%2Fhome%2Fuser"
        );
        assert_eq!(
            FileProcessorService::conversion_path(" job1 "),
            "/files/convert/job1"
        );
        assert_eq!(FileProcessorService::batch_path("b1"), "/files/batch/b1");
    }
}
