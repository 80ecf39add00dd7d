use localagent_types::data_analyzer::ColumnStatistics;
use localagent_types::{AnalysisConfig, AnalysisResult, DatasetInfo, JobAccepted};
use serde_json::json;

use crate::client::{ApiClient, ApiError};
use crate::services::query_suffix;

#[derive(Debug, Clone)]
pub struct DataAnalyzerService {
    client: ApiClient,
}

impl DataAnalyzerService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn dataset_path(id: &str) -> String {
        format!("/data/datasets/{}", id.trim())
    }

    #[must_use]
    pub fn analysis_path(id: &str) -> String {
        format!("/data/analyses/{}", id.trim())
    }

    #[must_use]
    pub fn column_statistics_path(dataset_id: &str, column: &str) -> String {
        format!(
            "/data/datasets/{}/columns/{}/statistics",
            dataset_id.trim(),
            column.trim()
        )
    }

    pub async fn datasets(&self) -> Result<Vec<DatasetInfo>, ApiError> {
        self.client.get_json("/data/datasets").await
    }

    pub async fn dataset(&self, id: &str) -> Result<Option<DatasetInfo>, ApiError> {
        self.client
            .get_optional_json(Self::dataset_path(id).as_str())
            .await
    }

    pub async fn upload_dataset(&self, payload: &serde_json::Value) -> Result<DatasetInfo, ApiError> {
        self.client.post_json("/data/datasets", payload).await
    }

    pub async fn update_dataset(
        &self,
        id: &str,
        patch: &serde_json::Value,
    ) -> Result<DatasetInfo, ApiError> {
        self.client
            .put_json(Self::dataset_path(id).as_str(), patch)
            .await
    }

    pub async fn delete_dataset(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(Self::dataset_path(id).as_str()).await
    }

    pub async fn preview_dataset(
        &self,
        id: &str,
        rows: Option<u32>,
    ) -> Result<serde_json::Value, ApiError> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(rows) = rows {
            pairs.push(("rows", rows.to_string()));
        }
        self.client
            .get_json(format!("{}/preview{}", Self::dataset_path(id), query_suffix(&pairs)).as_str())
            .await
    }

    /// Submits an analysis; acknowledged with the analysis id and an
    /// initial `pending` status.
    pub async fn start_analysis(&self, config: &AnalysisConfig) -> Result<JobAccepted, ApiError> {
        self.client.post_json("/data/analyses", config).await
    }

    pub async fn analysis_status(&self, id: &str) -> Result<AnalysisResult, ApiError> {
        self.client.get_json(Self::analysis_path(id).as_str()).await
    }

    pub async fn cancel_analysis(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(format!("{}/cancel", Self::analysis_path(id)).as_str())
            .await
    }

    pub async fn column_statistics(
        &self,
        dataset_id: &str,
        column: &str,
    ) -> Result<ColumnStatistics, ApiError> {
        self.client
            .get_json(Self::column_statistics_path(dataset_id, column).as_str())
            .await
    }

    pub async fn visualize(
        &self,
        dataset_id: &str,
        options: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.client
            .post_json(
                format!("{}/visualize", Self::dataset_path(dataset_id)).as_str(),
                options,
            )
            .await
    }

    pub async fn correlation(
        &self,
        dataset_id: &str,
        columns: &[String],
    ) -> Result<serde_json::Value, ApiError> {
        self.client
            .post_json(
                format!("{}/correlation", Self::dataset_path(dataset_id)).as_str(),
                &json!({ "columns": columns }),
            )
            .await
    }

    pub async fn clustering(
        &self,
        dataset_id: &str,
        options: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.client
            .post_json(
                format!("{}/clustering", Self::dataset_path(dataset_id)).as_str(),
                options,
            )
            .await
    }

    pub async fn train(
        &self,
        dataset_id: &str,
        options: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.client
            .post_json(
                format!("{}/train", Self::dataset_path(dataset_id)).as_str(),
                options,
            )
            .await
    }

    pub async fn export(&self, dataset_id: &str, format: &str) -> Result<serde_json::Value, ApiError> {
        self.client
            .post_json(
                format!("{}/export", Self::dataset_path(dataset_id)).as_str(),
                &json!({ "format": format }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_deterministic() {
        assert_eq!(DataAnalyzerService::dataset_path("d1"), "/data/datasets/d1");
        assert_eq!(DataAnalyzerService::analysis_path(" a1 "), "/data/analyses/a1");
        assert_eq!(
            DataAnalyzerService::column_statistics_path("d1", "price"),
            "/data/datasets/d1/columns/price/statistics"
        );
    }
}
