use async_trait::async_trait;
use localagent_client::{ApiClient, ApiError, DataAnalyzerService};
use localagent_types::{AnalysisConfig, AnalysisResult, DatasetInfo};

use crate::error::StateError;
use crate::store::{Change, ResourceStore};
use crate::tracker::{JobDriver, JobTracker, JobTrackerConfig};

pub struct AnalysisDriver {
    service: DataAnalyzerService,
}

#[async_trait]
impl JobDriver for AnalysisDriver {
    type Request = AnalysisConfig;
    type Record = AnalysisResult;

    async fn start(&self, request: &AnalysisConfig) -> Result<String, ApiError> {
        self.service
            .start_analysis(request)
            .await
            .map(|accepted| accepted.id)
    }

    async fn status(&self, id: &str) -> Result<AnalysisResult, ApiError> {
        self.service.analysis_status(id).await
    }

    async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.service.cancel_analysis(id).await
    }
}

pub struct DataAnalyzerContainer {
    service: DataAnalyzerService,
    datasets: ResourceStore<DatasetInfo>,
    analyses: JobTracker<AnalysisDriver>,
}

impl DataAnalyzerContainer {
    #[must_use]
    pub fn new(client: ApiClient, config: JobTrackerConfig) -> Self {
        let service = DataAnalyzerService::new(client);
        let analyses = JobTracker::new(
            AnalysisDriver {
                service: service.clone(),
            },
            config,
        );
        Self {
            service,
            datasets: ResourceStore::new(),
            analyses,
        }
    }

    #[must_use]
    pub fn datasets(&self) -> &ResourceStore<DatasetInfo> {
        &self.datasets
    }

    #[must_use]
    pub fn analyses(&self) -> &JobTracker<AnalysisDriver> {
        &self.analyses
    }

    pub async fn refresh_datasets(&self) -> Result<(), StateError> {
        self.datasets.apply(Change::LoadStarted).await;
        match self.service.datasets().await {
            Ok(datasets) => {
                let items = datasets
                    .into_iter()
                    .map(|dataset| (dataset.id.clone(), dataset))
                    .collect();
                self.datasets.apply(Change::Loaded(items)).await;
                Ok(())
            }
            Err(error) => {
                self.datasets.apply(Change::Failed(error.to_string())).await;
                Err(StateError::action(error))
            }
        }
    }

    pub async fn upload_dataset(&self, payload: &serde_json::Value) -> Result<DatasetInfo, StateError> {
        let dataset = self
            .service
            .upload_dataset(payload)
            .await
            .map_err(StateError::action)?;
        self.datasets
            .apply(Change::Merged(dataset.id.clone(), dataset.clone()))
            .await;
        Ok(dataset)
    }

    pub async fn delete_dataset(&self, id: &str) -> Result<(), StateError> {
        self.service
            .delete_dataset(id)
            .await
            .map_err(StateError::action)?;
        self.datasets.apply(Change::Removed(id.to_string())).await;
        Ok(())
    }

    pub async fn start_analysis(&self, config: &AnalysisConfig) -> Result<String, StateError> {
        self.analyses.submit(config).await
    }

    pub async fn cancel_analysis(&self, id: &str) -> Result<(), StateError> {
        self.analyses.cancel(id).await
    }

    pub async fn preview_dataset(
        &self,
        id: &str,
        rows: Option<u32>,
    ) -> Result<serde_json::Value, StateError> {
        self.service
            .preview_dataset(id, rows)
            .await
            .map_err(StateError::action)
    }
}
