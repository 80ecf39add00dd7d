//! File browser state plus the two file-processing job families:
//! conversions and batch operations. Both trackers feed their finished
//! artifacts back into the file table.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use localagent_client::{ApiClient, ApiError, FileProcessorService};
use localagent_types::{
    BatchKind, BatchOperation, ConversionJob, FileInfo, FileOperationConfig, FileOperationResult,
    FileType, JobStatus,
};
use tokio::sync::Mutex;

use crate::error::StateError;
use crate::store::{Change, ResourceStore};
use crate::tracker::{JobDriver, JobTracker, JobTrackerConfig};

pub struct ConversionDriver {
    service: FileProcessorService,
}

#[async_trait]
impl JobDriver for ConversionDriver {
    type Request = FileOperationConfig;
    type Record = ConversionJob;

    async fn start(&self, request: &FileOperationConfig) -> Result<String, ApiError> {
        self.service
            .start_conversion(request)
            .await
            .map(|accepted| accepted.id)
    }

    async fn status(&self, id: &str) -> Result<ConversionJob, ApiError> {
        self.service.conversion_status(id).await
    }

    async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.service.cancel_conversion(id).await
    }
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub kind: BatchKind,
    pub files: Vec<String>,
    pub config: FileOperationConfig,
}

pub struct BatchDriver {
    service: FileProcessorService,
}

#[async_trait]
impl JobDriver for BatchDriver {
    type Request = BatchRequest;
    type Record = BatchOperation;

    async fn start(&self, request: &BatchRequest) -> Result<String, ApiError> {
        self.service
            .start_batch(request.kind, &request.files, &request.config)
            .await
            .map(|accepted| accepted.id)
    }

    async fn status(&self, id: &str) -> Result<BatchOperation, ApiError> {
        self.service.batch_status(id).await
    }

    async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.service.cancel_batch(id).await
    }
}

/// Builds the file-table entry for a produced file: name from the last
/// path segment, type from the result or the extension.
fn derive_file_info(result: &FileOperationResult) -> Option<FileInfo> {
    if !result.success {
        return None;
    }
    let path = result.path.as_ref()?;
    let name = path.rsplit('/').next().unwrap_or(path.as_str()).to_string();
    let kind = result.kind.unwrap_or_else(|| {
        let extension = name.rsplit_once('.').map_or("", |(_, ext)| ext);
        FileType::from_extension(extension)
    });
    Some(FileInfo {
        name,
        path: path.clone(),
        kind,
        size: result.size.unwrap_or(0),
        mime_type: result.mime_type.clone().unwrap_or_default(),
        last_modified: result.last_modified.unwrap_or_else(Utc::now),
        metadata: result.metadata.clone(),
    })
}

pub struct FileProcessorContainer {
    service: FileProcessorService,
    files: ResourceStore<FileInfo>,
    selection: Mutex<HashSet<String>>,
    conversions: JobTracker<ConversionDriver>,
    batches: JobTracker<BatchDriver>,
}

impl FileProcessorContainer {
    #[must_use]
    pub fn new(client: ApiClient, config: JobTrackerConfig) -> Self {
        let service = FileProcessorService::new(client);
        let files: ResourceStore<FileInfo> = ResourceStore::new();

        let conversion_files = files.clone();
        let conversions = JobTracker::new(
            ConversionDriver {
                service: service.clone(),
            },
            config.clone(),
        )
        .with_terminal_hook(move |record: ConversionJob| {
            let files = conversion_files.clone();
            Box::pin(async move {
                if record.status == JobStatus::Completed {
                    if let Some(info) = record.result.as_ref().and_then(derive_file_info) {
                        files.apply(Change::Merged(info.path.clone(), info)).await;
                    }
                }
            })
        });

        let batch_files = files.clone();
        let batches = JobTracker::new(
            BatchDriver {
                service: service.clone(),
            },
            config,
        )
        .with_terminal_hook(move |record: BatchOperation| {
            let files = batch_files.clone();
            Box::pin(async move {
                if record.status == JobStatus::Completed {
                    for info in record.results.iter().filter_map(derive_file_info) {
                        files.apply(Change::Merged(info.path.clone(), info)).await;
                    }
                }
            })
        });

        Self {
            service,
            files,
            selection: Mutex::new(HashSet::new()),
            conversions,
            batches,
        }
    }

    #[must_use]
    pub fn files(&self) -> &ResourceStore<FileInfo> {
        &self.files
    }

    #[must_use]
    pub fn conversions(&self) -> &JobTracker<ConversionDriver> {
        &self.conversions
    }

    #[must_use]
    pub fn batches(&self) -> &JobTracker<BatchDriver> {
        &self.batches
    }

    pub async fn refresh(&self, directory: Option<&str>) -> Result<(), StateError> {
        self.files.apply(Change::LoadStarted).await;
        match self.service.list(directory).await {
            Ok(listing) => {
                let items = listing
                    .into_iter()
                    .map(|file| (file.path.clone(), file))
                    .collect();
                self.files.apply(Change::Loaded(items)).await;
                Ok(())
            }
            Err(error) => {
                self.files.apply(Change::Failed(error.to_string())).await;
                Err(StateError::action(error))
            }
        }
    }

    pub async fn upload(&self, payload: &serde_json::Value) -> Result<FileInfo, StateError> {
        let file = self
            .service
            .upload(payload)
            .await
            .map_err(StateError::action)?;
        self.files
            .apply(Change::Merged(file.path.clone(), file.clone()))
            .await;
        Ok(file)
    }

    pub async fn delete_file(&self, path: &str) -> Result<(), StateError> {
        self.service.delete(path).await.map_err(StateError::action)?;
        self.files.apply(Change::Removed(path.to_string())).await;
        self.selection.lock().await.remove(path);
        Ok(())
    }

    pub async fn select(&self, path: &str) {
        self.selection.lock().await.insert(path.to_string());
    }

    pub async fn deselect(&self, path: &str) {
        self.selection.lock().await.remove(path);
    }

    pub async fn selection(&self) -> Vec<String> {
        self.selection.lock().await.iter().cloned().collect()
    }

    pub async fn start_conversion(&self, config: &FileOperationConfig) -> Result<String, StateError> {
        self.conversions.submit(config).await
    }

    pub async fn cancel_conversion(&self, id: &str) -> Result<(), StateError> {
        self.conversions.cancel(id).await
    }

    /// One-off status fetch. Tracked conversions get the fresh snapshot
    /// written back.
    pub async fn conversion_status(&self, id: &str) -> Result<ConversionJob, StateError> {
        let job = self
            .service
            .conversion_status(id)
            .await
            .map_err(|error| StateError::poll(id, error))?;
        self.conversions.reconcile(job.clone()).await;
        Ok(job)
    }

    pub async fn start_batch(&self, request: &BatchRequest) -> Result<String, StateError> {
        self.batches.submit(request).await
    }

    pub async fn cancel_batch(&self, id: &str) -> Result<(), StateError> {
        self.batches.cancel(id).await
    }

    pub async fn compress(
        &self,
        paths: &[String],
        target: &str,
    ) -> Result<FileOperationResult, StateError> {
        let result = self
            .service
            .compress(paths, target)
            .await
            .map_err(StateError::action)?;
        if let Some(info) = derive_file_info(&result) {
            self.files
                .apply(Change::Merged(info.path.clone(), info))
                .await;
        }
        Ok(result)
    }

    /// Extracts an archive, then refreshes the target directory so the
    /// table shows whatever came out of it.
    pub async fn extract(
        &self,
        archive: &str,
        target: &str,
    ) -> Result<FileOperationResult, StateError> {
        let result = self
            .service
            .extract(archive, target)
            .await
            .map_err(StateError::action)?;
        self.refresh(Some(target)).await?;
        Ok(result)
    }

    pub async fn merge(
        &self,
        paths: &[String],
        target: &str,
    ) -> Result<FileOperationResult, StateError> {
        let result = self
            .service
            .merge(paths, target)
            .await
            .map_err(StateError::action)?;
        if let Some(info) = derive_file_info(&result) {
            self.files
                .apply(Change::Merged(info.path.clone(), info))
                .await;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localagent_client::ApiClientConfig;
    use std::time::Duration;

    fn fast_config() -> JobTrackerConfig {
        JobTrackerConfig {
            poll_interval: Duration::from_millis(10),
            poll_retry_limit: 0,
        }
    }

    #[tokio::test]
    async fn finished_conversion_lands_in_the_file_table() {
        let mut server = mockito::Server::new_async().await;
        let _submit = server
            .mock("POST", "/api/files/convert")
            .with_status(200)
            .with_body(r#"{"jobId": "job1", "status": "pending"}"#)
            .create_async()
            .await;
        let _status = server
            .mock("GET", "/api/files/convert/job1")
            .with_status(200)
            .with_body(
                r#"{
                    "id": "job1", "status": "completed", "progress": 100.0,
                    "result": {
                        "success": true, "path": "/out/f.pdf", "type": "pdf",
                        "size": 1024, "mimeType": "application/pdf"
                    },
                    "createdAt": "2026-01-01T00:00:00Z",
                    "updatedAt": "2026-01-01T00:00:05Z"
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(ApiClientConfig::new(server.url())).expect("client");
        let container = FileProcessorContainer::new(client, fast_config());

        let config = FileOperationConfig {
            source: "/in/f.docx".to_string(),
            target: Some("/out/f.pdf".to_string()),
            kind: Some(FileType::Pdf),
            options: None,
        };
        let id = container.start_conversion(&config).await.expect("submit");
        assert_eq!(id, "job1");

        // Submission placeholder first.
        let job = container.conversions().job(&id).await.expect("tracked");
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, Some(0.0));

        tokio::time::sleep(Duration::from_millis(80)).await;

        let entry = container.files().get("/out/f.pdf").await.expect("file entry");
        assert_eq!(entry.name, "f.pdf");
        assert_eq!(entry.kind, FileType::Pdf);
        assert_eq!(entry.size, 1024);
    }

    #[test]
    fn derived_info_falls_back_to_the_extension() {
        let result = FileOperationResult {
            success: true,
            path: Some("/out/report.csv".to_string()),
            kind: None,
            size: Some(10),
            mime_type: None,
            last_modified: None,
            metadata: None,
            error: None,
        };
        let info = derive_file_info(&result).expect("info");
        assert_eq!(info.name, "report.csv");
        assert_eq!(info.kind, FileType::Text);
    }

    #[test]
    fn failed_results_produce_no_entry() {
        let result = FileOperationResult {
            success: false,
            path: Some("/out/broken.pdf".to_string()),
            kind: None,
            size: None,
            mime_type: None,
            last_modified: None,
            metadata: None,
            error: None,
        };
        assert!(derive_file_info(&result).is_none());
    }
}
