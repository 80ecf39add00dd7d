//! Runtimes and code executions. Executions go through the job tracker;
//! everything else is snapshot state.

use async_trait::async_trait;
use localagent_client::{ApiClient, ApiError, CodeRunnerService};
use localagent_types::{CodeInput, ExecutionRecord, PackageInfo, RuntimeConfig, RuntimeInstance};
use tokio::sync::RwLock;

use crate::error::StateError;
use crate::store::{Change, ResourceStore};
use crate::tracker::{JobDriver, JobTracker, JobTrackerConfig};

#[derive(Debug, Clone)]
pub struct CodeExecutionRequest {
    pub runtime_id: String,
    pub input: CodeInput,
}

pub struct CodeExecutionDriver {
    service: CodeRunnerService,
}

#[async_trait]
impl JobDriver for CodeExecutionDriver {
    type Request = CodeExecutionRequest;
    type Record = ExecutionRecord;

    async fn start(&self, request: &CodeExecutionRequest) -> Result<String, ApiError> {
        self.service
            .execute(&request.runtime_id, &request.input)
            .await
            .map(|accepted| accepted.id)
    }

    async fn status(&self, id: &str) -> Result<ExecutionRecord, ApiError> {
        self.service.execution(id).await
    }

    async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.service.cancel_execution(id).await
    }
}

pub struct CodeRunnerContainer {
    service: CodeRunnerService,
    runtimes: ResourceStore<RuntimeInstance>,
    active_runtime: RwLock<Option<String>>,
    executions: JobTracker<CodeExecutionDriver>,
}

impl CodeRunnerContainer {
    #[must_use]
    pub fn new(client: ApiClient, config: JobTrackerConfig) -> Self {
        let service = CodeRunnerService::new(client);
        let executions = JobTracker::new(
            CodeExecutionDriver {
                service: service.clone(),
            },
            config,
        );
        Self {
            service,
            runtimes: ResourceStore::new(),
            active_runtime: RwLock::new(None),
            executions,
        }
    }

    #[must_use]
    pub fn runtimes(&self) -> &ResourceStore<RuntimeInstance> {
        &self.runtimes
    }

    #[must_use]
    pub fn executions(&self) -> &JobTracker<CodeExecutionDriver> {
        &self.executions
    }

    pub async fn refresh_runtimes(&self) -> Result<(), StateError> {
        self.runtimes.apply(Change::LoadStarted).await;
        match self.service.runtimes().await {
            Ok(runtimes) => {
                let items = runtimes
                    .into_iter()
                    .map(|runtime| (runtime.id.clone(), runtime))
                    .collect();
                self.runtimes.apply(Change::Loaded(items)).await;
                Ok(())
            }
            Err(error) => {
                self.runtimes.apply(Change::Failed(error.to_string())).await;
                Err(StateError::action(error))
            }
        }
    }

    pub async fn create_runtime(&self, config: &RuntimeConfig) -> Result<RuntimeInstance, StateError> {
        let runtime = self
            .service
            .create_runtime(config)
            .await
            .map_err(StateError::action)?;
        self.runtimes
            .apply(Change::Merged(runtime.id.clone(), runtime.clone()))
            .await;
        Ok(runtime)
    }

    pub async fn delete_runtime(&self, id: &str) -> Result<(), StateError> {
        self.service
            .delete_runtime(id)
            .await
            .map_err(StateError::action)?;
        self.runtimes.apply(Change::Removed(id.to_string())).await;
        let mut active = self.active_runtime.write().await;
        if active.as_deref() == Some(id) {
            *active = None;
        }
        Ok(())
    }

    pub async fn set_active_runtime(&self, id: Option<String>) {
        *self.active_runtime.write().await = id;
    }

    pub async fn active_runtime(&self) -> Option<String> {
        self.active_runtime.read().await.clone()
    }

    /// Runs code on the active runtime (or an explicit one) and tracks
    /// the resulting execution.
    pub async fn run(&self, runtime_id: &str, input: CodeInput) -> Result<String, StateError> {
        let request = CodeExecutionRequest {
            runtime_id: runtime_id.to_string(),
            input,
        };
        self.executions.submit(&request).await
    }

    pub async fn cancel_execution(&self, id: &str) -> Result<(), StateError> {
        self.executions.cancel(id).await
    }

    /// One-off status fetch. Tracked executions get the fresh snapshot
    /// written back.
    pub async fn execution_status(&self, id: &str) -> Result<ExecutionRecord, StateError> {
        let record = self
            .service
            .execution(id)
            .await
            .map_err(|error| StateError::poll(id, error))?;
        self.executions.reconcile(record.clone()).await;
        Ok(record)
    }

    pub async fn packages(&self, runtime_id: &str) -> Result<Vec<PackageInfo>, StateError> {
        self.service
            .packages(runtime_id)
            .await
            .map_err(StateError::action)
    }

    pub async fn install_package(
        &self,
        runtime_id: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<PackageInfo, StateError> {
        self.service
            .install_package(runtime_id, name, version)
            .await
            .map_err(StateError::action)
    }

    pub async fn uninstall_package(&self, runtime_id: &str, name: &str) -> Result<(), StateError> {
        self.service
            .uninstall_package(runtime_id, name)
            .await
            .map_err(StateError::action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localagent_client::ApiClientConfig;
    use localagent_types::JobStatus;
    use std::time::Duration;

    #[tokio::test]
    async fn execution_polls_to_completion() {
        let mut server = mockito::Server::new_async().await;
        let _submit = server
            .mock("POST", "/api/code-runner/runtimes/rt1/execute")
            .with_status(200)
            .with_body(r#"{"executionId": "ex1", "status": "pending"}"#)
            .create_async()
            .await;
        let _status = server
            .mock("GET", "/api/code-runner/executions/ex1")
            .with_status(200)
            .with_body(
                r#"{
                    "id": "ex1", "status": "completed",
                    "output": {"stdout": "42\n", "stderr": "", "exitCode": 0, "duration": 12}
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(ApiClientConfig::new(server.url())).expect("client");
        let container = CodeRunnerContainer::new(
            client,
            JobTrackerConfig {
                poll_interval: Duration::from_millis(10),
                poll_retry_limit: 0,
            },
        );

        let input = CodeInput {
            code: "print(6 * 7)".to_string(),
            language: "python".to_string(),
            config: None,
        };
        let id = container.run("rt1", input).await.expect("run");
        tokio::time::sleep(Duration::from_millis(80)).await;

        let record = container.executions().job(&id).await.expect("tracked");
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(
            record.output.as_ref().map(|output| output.stdout.as_str()),
            Some("42\n")
        );
    }
}
