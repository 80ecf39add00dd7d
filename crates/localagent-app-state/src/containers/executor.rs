//! Execution tracking plus the pause/resume/retry lifecycle.

use async_trait::async_trait;
use localagent_client::{ApiClient, ApiError, ExecutorService};
use localagent_types::executor::{ExecutionResult, QueueSnapshot};
use localagent_types::{Execution, ExecutionContext, ExecutionEvent, ExecutionLog, ExecutionStats};
use tokio::sync::RwLock;

use crate::error::StateError;
use crate::tracker::{JobDriver, JobTracker, JobTrackerConfig};

pub struct ExecutionDriver {
    service: ExecutorService,
}

#[async_trait]
impl JobDriver for ExecutionDriver {
    type Request = ExecutionContext;
    type Record = Execution;

    async fn start(&self, context: &ExecutionContext) -> Result<String, ApiError> {
        self.service
            .start(context)
            .await
            .map(|accepted| accepted.id)
    }

    async fn status(&self, id: &str) -> Result<Execution, ApiError> {
        self.service.get(id).await?.ok_or_else(|| ApiError::Request {
            message: format!("execution {id} not found"),
        })
    }

    async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.service.cancel(id).await
    }
}

pub struct ExecutorContainer {
    service: ExecutorService,
    executions: JobTracker<ExecutionDriver>,
    stats: RwLock<Option<ExecutionStats>>,
}

impl ExecutorContainer {
    #[must_use]
    pub fn new(client: ApiClient, config: JobTrackerConfig) -> Self {
        let service = ExecutorService::new(client);
        let executions = JobTracker::new(
            ExecutionDriver {
                service: service.clone(),
            },
            config,
        );
        Self {
            service,
            executions,
            stats: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn executions(&self) -> &JobTracker<ExecutionDriver> {
        &self.executions
    }

    pub async fn start(&self, context: &ExecutionContext) -> Result<String, StateError> {
        self.executions.submit(context).await
    }

    pub async fn cancel(&self, id: &str) -> Result<(), StateError> {
        self.executions.cancel(id).await
    }

    /// Pauses a running execution and records the server's snapshot.
    pub async fn pause(&self, id: &str) -> Result<Execution, StateError> {
        let execution = self.service.pause(id).await.map_err(StateError::action)?;
        self.executions.reconcile(execution.clone()).await;
        Ok(execution)
    }

    pub async fn resume(&self, id: &str) -> Result<Execution, StateError> {
        let execution = self.service.resume(id).await.map_err(StateError::action)?;
        self.executions.reconcile(execution.clone()).await;
        Ok(execution)
    }

    pub async fn retry(&self, id: &str) -> Result<Execution, StateError> {
        let execution = self.service.retry(id).await.map_err(StateError::action)?;
        self.executions.reconcile(execution.clone()).await;
        Ok(execution)
    }

    pub async fn set_priority(&self, id: &str, priority: i32) -> Result<Execution, StateError> {
        let execution = self
            .service
            .set_priority(id, priority)
            .await
            .map_err(StateError::action)?;
        self.executions.reconcile(execution.clone()).await;
        Ok(execution)
    }

    pub async fn events(&self, id: &str) -> Result<Vec<ExecutionEvent>, StateError> {
        self.service.events(id).await.map_err(StateError::action)
    }

    pub async fn logs(&self, id: &str) -> Result<Vec<ExecutionLog>, StateError> {
        self.service.logs(id).await.map_err(StateError::action)
    }

    pub async fn result(&self, id: &str) -> Result<Option<ExecutionResult>, StateError> {
        self.service.result(id).await.map_err(StateError::action)
    }

    pub async fn refresh_stats(&self) -> Result<ExecutionStats, StateError> {
        let stats = self.service.stats().await.map_err(StateError::action)?;
        *self.stats.write().await = Some(stats.clone());
        Ok(stats)
    }

    pub async fn stats(&self) -> Option<ExecutionStats> {
        self.stats.read().await.clone()
    }

    pub async fn queue(&self) -> Result<QueueSnapshot, StateError> {
        self.service.queue().await.map_err(StateError::action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localagent_client::ApiClientConfig;
    use localagent_types::ExecutionStatus;

    #[tokio::test]
    async fn pause_returns_the_snapshot_without_tracking_untracked_ids() {
        let mut server = mockito::Server::new_async().await;
        let _pause = server
            .mock("POST", "/api/executor/executions/e1/pause")
            .with_status(200)
            .with_body(
                r#"{
                    "id": "e1", "taskId": "t1", "planId": "p1",
                    "status": "paused",
                    "createdAt": "2026-01-01T00:00:00Z",
                    "updatedAt": "2026-01-01T00:00:01Z"
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(ApiClientConfig::new(server.url())).expect("client");
        let container = ExecutorContainer::new(client, JobTrackerConfig::default());

        let execution = container.pause("e1").await.expect("pause");
        assert_eq!(execution.status, ExecutionStatus::Paused);
        // Reconcile only rewrites records the tracker already owns.
        assert!(!container.executions().is_tracked("e1").await);
    }
}
