//! Task list state. Lifecycle actions reconcile the record the backend
//! returns; the store never invents a transition locally.

use localagent_client::{ApiClient, TaskService};
use localagent_types::{Task, TaskFilter, TaskStats};
use tokio::sync::RwLock;

use crate::error::StateError;
use crate::store::{Change, ResourceStore};

pub struct TaskContainer {
    service: TaskService,
    tasks: ResourceStore<Task>,
    stats: RwLock<Option<TaskStats>>,
}

impl TaskContainer {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            service: TaskService::new(client),
            tasks: ResourceStore::new(),
            stats: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn store(&self) -> &ResourceStore<Task> {
        &self.tasks
    }

    pub async fn refresh(&self, filter: Option<&TaskFilter>) -> Result<(), StateError> {
        self.tasks.apply(Change::LoadStarted).await;
        match self.service.list(filter).await {
            Ok(tasks) => {
                let items = tasks.into_iter().map(|task| (task.id.clone(), task)).collect();
                self.tasks.apply(Change::Loaded(items)).await;
                Ok(())
            }
            Err(error) => {
                self.tasks.apply(Change::Failed(error.to_string())).await;
                Err(StateError::action(error))
            }
        }
    }

    pub async fn create(&self, draft: &serde_json::Value) -> Result<Task, StateError> {
        let task = self
            .service
            .create(draft)
            .await
            .map_err(StateError::action)?;
        self.merge(task.clone()).await;
        Ok(task)
    }

    pub async fn update(&self, id: &str, patch: &serde_json::Value) -> Result<Task, StateError> {
        let task = self
            .service
            .update(id, patch)
            .await
            .map_err(StateError::action)?;
        self.merge(task.clone()).await;
        Ok(task)
    }

    pub async fn delete(&self, id: &str) -> Result<(), StateError> {
        self.service.delete(id).await.map_err(StateError::action)?;
        self.tasks.apply(Change::Removed(id.to_string())).await;
        Ok(())
    }

    pub async fn start(&self, id: &str) -> Result<Task, StateError> {
        let task = self.service.start(id).await.map_err(StateError::action)?;
        self.merge(task.clone()).await;
        Ok(task)
    }

    pub async fn pause(&self, id: &str) -> Result<Task, StateError> {
        let task = self.service.pause(id).await.map_err(StateError::action)?;
        self.merge(task.clone()).await;
        Ok(task)
    }

    pub async fn resume(&self, id: &str) -> Result<Task, StateError> {
        let task = self.service.resume(id).await.map_err(StateError::action)?;
        self.merge(task.clone()).await;
        Ok(task)
    }

    pub async fn cancel(&self, id: &str) -> Result<Task, StateError> {
        let task = self.service.cancel(id).await.map_err(StateError::action)?;
        self.merge(task.clone()).await;
        Ok(task)
    }

    pub async fn assign(&self, id: &str, agent_id: &str) -> Result<Task, StateError> {
        let task = self
            .service
            .assign(id, agent_id)
            .await
            .map_err(StateError::action)?;
        self.merge(task.clone()).await;
        Ok(task)
    }

    pub async fn refresh_stats(&self) -> Result<TaskStats, StateError> {
        let stats = self.service.stats().await.map_err(StateError::action)?;
        *self.stats.write().await = Some(stats.clone());
        Ok(stats)
    }

    pub async fn stats(&self) -> Option<TaskStats> {
        self.stats.read().await.clone()
    }

    async fn merge(&self, task: Task) {
        self.tasks.apply(Change::Merged(task.id.clone(), task)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localagent_client::ApiClientConfig;
    use localagent_types::TaskStatus;

    #[tokio::test]
    async fn lifecycle_action_reconciles_the_returned_record() {
        let mut server = mockito::Server::new_async().await;
        let _list = server
            .mock("GET", "/api/tasks")
            .with_status(200)
            .with_body(
                r#"[{
                    "id": "t1", "name": "demo", "type": "custom",
                    "status": "pending", "priority": "medium",
                    "created_at": "2026-01-01T00:00:00Z",
                    "updated_at": "2026-01-01T00:00:00Z"
                }]"#,
            )
            .create_async()
            .await;
        let _start = server
            .mock("POST", "/api/tasks/t1/start")
            .with_status(200)
            .with_body(
                r#"{
                    "id": "t1", "name": "demo", "type": "custom",
                    "status": "running", "priority": "medium",
                    "created_at": "2026-01-01T00:00:00Z",
                    "updated_at": "2026-01-01T00:00:01Z"
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(ApiClientConfig::new(server.url())).expect("client");
        let container = TaskContainer::new(client);

        container.refresh(None).await.expect("refresh");
        let task = container.store().get("t1").await.expect("listed");
        assert_eq!(task.status, TaskStatus::Pending);

        container.start("t1").await.expect("start");
        let task = container.store().get("t1").await.expect("merged");
        assert_eq!(task.status, TaskStatus::Running);
    }

    #[tokio::test]
    async fn failed_refresh_records_the_message() {
        let client = ApiClient::new(ApiClientConfig::new("http://127.0.0.1:9")).expect("client");
        let container = TaskContainer::new(client);

        assert!(container.refresh(None).await.is_err());
        assert!(!container.store().loading().await);
        assert!(container.store().error().await.is_some());
    }
}
