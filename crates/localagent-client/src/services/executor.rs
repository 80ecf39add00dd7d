use localagent_types::executor::{ExecutionResult, QueueSnapshot};
use localagent_types::{
    Execution, ExecutionContext, ExecutionEvent, ExecutionLog, ExecutionStats, JobAccepted,
};
use serde_json::json;

use crate::client::{ApiClient, ApiError};
use crate::services::query_suffix;

#[derive(Debug, Clone)]
pub struct ExecutorService {
    client: ApiClient,
}

impl ExecutorService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn execution_path(id: &str) -> String {
        format!("/executor/executions/{}", id.trim())
    }

    #[must_use]
    pub fn execution_action_path(id: &str, action: &str) -> String {
        format!("/executor/executions/{}/{action}", id.trim())
    }

    /// Starts an execution for the given context; acknowledged with the
    /// execution id and an initial `pending` status.
    pub async fn start(&self, context: &ExecutionContext) -> Result<JobAccepted, ApiError> {
        self.client.post_json("/executor/executions", context).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Execution>, ApiError> {
        self.client
            .get_optional_json(Self::execution_path(id).as_str())
            .await
    }

    pub async fn list(&self, task_id: Option<&str>) -> Result<Vec<Execution>, ApiError> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(task_id) = task_id {
            pairs.push(("task_id", task_id.to_string()));
        }
        self.client
            .get_json(format!("/executor/executions{}", query_suffix(&pairs)).as_str())
            .await
    }

    pub async fn pause(&self, id: &str) -> Result<Execution, ApiError> {
        self.transition(id, "pause").await
    }

    pub async fn resume(&self, id: &str) -> Result<Execution, ApiError> {
        self.transition(id, "resume").await
    }

    pub async fn retry(&self, id: &str) -> Result<Execution, ApiError> {
        self.transition(id, "retry").await
    }

    pub async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(Self::execution_action_path(id, "cancel").as_str())
            .await
    }

    async fn transition(&self, id: &str, action: &str) -> Result<Execution, ApiError> {
        self.client
            .post_json(Self::execution_action_path(id, action).as_str(), &json!({}))
            .await
    }

    pub async fn events(&self, id: &str) -> Result<Vec<ExecutionEvent>, ApiError> {
        self.client
            .get_json(Self::execution_action_path(id, "events").as_str())
            .await
    }

    pub async fn logs(&self, id: &str) -> Result<Vec<ExecutionLog>, ApiError> {
        self.client
            .get_json(Self::execution_action_path(id, "logs").as_str())
            .await
    }

    pub async fn result(&self, id: &str) -> Result<Option<ExecutionResult>, ApiError> {
        self.client
            .get_optional_json(Self::execution_action_path(id, "result").as_str())
            .await
    }

    pub async fn stats(&self) -> Result<ExecutionStats, ApiError> {
        self.client.get_json("/executor/stats").await
    }

    pub async fn queue(&self) -> Result<QueueSnapshot, ApiError> {
        self.client.get_json("/executor/queue").await
    }

    pub async fn set_priority(&self, id: &str, priority: i32) -> Result<Execution, ApiError> {
        self.client
            .put_json(
                Self::execution_action_path(id, "priority").as_str(),
                &json!({ "priority": priority }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_deterministic() {
        assert_eq!(
            ExecutorService::execution_path(" e1 "),
            "/executor/executions/e1"
        );
        assert_eq!(
            ExecutorService::execution_action_path("e1", "retry"),
            "/executor/executions/e1/retry"
        );
    }
}
