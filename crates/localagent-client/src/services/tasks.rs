//! Task resource wrapper: CRUD, lifecycle transitions, steps, results.

use localagent_types::{Task, TaskFilter, TaskResult, TaskStats, TaskStep};
use serde_json::json;

use crate::client::{ApiClient, ApiError};
use crate::services::{query_suffix, wire_label};

#[derive(Debug, Clone)]
pub struct TaskService {
    client: ApiClient,
}

impl TaskService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn tasks_path(filter: Option<&TaskFilter>) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(filter) = filter {
            if let Some(kinds) = filter.kind.as_ref() {
                let labels: Vec<String> = kinds.iter().map(wire_label).collect();
                pairs.push(("type", labels.join(",")));
            }
            if let Some(statuses) = filter.status.as_ref() {
                let labels: Vec<String> = statuses.iter().map(wire_label).collect();
                pairs.push(("status", labels.join(",")));
            }
            if let Some(priorities) = filter.priority.as_ref() {
                let labels: Vec<String> = priorities.iter().map(wire_label).collect();
                pairs.push(("priority", labels.join(",")));
            }
            if let Some(agent_id) = filter.agent_id.as_ref() {
                pairs.push(("agent_id", agent_id.clone()));
            }
            if let Some(start) = filter.start_date {
                pairs.push(("start_date", start.to_rfc3339()));
            }
            if let Some(end) = filter.end_date {
                pairs.push(("end_date", end.to_rfc3339()));
            }
            if let Some(search) = filter.search.as_ref() {
                pairs.push(("search", search.clone()));
            }
        }
        format!("/tasks{}", query_suffix(&pairs))
    }

    #[must_use]
    pub fn task_path(id: &str) -> String {
        format!("/tasks/{}", id.trim())
    }

    #[must_use]
    pub fn task_action_path(id: &str, action: &str) -> String {
        format!("/tasks/{}/{action}", id.trim())
    }

    #[must_use]
    pub fn steps_path(id: &str) -> String {
        format!("/tasks/{}/steps", id.trim())
    }

    #[must_use]
    pub fn step_path(id: &str, step_id: &str) -> String {
        format!("/tasks/{}/steps/{}", id.trim(), step_id.trim())
    }

    #[must_use]
    pub fn result_path(id: &str) -> String {
        format!("/tasks/{}/result", id.trim())
    }

    #[must_use]
    pub fn stats_path() -> &'static str {
        "/tasks/stats"
    }

    pub async fn list(&self, filter: Option<&TaskFilter>) -> Result<Vec<Task>, ApiError> {
        self.client.get_json(Self::tasks_path(filter).as_str()).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Task>, ApiError> {
        self.client
            .get_optional_json(Self::task_path(id).as_str())
            .await
    }

    pub async fn create(&self, draft: &serde_json::Value) -> Result<Task, ApiError> {
        self.client.post_json("/tasks", draft).await
    }

    pub async fn update(&self, id: &str, patch: &serde_json::Value) -> Result<Task, ApiError> {
        self.client
            .put_json(Self::task_path(id).as_str(), patch)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(Self::task_path(id).as_str()).await
    }

    pub async fn start(&self, id: &str) -> Result<Task, ApiError> {
        self.transition(id, "start").await
    }

    pub async fn pause(&self, id: &str) -> Result<Task, ApiError> {
        self.transition(id, "pause").await
    }

    pub async fn resume(&self, id: &str) -> Result<Task, ApiError> {
        self.transition(id, "resume").await
    }

    pub async fn cancel(&self, id: &str) -> Result<Task, ApiError> {
        self.transition(id, "cancel").await
    }

    async fn transition(&self, id: &str, action: &str) -> Result<Task, ApiError> {
        self.client
            .post_json(Self::task_action_path(id, action).as_str(), &json!({}))
            .await
    }

    pub async fn add_step(&self, id: &str, step: &serde_json::Value) -> Result<TaskStep, ApiError> {
        self.client
            .post_json(Self::steps_path(id).as_str(), step)
            .await
    }

    pub async fn update_step(
        &self,
        id: &str,
        step_id: &str,
        patch: &serde_json::Value,
    ) -> Result<TaskStep, ApiError> {
        self.client
            .put_json(Self::step_path(id, step_id).as_str(), patch)
            .await
    }

    pub async fn delete_step(&self, id: &str, step_id: &str) -> Result<(), ApiError> {
        self.client.delete(Self::step_path(id, step_id).as_str()).await
    }

    pub async fn reorder_steps(&self, id: &str, order: &[String]) -> Result<Vec<TaskStep>, ApiError> {
        self.client
            .post_json(
                Self::task_action_path(id, "steps/reorder").as_str(),
                &json!({ "order": order }),
            )
            .await
    }

    pub async fn result(&self, id: &str) -> Result<Option<TaskResult>, ApiError> {
        self.client
            .get_optional_json(Self::result_path(id).as_str())
            .await
    }

    pub async fn set_result(
        &self,
        id: &str,
        result: &TaskResult,
    ) -> Result<TaskResult, ApiError> {
        self.client
            .put_json(Self::result_path(id).as_str(), result)
            .await
    }

    pub async fn stats(&self) -> Result<TaskStats, ApiError> {
        self.client.get_json(Self::stats_path()).await
    }

    pub async fn assign(&self, id: &str, agent_id: &str) -> Result<Task, ApiError> {
        self.client
            .post_json(
                Self::task_action_path(id, "assign").as_str(),
                &json!({ "agent_id": agent_id }),
            )
            .await
    }

    pub async fn unassign(&self, id: &str) -> Result<Task, ApiError> {
        self.client
            .post_json(Self::task_action_path(id, "unassign").as_str(), &json!({}))
            .await
    }

    pub async fn add_dependency(&self, id: &str, depends_on: &str) -> Result<Task, ApiError> {
        self.client
            .post_json(
                Self::task_action_path(id, "dependencies").as_str(),
                &json!({ "depends_on": depends_on }),
            )
            .await
    }

    pub async fn remove_dependency(&self, id: &str, depends_on: &str) -> Result<(), ApiError> {
        self.client
            .delete(format!("/tasks/{}/dependencies/{}", id.trim(), depends_on.trim()).as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localagent_types::{TaskPriority, TaskStatus};

    #[test]
    fn list_path_is_bare_without_filter() {
        assert_eq!(TaskService::tasks_path(None), "/tasks");
    }

    #[test]
    fn filter_fields_become_query_pairs() {
        let filter = TaskFilter {
            kind: None,
            status: Some(vec![TaskStatus::Pending, TaskStatus::Running]),
            priority: Some(vec![TaskPriority::High]),
            agent_id: Some("agent_7".to_string()),
            start_date: None,
            end_date: None,
            search: Some("deploy".to_string()),
        };
        assert_eq!(
            TaskService::tasks_path(Some(&filter)),
            "/tasks?status=pending%2Crunning&priority=high&agent_id=agent_7&search=deploy"
        );
    }

    #[test]
    fn path_helpers_are_deterministic() {
        assert_eq!(TaskService::task_path(" t1 "), "/tasks/t1");
        assert_eq!(TaskService::task_action_path("t1", "cancel"), "/tasks/t1/cancel");
        assert_eq!(TaskService::step_path("t1", "s2"), "/tasks/t1/steps/s2");
        assert_eq!(TaskService::result_path("t1"), "/tasks/t1/result");
        assert_eq!(TaskService::stats_path(), "/tasks/stats");
    }
}
