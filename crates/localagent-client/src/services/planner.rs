use localagent_types::{
    PlanExecution, PlanNode, PlanValidation, PlanningContext, TaskPlan,
};
use serde_json::json;

use crate::client::{ApiClient, ApiError};
use crate::services::query_suffix;

#[derive(Debug, Clone)]
pub struct PlannerService {
    client: ApiClient,
}

impl PlannerService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn plan_path(id: &str) -> String {
        format!("/planner/plans/{}", id.trim())
    }

    #[must_use]
    pub fn node_path(plan_id: &str, node_id: &str) -> String {
        format!("/planner/plans/{}/nodes/{}", plan_id.trim(), node_id.trim())
    }

    #[must_use]
    pub fn plan_action_path(id: &str, action: &str) -> String {
        format!("/planner/plans/{}/{action}", id.trim())
    }

    /// Asks the planner to generate a plan for the given context.
    pub async fn generate(&self, context: &PlanningContext) -> Result<TaskPlan, ApiError> {
        self.client.post_json("/planner/plans", context).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<TaskPlan>, ApiError> {
        self.client
            .get_optional_json(Self::plan_path(id).as_str())
            .await
    }

    pub async fn list(&self, task_id: Option<&str>) -> Result<Vec<TaskPlan>, ApiError> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(task_id) = task_id {
            pairs.push(("task_id", task_id.to_string()));
        }
        self.client
            .get_json(format!("/planner/plans{}", query_suffix(&pairs)).as_str())
            .await
    }

    pub async fn update(&self, id: &str, patch: &serde_json::Value) -> Result<TaskPlan, ApiError> {
        self.client.put_json(Self::plan_path(id).as_str(), patch).await
    }

    pub async fn add_node(&self, plan_id: &str, node: &PlanNode) -> Result<TaskPlan, ApiError> {
        self.client
            .post_json(Self::plan_action_path(plan_id, "nodes").as_str(), node)
            .await
    }

    pub async fn update_node(
        &self,
        plan_id: &str,
        node_id: &str,
        patch: &serde_json::Value,
    ) -> Result<TaskPlan, ApiError> {
        self.client
            .put_json(Self::node_path(plan_id, node_id).as_str(), patch)
            .await
    }

    pub async fn delete_node(&self, plan_id: &str, node_id: &str) -> Result<(), ApiError> {
        self.client
            .delete(Self::node_path(plan_id, node_id).as_str())
            .await
    }

    pub async fn reorder_nodes(&self, plan_id: &str, order: &[String]) -> Result<TaskPlan, ApiError> {
        self.client
            .post_json(
                Self::plan_action_path(plan_id, "nodes/reorder").as_str(),
                &json!({ "order": order }),
            )
            .await
    }

    pub async fn validate(&self, id: &str) -> Result<PlanValidation, ApiError> {
        self.client
            .post_json(Self::plan_action_path(id, "validate").as_str(), &json!({}))
            .await
    }

    pub async fn optimize(&self, id: &str) -> Result<TaskPlan, ApiError> {
        self.client
            .post_json(Self::plan_action_path(id, "optimize").as_str(), &json!({}))
            .await
    }

    pub async fn execute(&self, id: &str) -> Result<PlanExecution, ApiError> {
        self.client
            .post_json(Self::plan_action_path(id, "execute").as_str(), &json!({}))
            .await
    }

    pub async fn execution(&self, id: &str) -> Result<Option<PlanExecution>, ApiError> {
        self.client
            .get_optional_json(Self::plan_action_path(id, "execution").as_str())
            .await
    }

    pub async fn executions(&self) -> Result<Vec<PlanExecution>, ApiError> {
        self.client.get_json("/planner/executions").await
    }

    pub async fn analysis(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        self.client
            .get_json(Self::plan_action_path(id, "analysis").as_str())
            .await
    }

    pub async fn metrics(&self) -> Result<serde_json::Value, ApiError> {
        self.client.get_json("/planner/metrics").await
    }

    pub async fn save_template(&self, id: &str, name: &str) -> Result<serde_json::Value, ApiError> {
        self.client
            .post_json("/planner/templates", &json!({ "plan_id": id, "name": name }))
            .await
    }

    pub async fn apply_template(
        &self,
        template_id: &str,
        task_id: &str,
    ) -> Result<TaskPlan, ApiError> {
        self.client
            .post_json(
                format!("/planner/templates/{}/apply", template_id.trim()).as_str(),
                &json!({ "task_id": task_id }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_deterministic() {
        assert_eq!(PlannerService::plan_path("p1"), "/planner/plans/p1");
        assert_eq!(PlannerService::node_path("p1", "n2"), "/planner/plans/p1/nodes/n2");
        assert_eq!(
            PlannerService::plan_action_path("p1", "validate"),
            "/planner/plans/p1/validate"
        );
    }
}
