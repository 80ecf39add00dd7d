//! Plan catalogue, node editing, and tracked plan executions.

use async_trait::async_trait;
use localagent_client::{ApiClient, ApiError, PlannerService};
use localagent_types::{PlanExecution, PlanNode, PlanValidation, PlanningContext, TaskPlan};

use crate::error::StateError;
use crate::store::{Change, ResourceStore};
use crate::tracker::{JobDriver, JobTracker, JobTrackerConfig};

pub struct PlanExecutionDriver {
    service: PlannerService,
}

#[async_trait]
impl JobDriver for PlanExecutionDriver {
    type Request = String;
    type Record = PlanExecution;

    async fn start(&self, plan_id: &String) -> Result<String, ApiError> {
        self.service
            .execute(plan_id)
            .await
            .map(|execution| execution.plan_id)
    }

    async fn status(&self, plan_id: &str) -> Result<PlanExecution, ApiError> {
        self.service
            .execution(plan_id)
            .await?
            .ok_or_else(|| ApiError::Request {
                message: format!("no execution for plan {plan_id}"),
            })
    }

    async fn cancel(&self, plan_id: &str) -> Result<(), ApiError> {
        self.service
            .update(plan_id, &serde_json::json!({ "status": "cancelled" }))
            .await
            .map(|_| ())
    }
}

pub struct PlannerContainer {
    service: PlannerService,
    plans: ResourceStore<TaskPlan>,
    executions: JobTracker<PlanExecutionDriver>,
}

impl PlannerContainer {
    #[must_use]
    pub fn new(client: ApiClient, config: JobTrackerConfig) -> Self {
        let service = PlannerService::new(client);
        let executions = JobTracker::new(
            PlanExecutionDriver {
                service: service.clone(),
            },
            config,
        );
        Self {
            service,
            plans: ResourceStore::new(),
            executions,
        }
    }

    #[must_use]
    pub fn plans(&self) -> &ResourceStore<TaskPlan> {
        &self.plans
    }

    #[must_use]
    pub fn executions(&self) -> &JobTracker<PlanExecutionDriver> {
        &self.executions
    }

    pub async fn refresh(&self, task_id: Option<&str>) -> Result<(), StateError> {
        self.plans.apply(Change::LoadStarted).await;
        match self.service.list(task_id).await {
            Ok(plans) => {
                let items = plans
                    .into_iter()
                    .map(|plan| (plan.id.clone(), plan))
                    .collect();
                self.plans.apply(Change::Loaded(items)).await;
                Ok(())
            }
            Err(error) => {
                self.plans.apply(Change::Failed(error.to_string())).await;
                Err(StateError::action(error))
            }
        }
    }

    pub async fn generate(&self, context: &PlanningContext) -> Result<TaskPlan, StateError> {
        let plan = self.service.generate(context).await;
        self.merge_plan(plan).await
    }

    pub async fn update(&self, id: &str, patch: &serde_json::Value) -> Result<TaskPlan, StateError> {
        let plan = self.service.update(id, patch).await;
        self.merge_plan(plan).await
    }

    pub async fn add_node(&self, plan_id: &str, node: &PlanNode) -> Result<TaskPlan, StateError> {
        let plan = self.service.add_node(plan_id, node).await;
        self.merge_plan(plan).await
    }

    pub async fn update_node(
        &self,
        plan_id: &str,
        node_id: &str,
        patch: &serde_json::Value,
    ) -> Result<TaskPlan, StateError> {
        let plan = self.service.update_node(plan_id, node_id, patch).await;
        self.merge_plan(plan).await
    }

    /// Deleting a node returns no body, so the plan is re-fetched to keep
    /// the cached copy authoritative.
    pub async fn delete_node(&self, plan_id: &str, node_id: &str) -> Result<(), StateError> {
        self.service
            .delete_node(plan_id, node_id)
            .await
            .map_err(StateError::action)?;
        if let Some(plan) = self.service.get(plan_id).await.map_err(StateError::action)? {
            self.plans.apply(Change::Merged(plan.id.clone(), plan)).await;
        }
        Ok(())
    }

    pub async fn reorder_nodes(
        &self,
        plan_id: &str,
        order: &[String],
    ) -> Result<TaskPlan, StateError> {
        let plan = self.service.reorder_nodes(plan_id, order).await;
        self.merge_plan(plan).await
    }

    pub async fn validate(&self, id: &str) -> Result<PlanValidation, StateError> {
        self.service.validate(id).await.map_err(StateError::action)
    }

    pub async fn optimize(&self, id: &str) -> Result<TaskPlan, StateError> {
        let plan = self.service.optimize(id).await;
        self.merge_plan(plan).await
    }

    pub async fn execute(&self, plan_id: &str) -> Result<String, StateError> {
        self.executions.submit(&plan_id.to_string()).await
    }

    pub async fn cancel_execution(&self, plan_id: &str) -> Result<(), StateError> {
        self.executions.cancel(plan_id).await
    }

    pub async fn analysis(&self, id: &str) -> Result<serde_json::Value, StateError> {
        self.service.analysis(id).await.map_err(StateError::action)
    }

    pub async fn metrics(&self) -> Result<serde_json::Value, StateError> {
        self.service.metrics().await.map_err(StateError::action)
    }

    pub async fn save_template(
        &self,
        id: &str,
        name: &str,
    ) -> Result<serde_json::Value, StateError> {
        self.service
            .save_template(id, name)
            .await
            .map_err(StateError::action)
    }

    pub async fn apply_template(
        &self,
        template_id: &str,
        task_id: &str,
    ) -> Result<TaskPlan, StateError> {
        let plan = self.service.apply_template(template_id, task_id).await;
        self.merge_plan(plan).await
    }

    async fn merge_plan(&self, plan: Result<TaskPlan, ApiError>) -> Result<TaskPlan, StateError> {
        let plan = plan.map_err(StateError::action)?;
        self.plans
            .apply(Change::Merged(plan.id.clone(), plan.clone()))
            .await;
        Ok(plan)
    }
}
