use localagent_types::{Agent, AgentFilter};

use crate::client::{ApiClient, ApiError};
use crate::services::{query_suffix, wire_label};

#[derive(Debug, Clone)]
pub struct AgentService {
    client: ApiClient,
}

impl AgentService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn agents_path(filter: Option<&AgentFilter>) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(filter) = filter {
            if let Some(kind) = filter.kind.as_ref() {
                pairs.push(("type", wire_label(kind)));
            }
            if let Some(status) = filter.status.as_ref() {
                pairs.push(("status", wire_label(status)));
            }
            if let Some(capability) = filter.capability.as_ref() {
                pairs.push(("capability", wire_label(capability)));
            }
            if let Some(search) = filter.search.as_ref() {
                pairs.push(("search", search.clone()));
            }
        }
        format!("/agents{}", query_suffix(&pairs))
    }

    #[must_use]
    pub fn agent_path(id: &str) -> String {
        format!("/agents/{}", id.trim())
    }

    pub async fn list(&self, filter: Option<&AgentFilter>) -> Result<Vec<Agent>, ApiError> {
        self.client
            .get_json(Self::agents_path(filter).as_str())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Agent>, ApiError> {
        self.client
            .get_optional_json(Self::agent_path(id).as_str())
            .await
    }

    pub async fn create(&self, draft: &serde_json::Value) -> Result<Agent, ApiError> {
        self.client.post_json("/agents", draft).await
    }

    pub async fn update(&self, id: &str, patch: &serde_json::Value) -> Result<Agent, ApiError> {
        self.client
            .put_json(Self::agent_path(id).as_str(), patch)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(Self::agent_path(id).as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localagent_types::agent::{AgentCapability, AgentStatus, AgentType};

    #[test]
    fn filter_uses_wire_labels() {
        let filter = AgentFilter {
            kind: Some(AgentType::Executor),
            status: Some(AgentStatus::Idle),
            capability: Some(AgentCapability::CodeExecution),
            search: None,
        };
        assert_eq!(
            AgentService::agents_path(Some(&filter)),
            "/agents?type=executor&status=idle&capability=code_execution"
        );
        assert_eq!(AgentService::agents_path(None), "/agents");
        assert_eq!(AgentService::agent_path(" a1 "), "/agents/a1");
    }
}
