//! Tool resource wrapper. Every path here lives under `/tools`, which
//! makes all of these calls subject to the client's tool-call gate.

use localagent_types::{Tool, ToolExecution, ToolFilter};

use crate::client::{ApiClient, ApiError};
use crate::services::{query_suffix, wire_label};

#[derive(Debug, Clone)]
pub struct ToolService {
    client: ApiClient,
}

impl ToolService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn tools_path(filter: Option<&ToolFilter>) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(filter) = filter {
            if let Some(category) = filter.category.as_ref() {
                pairs.push(("category", wire_label(category)));
            }
            if let Some(enabled) = filter.enabled {
                pairs.push(("enabled", enabled.to_string()));
            }
            if let Some(search) = filter.search.as_ref() {
                pairs.push(("search", search.clone()));
            }
        }
        format!("/tools{}", query_suffix(&pairs))
    }

    #[must_use]
    pub fn tool_path(id: &str) -> String {
        format!("/tools/{}", id.trim())
    }

    #[must_use]
    pub fn executions_path(id: &str) -> String {
        format!("/tools/{}/executions", id.trim())
    }

    pub async fn list(&self, filter: Option<&ToolFilter>) -> Result<Vec<Tool>, ApiError> {
        self.client.get_json(Self::tools_path(filter).as_str()).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Tool>, ApiError> {
        self.client
            .get_optional_json(Self::tool_path(id).as_str())
            .await
    }

    pub async fn create(&self, draft: &serde_json::Value) -> Result<Tool, ApiError> {
        self.client.post_json("/tools", draft).await
    }

    pub async fn update(&self, id: &str, patch: &serde_json::Value) -> Result<Tool, ApiError> {
        self.client.put_json(Self::tool_path(id).as_str(), patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(Self::tool_path(id).as_str()).await
    }

    pub async fn executions(&self, id: &str) -> Result<Vec<ToolExecution>, ApiError> {
        self.client
            .get_json(Self::executions_path(id).as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localagent_types::tool::ToolCategory;

    #[test]
    fn paths_are_deterministic() {
        assert_eq!(ToolService::tools_path(None), "/tools");
        let filter = ToolFilter {
            category: Some(ToolCategory::FileProcessing),
            enabled: Some(true),
            search: None,
        };
        assert_eq!(
            ToolService::tools_path(Some(&filter)),
            "/tools?category=file_processing&enabled=true"
        );
        assert_eq!(ToolService::executions_path("t1"), "/tools/t1/executions");
    }
}
