//! Tool catalog. Activating this container is what opens the client's
//! tool-call gate; while inactive, tool traffic is suppressed client-side
//! and reads come back empty.

use localagent_client::{ApiClient, ToolService};
use localagent_types::{Tool, ToolExecution, ToolFilter};

use crate::error::StateError;
use crate::store::{Change, ResourceStore};

pub struct ToolContainer {
    client: ApiClient,
    service: ToolService,
    tools: ResourceStore<Tool>,
}

impl ToolContainer {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let service = ToolService::new(client.clone());
        Self {
            client,
            service,
            tools: ResourceStore::new(),
        }
    }

    /// Opens or closes the client-wide tool-call gate.
    pub fn set_active(&self, active: bool) {
        self.client.set_tool_calls_allowed(active);
    }

    #[must_use]
    pub fn store(&self) -> &ResourceStore<Tool> {
        &self.tools
    }

    pub async fn refresh(&self, filter: Option<&ToolFilter>) -> Result<(), StateError> {
        self.tools.apply(Change::LoadStarted).await;
        match self.service.list(filter).await {
            Ok(tools) => {
                let items = tools.into_iter().map(|tool| (tool.id.clone(), tool)).collect();
                self.tools.apply(Change::Loaded(items)).await;
                Ok(())
            }
            Err(error) => {
                self.tools.apply(Change::Failed(error.to_string())).await;
                Err(StateError::action(error))
            }
        }
    }

    pub async fn create(&self, draft: &serde_json::Value) -> Result<Tool, StateError> {
        let tool = self
            .service
            .create(draft)
            .await
            .map_err(StateError::action)?;
        self.tools
            .apply(Change::Merged(tool.id.clone(), tool.clone()))
            .await;
        Ok(tool)
    }

    pub async fn update(&self, id: &str, patch: &serde_json::Value) -> Result<Tool, StateError> {
        let tool = self
            .service
            .update(id, patch)
            .await
            .map_err(StateError::action)?;
        self.tools
            .apply(Change::Merged(tool.id.clone(), tool.clone()))
            .await;
        Ok(tool)
    }

    pub async fn delete(&self, id: &str) -> Result<(), StateError> {
        self.service.delete(id).await.map_err(StateError::action)?;
        self.tools.apply(Change::Removed(id.to_string())).await;
        Ok(())
    }

    pub async fn executions(&self, id: &str) -> Result<Vec<ToolExecution>, StateError> {
        self.service.executions(id).await.map_err(StateError::action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localagent_client::ApiClientConfig;

    #[tokio::test]
    async fn inactive_container_reads_an_empty_catalog() {
        // No backend behind this address; suppressed calls never leave
        // the process.
        let client = ApiClient::new(ApiClientConfig::new("http://127.0.0.1:9")).expect("client");
        let container = ToolContainer::new(client);

        container.refresh(None).await.expect("gated refresh");
        assert!(container.store().is_empty().await);

        container.set_active(true);
        // With the gate open the same call now needs the network and
        // fails against the unreachable address.
        assert!(container.refresh(None).await.is_err());
    }
}
