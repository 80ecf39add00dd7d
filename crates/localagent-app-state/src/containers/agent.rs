use localagent_client::{ApiClient, AgentService};
use localagent_types::{Agent, AgentFilter};

use crate::error::StateError;
use crate::store::{Change, ResourceStore};

pub struct AgentContainer {
    service: AgentService,
    agents: ResourceStore<Agent>,
}

impl AgentContainer {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            service: AgentService::new(client),
            agents: ResourceStore::new(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &ResourceStore<Agent> {
        &self.agents
    }

    pub async fn refresh(&self, filter: Option<&AgentFilter>) -> Result<(), StateError> {
        self.agents.apply(Change::LoadStarted).await;
        match self.service.list(filter).await {
            Ok(agents) => {
                let items = agents
                    .into_iter()
                    .map(|agent| (agent.id.clone(), agent))
                    .collect();
                self.agents.apply(Change::Loaded(items)).await;
                Ok(())
            }
            Err(error) => {
                self.agents.apply(Change::Failed(error.to_string())).await;
                Err(StateError::action(error))
            }
        }
    }

    pub async fn create(&self, draft: &serde_json::Value) -> Result<Agent, StateError> {
        let agent = self
            .service
            .create(draft)
            .await
            .map_err(StateError::action)?;
        self.agents
            .apply(Change::Merged(agent.id.clone(), agent.clone()))
            .await;
        Ok(agent)
    }

    pub async fn update(&self, id: &str, patch: &serde_json::Value) -> Result<Agent, StateError> {
        let agent = self
            .service
            .update(id, patch)
            .await
            .map_err(StateError::action)?;
        self.agents
            .apply(Change::Merged(agent.id.clone(), agent.clone()))
            .await;
        Ok(agent)
    }

    pub async fn delete(&self, id: &str) -> Result<(), StateError> {
        self.service.delete(id).await.map_err(StateError::action)?;
        self.agents.apply(Change::Removed(id.to_string())).await;
        Ok(())
    }
}
