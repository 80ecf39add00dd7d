//! The root container. Owns one `ApiClient` and one container per
//! backend resource, and watches the auth channel so cached state never
//! outlives the session it was fetched under.

use std::sync::Arc;

use localagent_client::ApiClient;

use crate::containers::agent::AgentContainer;
use crate::containers::auth::AuthContainer;
use crate::containers::code_runner::CodeRunnerContainer;
use crate::containers::data_analyzer::DataAnalyzerContainer;
use crate::containers::executor::ExecutorContainer;
use crate::containers::file_processor::FileProcessorContainer;
use crate::containers::network::NetworkContainer;
use crate::containers::planner::PlannerContainer;
use crate::containers::system_operator::SystemOperatorContainer;
use crate::containers::task::TaskContainer;
use crate::containers::tool::ToolContainer;
use crate::store::Change;
use crate::tracker::JobTrackerConfig;

pub struct AppState {
    client: ApiClient,
    pub auth: Arc<AuthContainer>,
    pub tasks: Arc<TaskContainer>,
    pub agents: Arc<AgentContainer>,
    pub tools: Arc<ToolContainer>,
    pub code_runner: Arc<CodeRunnerContainer>,
    pub file_processor: Arc<FileProcessorContainer>,
    pub network: Arc<NetworkContainer>,
    pub data_analyzer: Arc<DataAnalyzerContainer>,
    pub system_operator: Arc<SystemOperatorContainer>,
    pub executor: Arc<ExecutorContainer>,
    pub planner: Arc<PlannerContainer>,
}

impl AppState {
    pub async fn new(client: ApiClient, tracker_config: JobTrackerConfig) -> Arc<Self> {
        let auth = Arc::new(AuthContainer::new(client.clone()).await);
        let state = Arc::new(Self {
            auth,
            tasks: Arc::new(TaskContainer::new(client.clone())),
            agents: Arc::new(AgentContainer::new(client.clone())),
            tools: Arc::new(ToolContainer::new(client.clone())),
            code_runner: Arc::new(CodeRunnerContainer::new(
                client.clone(),
                tracker_config.clone(),
            )),
            file_processor: Arc::new(FileProcessorContainer::new(
                client.clone(),
                tracker_config.clone(),
            )),
            network: Arc::new(NetworkContainer::new(client.clone(), tracker_config.clone())),
            data_analyzer: Arc::new(DataAnalyzerContainer::new(
                client.clone(),
                tracker_config.clone(),
            )),
            system_operator: Arc::new(SystemOperatorContainer::new(
                client.clone(),
                tracker_config.clone(),
            )),
            executor: Arc::new(ExecutorContainer::new(client.clone(), tracker_config.clone())),
            planner: Arc::new(PlannerContainer::new(client.clone(), tracker_config)),
            client,
        });
        state.watch_session();
        state
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth.state().is_authenticated
    }

    /// Drops every cached list, snapshot, and tracked job. Called when
    /// the session ends; also safe to call directly.
    pub async fn clear_cached_state(&self) {
        self.tasks.store().apply(Change::Cleared).await;
        self.agents.store().apply(Change::Cleared).await;
        self.tools.store().apply(Change::Cleared).await;
        self.code_runner.runtimes().apply(Change::Cleared).await;
        self.code_runner.executions().clear().await;
        self.file_processor.files().apply(Change::Cleared).await;
        self.file_processor.conversions().clear().await;
        self.file_processor.batches().clear().await;
        self.network.requests().clear().await;
        self.network.crawls().clear().await;
        self.data_analyzer.datasets().apply(Change::Cleared).await;
        self.data_analyzer.analyses().clear().await;
        self.system_operator.processes().apply(Change::Cleared).await;
        self.system_operator.services().apply(Change::Cleared).await;
        self.system_operator.fs_operations().clear().await;
        self.executor.executions().clear().await;
        self.planner.plans().apply(Change::Cleared).await;
        self.planner.executions().clear().await;
    }

    fn watch_session(self: &Arc<Self>) {
        let state = Arc::clone(self);
        let mut updates = self.auth.subscribe();
        tokio::spawn(async move {
            let mut was_authenticated = updates.borrow().is_authenticated;
            while updates.changed().await.is_ok() {
                let is_authenticated = updates.borrow_and_update().is_authenticated;
                if was_authenticated && !is_authenticated {
                    tracing::debug!("session ended, dropping cached resource state");
                    state.clear_cached_state().await;
                }
                was_authenticated = is_authenticated;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localagent_client::ApiClientConfig;
    use localagent_types::{LoginCredentials, Task, TaskPriority, TaskStatus, TaskType};

    fn task(id: &str) -> Task {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": "demo",
            "type": "custom",
            "status": "pending",
            "priority": "medium",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }))
        .expect("task fixture")
    }

    #[tokio::test]
    async fn logout_drops_cached_lists() {
        let mut server = mockito::Server::new_async().await;
        let _login = server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .with_body(
                r#"{"token": "tok_1", "user": {"id": "u1", "username": "ada", "email": "a@b.c"}}"#,
            )
            .create_async()
            .await;
        let _logout = server
            .mock("POST", "/api/auth/logout")
            .with_status(200)
            .create_async()
            .await;

        let client = ApiClient::new(ApiClientConfig::new(&server.url())).expect("client");
        let app = AppState::new(client, JobTrackerConfig::default()).await;

        let credentials = LoginCredentials {
            username: "ada".to_string(),
            password: "pw".to_string(),
        };
        app.auth.login(&credentials).await.expect("login");

        let fixture = task("t1");
        assert_eq!(fixture.status, TaskStatus::Pending);
        assert_eq!(fixture.priority, TaskPriority::Medium);
        assert_eq!(fixture.kind, TaskType::Custom);
        app.tasks
            .store()
            .apply(Change::Loaded(vec![("t1".to_string(), fixture)]))
            .await;
        assert_eq!(app.tasks.store().len().await, 1);

        app.auth.logout().await;
        // The watch task clears asynchronously; give it a tick.
        for _ in 0..50 {
            if app.tasks.store().is_empty().await {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(app.tasks.store().is_empty().await);
    }
}
