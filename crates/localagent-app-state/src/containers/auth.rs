//! Session state. Changes broadcast on a watch channel so every other
//! container (and the CLI) can react to login and logout without a
//! global event bus.

use localagent_client::{ApiClient, ApiError, AuthService};
use localagent_types::{LoginCredentials, RegisterData, User};
use tokio::sync::watch;

use crate::error::StateError;

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    /// False until the one-shot who-am-I probe has run. Callers treat
    /// routes as loading rather than redirecting while this is false.
    pub initialized: bool,
    pub is_authenticated: bool,
    pub user: Option<User>,
}

pub struct AuthContainer {
    client: ApiClient,
    service: AuthService,
    state_tx: watch::Sender<AuthState>,
}

impl AuthContainer {
    pub async fn new(client: ApiClient) -> Self {
        let service = AuthService::new(client.clone());
        let (state_tx, _) = watch::channel(AuthState::default());

        // Any 401 flips the session to logged-out, wherever it happened.
        let tx = state_tx.clone();
        client
            .set_on_unauthorized(move || {
                tx.send_modify(|state| {
                    state.initialized = true;
                    state.is_authenticated = false;
                    state.user = None;
                });
            })
            .await;

        Self {
            client,
            service,
            state_tx,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    /// One-shot session probe. With no stored token it just marks the
    /// container initialized; with one, asks the backend who the token
    /// belongs to. A stale token surfaces as a plain logged-out state,
    /// not an error.
    pub async fn initialize(&self) -> Result<(), StateError> {
        if self.state_tx.borrow().initialized {
            return Ok(());
        }
        if self.client.token().await.is_none() {
            self.mark_logged_out();
            return Ok(());
        }
        match self.service.me().await {
            Ok(user) => {
                self.mark_logged_in(user);
                Ok(())
            }
            Err(ApiError::Unauthorized) => {
                self.mark_logged_out();
                Ok(())
            }
            Err(error) => {
                self.mark_logged_out();
                Err(StateError::auth(error))
            }
        }
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, StateError> {
        let session = self
            .service
            .login(credentials)
            .await
            .map_err(StateError::auth)?;
        self.client.set_token(session.token.clone()).await;
        self.mark_logged_in(session.user.clone());
        Ok(session.user)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<User, StateError> {
        let session = self
            .service
            .register(data)
            .await
            .map_err(StateError::auth)?;
        self.client.set_token(session.token.clone()).await;
        self.mark_logged_in(session.user.clone());
        Ok(session.user)
    }

    /// Clears local session state even when the server call fails.
    pub async fn logout(&self) {
        if let Err(error) = self.service.logout().await {
            tracing::debug!(error = %error, "server logout failed, clearing local session anyway");
        }
        self.client.clear_token().await;
        self.mark_logged_out();
    }

    fn mark_logged_in(&self, user: User) {
        self.state_tx.send_modify(|state| {
            state.initialized = true;
            state.is_authenticated = true;
            state.user = Some(user);
        });
    }

    fn mark_logged_out(&self) {
        self.state_tx.send_modify(|state| {
            state.initialized = true;
            state.is_authenticated = false;
            state.user = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localagent_client::ApiClientConfig;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(ApiClientConfig::new(base)).expect("client")
    }

    #[tokio::test]
    async fn initialize_without_token_marks_logged_out() {
        let auth = AuthContainer::new(client("http://127.0.0.1:9")).await;
        auth.initialize().await.expect("initialize");

        let state = auth.state();
        assert!(state.initialized);
        assert!(!state.is_authenticated);
    }

    #[tokio::test]
    async fn login_stores_token_and_broadcasts() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .with_body(
                r#"{"token": "tok_1", "user": {"id": "u1", "username": "ada", "email": "a@b.c"}}"#,
            )
            .create_async()
            .await;

        let api = client(&server.url());
        let auth = AuthContainer::new(api.clone()).await;
        let mut updates = auth.subscribe();

        let credentials = LoginCredentials {
            username: "ada".to_string(),
            password: "pw".to_string(),
        };
        let user = auth.login(&credentials).await.expect("login");
        assert_eq!(user.username, "ada");
        assert_eq!(api.token().await.as_deref(), Some("tok_1"));

        updates.changed().await.expect("broadcast");
        assert!(updates.borrow().is_authenticated);
    }

    #[tokio::test]
    async fn stale_token_initializes_to_logged_out_without_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/auth/me")
            .with_status(401)
            .create_async()
            .await;

        let api = client(&server.url());
        api.set_token("stale").await;
        let auth = AuthContainer::new(api.clone()).await;
        auth.initialize().await.expect("initialize");

        let state = auth.state();
        assert!(state.initialized);
        assert!(!state.is_authenticated);
        assert!(api.token().await.is_none());
    }

    #[tokio::test]
    async fn any_unauthorized_response_flips_the_session() {
        let mut server = mockito::Server::new_async().await;
        let _login = server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .with_body(
                r#"{"token": "tok_1", "user": {"id": "u1", "username": "ada", "email": "a@b.c"}}"#,
            )
            .create_async()
            .await;
        let _tasks = server
            .mock("GET", "/api/tasks")
            .with_status(401)
            .create_async()
            .await;

        let api = client(&server.url());
        let auth = AuthContainer::new(api.clone()).await;
        let credentials = LoginCredentials {
            username: "ada".to_string(),
            password: "pw".to_string(),
        };
        auth.login(&credentials).await.expect("login");
        assert!(auth.state().is_authenticated);

        // A 401 on an unrelated resource clears the token and the session.
        let result: Result<Vec<serde_json::Value>, _> = api.get_json("/tasks").await;
        assert!(result.is_err());
        assert!(api.token().await.is_none());
        assert!(!auth.state().is_authenticated);
    }
}
