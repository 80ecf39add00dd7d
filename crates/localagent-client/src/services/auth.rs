//! Session endpoints. Token storage itself lives on the `ApiClient`; the
//! auth container decides when to set or clear it.

use localagent_types::{AuthSession, LoginCredentials, RegisterData, User};
use serde_json::json;

use crate::client::{ApiClient, ApiError};

#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, ApiError> {
        self.client.post_json("/auth/login", credentials).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client.post_empty("/auth/logout").await
    }

    pub async fn register(&self, data: &RegisterData) -> Result<AuthSession, ApiError> {
        self.client.post_json("/auth/register", data).await
    }

    /// Who-am-I probe; answers 401 when the stored token is stale.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.get_json("/auth/me").await
    }

    pub async fn update_profile(&self, patch: &serde_json::Value) -> Result<User, ApiError> {
        self.client.put_json("/auth/profile", patch).await
    }

    pub async fn change_password(
        &self,
        current: &str,
        next: &str,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .client
            .put_json(
                "/auth/password",
                &json!({ "current_password": current, "new_password": next }),
            )
            .await?;
        Ok(())
    }

    pub async fn refresh_token(&self) -> Result<AuthSession, ApiError> {
        self.client.post_json("/auth/refresh", &json!({})).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .client
            .post_json("/auth/forgot-password", &json!({ "email": email }))
            .await?;
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .client
            .post_json(
                "/auth/reset-password",
                &json!({ "token": token, "password": password }),
            )
            .await?;
        Ok(())
    }
}
