use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Token plus the user it belongs to, as returned by the login and
/// register endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn session_decodes_without_optional_user_fields() {
        let raw = r#"{
            "token": "tok_abc",
            "user": {"id": "u1", "username": "ada", "email": "ada@example.com"}
        }"#;
        let session: AuthSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.token, "tok_abc");
        assert_eq!(session.user.username, "ada");
        assert!(session.user.role.is_none());
    }
}
