use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Request body for signup. Fields are optional so absence is reported as a
/// validation error rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
        }
    }
}

/// Response returned after signup.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: PublicUser,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_response_shape() {
        let response = SignupResponse {
            user: PublicUser {
                id: Uuid::new_v4(),
                email: "test@example.com".into(),
                name: "Test".into(),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        let user = json["user"].as_object().unwrap();
        assert_eq!(user.len(), 3);
        assert_eq!(user["email"], "test@example.com");
        assert!(user.contains_key("id"));
        assert!(!json.to_string().contains("password"));
    }

    #[test]
    fn login_response_uses_auth_token_key() {
        let json = serde_json::to_value(LoginResponse {
            auth_token: "abc".into(),
        })
        .unwrap();
        assert_eq!(json["authToken"], "abc");
    }

    #[test]
    fn partial_bodies_deserialize() {
        let req: SignupRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@b.co"));
        assert!(req.password.is_none());
        assert!(req.name.is_none());
    }
}
