use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, Clone, Default)]
pub struct LoginUserDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required."))]
    pub password: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct AuthUser {
    pub email: String,
    #[serde(rename = "localId", skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
}

/// Body of the login response. The endpoint always answers 200; failure is
/// signaled through `success`/`message` so the client only branches on the
/// body.
#[derive(Debug, Serialize, Clone)]
pub struct LoginOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "refreshToken", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LoginOutcome {
    pub fn succeeded(token: &str, refresh_token: Option<&str>, user: AuthUser) -> Self {
        Self {
            success: true,
            token: Some(token.to_string()),
            refresh_token: refresh_token.map(str::to_string),
            user: Some(user),
            message: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            success: false,
            token: None,
            refresh_token: None,
            user: None,
            message: Some(message.to_string()),
        }
    }
}
