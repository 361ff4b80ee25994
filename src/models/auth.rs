//! Login endpoint request and response bodies.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Credentials submitted to `POST /auth/login`
#[derive(Serialize, Deserialize, Apiv2Schema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Empty for silent policy denials
    pub message: String,
}

impl LoginResponse {
    pub fn granted(token: String) -> Self {
        Self {
            success: true,
            token: Some(token),
            message: "Login successful".to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            token: None,
            message: message.into(),
        }
    }
}
