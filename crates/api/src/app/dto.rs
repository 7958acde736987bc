use serde::{Deserialize, Serialize};

use gatehouse_auth::IdentityContext;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: &'static str,
    pub auth_payload: IdentityContext,
    pub auth_token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub const ACCESS_GRANTED: Self = Self {
        message: "Access Granted!",
    };
}
