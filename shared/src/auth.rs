//! HTTP payloads for the signup/login/join-game endpoints.
//!
//! Field names are camelCase on the wire to stay compatible with the legacy
//! browser client.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub token: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub hashed_password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    pub username: String,
    pub channel_id: String,
}

/// Generic `{"message": ...}` body used for errors and the legacy
/// "User not found" login response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}
