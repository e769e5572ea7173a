// HTTP handlers for the auth/lobby API.
//
// The wire shapes mirror the legacy endpoints: POST /signup and /login
// with camelCase JSON bodies, POST /join-game validating that a user and
// room exist before the websocket attach.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::server::state::{self, AppState, LoginOutcome};
use tricktable_shared::{ApiMessage, JoinGameRequest, LoginRequest, SignupRequest};

pub async fn signup_handler(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Response {
    match state::create_user(&state, req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(message) => (StatusCode::CONFLICT, Json(ApiMessage { message })).into_response(),
    }
}

/// Login keeps the legacy 200 `{"message": "User not found"}` shape for
/// unknown users; a wrong password is an explicit 401 (the legacy API left
/// that branch hanging with no response at all).
pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Response {
    match state::login_user(&state, req).await {
        LoginOutcome::Success(resp) => (StatusCode::OK, Json(resp)).into_response(),
        LoginOutcome::UserNotFound => (
            StatusCode::OK,
            Json(ApiMessage {
                message: "User not found".into(),
            }),
        )
            .into_response(),
        LoginOutcome::BadPassword => (
            StatusCode::UNAUTHORIZED,
            Json(ApiMessage {
                message: "Not authenticated".into(),
            }),
        )
            .into_response(),
    }
}

pub async fn join_game_handler(
    State(state): State<AppState>,
    Json(req): Json<JoinGameRequest>,
) -> Response {
    if !state::user_exists(&state, &req.username).await {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiMessage {
                message: "User not found".into(),
            }),
        )
            .into_response();
    }
    if !state::room_exists(&state, &req.channel_id).await {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiMessage {
                message: format!("Room '{}' not found", req.channel_id),
            }),
        )
            .into_response();
    }
    (
        StatusCode::OK,
        Json(ApiMessage {
            message: "Joined".into(),
        }),
    )
        .into_response()
}
