use std::path::Path;

use anyhow::{bail, Context, Result};

use tricktable::session::Session;
use tricktable_shared::{
    ApiMessage, JoinGameRequest, LoginRequest, LoginResponse, SignupRequest, SignupResponse,
};

pub async fn signup(
    server: &str,
    first_name: String,
    last_name: String,
    username: String,
    password: String,
    session_path: &Path,
) -> Result<()> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/signup", server))
        .json(&SignupRequest {
            first_name,
            last_name,
            username,
            password,
        })
        .send()
        .await
        .with_context(|| format!("reaching {}", server))?;

    if !resp.status().is_success() {
        let msg: ApiMessage = resp.json().await?;
        bail!("signup failed: {}", msg.message);
    }
    let body: SignupResponse = resp.json().await?;
    store_identity(
        session_path,
        body.token,
        body.user_id,
        body.first_name,
        body.last_name,
        body.username,
    )?;
    println!("Signed up. Session saved to '{}'.", session_path.display());
    Ok(())
}

pub async fn login(
    server: &str,
    username: String,
    password: String,
    session_path: &Path,
) -> Result<()> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/login", server))
        .json(&LoginRequest { username, password })
        .send()
        .await
        .with_context(|| format!("reaching {}", server))?;

    if !resp.status().is_success() {
        let msg: ApiMessage = resp.json().await?;
        bail!("login failed: {}", msg.message);
    }
    // A 200 can still carry a plain message body (unknown user).
    let text = resp.text().await?;
    let body: LoginResponse = match serde_json::from_str(&text) {
        Ok(body) => body,
        Err(_) => {
            let msg: ApiMessage = serde_json::from_str(&text)
                .with_context(|| format!("unexpected login response: {}", text))?;
            bail!("login failed: {}", msg.message);
        }
    };
    store_identity(
        session_path,
        body.token,
        body.user_id,
        body.first_name,
        body.last_name,
        body.username,
    )?;
    println!("Logged in. Session saved to '{}'.", session_path.display());
    Ok(())
}

/// Register the player with a room over HTTP before attaching the websocket.
pub async fn join_game(server: &str, username: &str, room_id: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/join-game", server))
        .json(&JoinGameRequest {
            username: username.to_string(),
            channel_id: room_id.to_string(),
        })
        .send()
        .await
        .with_context(|| format!("reaching {}", server))?;

    if !resp.status().is_success() {
        let msg: ApiMessage = resp.json().await?;
        bail!("joining room '{}' failed: {}", room_id, msg.message);
    }
    Ok(())
}

fn store_identity(
    session_path: &Path,
    token: String,
    user_id: String,
    first_name: String,
    last_name: String,
    username: String,
) -> Result<()> {
    let mut session = Session::load(session_path)?;
    session.token = Some(token);
    session.user_id = Some(user_id);
    session.first_name = Some(first_name);
    session.last_name = Some(last_name);
    session.username = Some(username);
    session.save(session_path)
}
