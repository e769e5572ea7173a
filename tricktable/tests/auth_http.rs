use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;

use tricktable::server::{build_router, AppState};
use tricktable_shared::{JoinGameRequest, LoginRequest, SignupRequest};

async fn spawn_server() -> Result<SocketAddr> {
    let state = AppState::default();
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(addr)
}

fn signup_req(username: &str) -> SignupRequest {
    SignupRequest {
        first_name: "Test".into(),
        last_name: "Player".into(),
        username: username.into(),
        password: "hunter2".into(),
    }
}

#[tokio::test]
async fn signup_then_login_roundtrip() -> Result<()> {
    let addr = spawn_server().await?;
    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let resp = client
        .post(format!("{}/signup", base))
        .json(&signup_req("alice"))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["username"], "alice");
    assert!(body["userId"].as_str().is_some());

    // Duplicate usernames are rejected.
    let resp = client
        .post(format!("{}/signup", base))
        .json(&signup_req("alice"))
        .send()
        .await?;
    assert_eq!(resp.status(), 409);

    let resp = client
        .post(format!("{}/login", base))
        .json(&LoginRequest {
            username: "alice".into(),
            password: "hunter2".into(),
        })
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn login_failures_keep_the_legacy_shapes() -> Result<()> {
    let addr = spawn_server().await?;
    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    client
        .post(format!("{}/signup", base))
        .json(&signup_req("bob"))
        .send()
        .await?;

    // Wrong password is an explicit 401.
    let resp = client
        .post(format!("{}/login", base))
        .json(&LoginRequest {
            username: "bob".into(),
            password: "wrong".into(),
        })
        .send()
        .await?;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["message"], "Not authenticated");

    // Unknown user stays a 200 with a message body, as the legacy API did.
    let resp = client
        .post(format!("{}/login", base))
        .json(&LoginRequest {
            username: "nobody".into(),
            password: "whatever".into(),
        })
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["message"], "User not found");
    Ok(())
}

#[tokio::test]
async fn join_game_checks_user_and_room() -> Result<()> {
    let addr = spawn_server().await?;
    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    client
        .post(format!("{}/signup", base))
        .json(&signup_req("carol"))
        .send()
        .await?;

    let resp = client
        .post(format!("{}/join-game", base))
        .json(&JoinGameRequest {
            username: "ghost".into(),
            channel_id: "game-abc123def".into(),
        })
        .send()
        .await?;
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(format!("{}/join-game", base))
        .json(&JoinGameRequest {
            username: "carol".into(),
            channel_id: "game-nosuchroom".into(),
        })
        .send()
        .await?;
    assert_eq!(resp.status(), 404);
    Ok(())
}

#[tokio::test]
async fn health_endpoint_answers() -> Result<()> {
    let addr = spawn_server().await?;
    let resp = reqwest::get(format!("http://{}/health", addr)).await?;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["ok"], true);
    Ok(())
}
