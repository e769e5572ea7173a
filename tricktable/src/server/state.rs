use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;
use tricktable_shared::{
    LoginRequest, LoginResponse, PlayerId, PlayerPublic, RoomEvent, ServerMsg, SignupRequest,
    SignupResponse,
};

pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// A registered account. Everything is in-memory; persistence of users and
/// game history is out of scope.
#[derive(Clone)]
pub struct UserRecord {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Default)]
pub struct Registry {
    /// Accounts keyed by username.
    pub users: HashMap<String, UserRecord>,
    /// Issued tokens, token -> username.
    pub sessions: HashMap<String, String>,
}

/// A game room (channel): join-ordered membership, one broadcast fan-out,
/// and the game-started flag mirrored from relayed events so late joiners
/// can be told on attach.
pub struct Room {
    pub name: String,
    pub members: Vec<PlayerPublic>,
    pub game_started: bool,
    pub broadcaster: broadcast::Sender<ServerMsg>,
    /// Live connections per member. A user may hold several sockets at once
    /// (the CLI's create-then-start flow does); the member is only removed
    /// when the last one detaches.
    attached: HashMap<PlayerId, usize>,
}

impl Room {
    fn new(name: String) -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_BUFFER_SIZE);
        Room {
            name,
            members: Vec::new(),
            game_started: false,
            broadcaster: tx,
            attached: HashMap::new(),
        }
    }
}

/// Shared application state exposed to handlers.
#[derive(Clone)]
pub struct AppState {
    pub(crate) registry: Arc<RwLock<Registry>>,
    pub(crate) rooms: Arc<RwLock<HashMap<String, Room>>>,
    pub config: Arc<RwLock<Config>>,
    pub config_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        AppState {
            registry: Arc::new(RwLock::new(Registry::default())),
            rooms: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(RwLock::new(config)),
            config_path,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new(Config::default(), None)
    }
}

pub(crate) fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn new_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

fn new_room_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("game-{}", suffix.to_lowercase())
}

/// Register an account and issue a session token.
pub async fn create_user(state: &AppState, req: SignupRequest) -> Result<SignupResponse, String> {
    let mut registry = state.registry.write().await;
    if registry.users.contains_key(&req.username) {
        return Err(format!("Username '{}' already taken", req.username));
    }
    let record = UserRecord {
        user_id: Uuid::new_v4().to_string(),
        first_name: req.first_name,
        last_name: req.last_name,
        username: req.username.clone(),
        password_hash: hash_password(&req.password),
    };
    let token = new_token();
    registry.sessions.insert(token.clone(), req.username.clone());
    let resp = SignupResponse {
        token,
        user_id: record.user_id.clone(),
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        username: record.username.clone(),
        hashed_password: record.password_hash.clone(),
    };
    registry.users.insert(req.username, record);
    tracing::info!(username = %resp.username, user_id = %resp.user_id, "user signed up");
    Ok(resp)
}

pub enum LoginOutcome {
    Success(LoginResponse),
    UserNotFound,
    BadPassword,
}

pub async fn login_user(state: &AppState, req: LoginRequest) -> LoginOutcome {
    let mut registry = state.registry.write().await;
    let Some(record) = registry.users.get(&req.username).cloned() else {
        return LoginOutcome::UserNotFound;
    };
    if record.password_hash != hash_password(&req.password) {
        tracing::warn!(username = %req.username, "rejected login with wrong password");
        return LoginOutcome::BadPassword;
    }
    let token = new_token();
    registry.sessions.insert(token.clone(), record.username.clone());
    tracing::info!(username = %record.username, "user logged in");
    LoginOutcome::Success(LoginResponse {
        token,
        user_id: record.user_id,
        first_name: record.first_name,
        last_name: record.last_name,
        username: record.username,
    })
}

/// Resolve a session token to the public player view used in memberships.
pub async fn resolve_token(state: &AppState, token: &str) -> Option<PlayerPublic> {
    let registry = state.registry.read().await;
    let username = registry.sessions.get(token)?;
    let record = registry.users.get(username)?;
    Some(PlayerPublic::new(
        record.user_id.clone(),
        record.username.clone(),
    ))
}

pub async fn user_exists(state: &AppState, username: &str) -> bool {
    state.registry.read().await.users.contains_key(username)
}

pub async fn room_exists(state: &AppState, room_id: &str) -> bool {
    state.rooms.read().await.contains_key(room_id)
}

/// Create a room with `you` as its first (dealer) member.
pub async fn create_room(
    state: &AppState,
    you: &PlayerPublic,
) -> (String, Vec<PlayerPublic>, broadcast::Receiver<ServerMsg>) {
    let mut rooms = state.rooms.write().await;
    let mut room_id = new_room_id();
    while rooms.contains_key(&room_id) {
        room_id = new_room_id();
    }
    let mut room = Room::new(format!("Game Room {}", room_id));
    room.members.push(you.clone());
    room.attached.insert(you.id.clone(), 1);
    let rx = room.broadcaster.subscribe();
    let _ = room.broadcaster.send(ServerMsg::Event(RoomEvent::MemberAdded {
        member: you.clone(),
    }));
    let members = room.members.clone();
    rooms.insert(room_id.clone(), room);
    tracing::info!(room_id = %room_id, creator = %you.name, "room created");
    (room_id, members, rx)
}

/// Attach `you` to an existing room; emits `member.added` to the channel.
pub async fn join_room(
    state: &AppState,
    room_id: &str,
    you: &PlayerPublic,
) -> Result<(Vec<PlayerPublic>, bool, broadcast::Receiver<ServerMsg>), String> {
    let max_players = state.config.read().await.max_players;
    let mut rooms = state.rooms.write().await;
    let room = rooms
        .get_mut(room_id)
        .ok_or_else(|| format!("Room '{}' not found", room_id))?;
    let already_member = room.members.iter().any(|m| m.id == you.id);
    if !already_member && room.members.len() >= max_players {
        return Err(format!("Room '{}' is full", room_id));
    }
    *room.attached.entry(you.id.clone()).or_insert(0) += 1;
    if !already_member {
        room.members.push(you.clone());
        let _ = room.broadcaster.send(ServerMsg::Event(RoomEvent::MemberAdded {
            member: you.clone(),
        }));
    }
    let rx = room.broadcaster.subscribe();
    tracing::info!(room_id = %room_id, member = %you.name, "member joined room");
    Ok((room.members.clone(), room.game_started, rx))
}

/// Detach one of `you`'s connections from a room. The member is removed and
/// `member.removed` emitted only when the last connection goes; emptied rooms
/// are dropped.
pub async fn leave_room(state: &AppState, room_id: &str, you: &PlayerPublic) {
    let mut rooms = state.rooms.write().await;
    if let Some(room) = rooms.get_mut(room_id) {
        if let Some(count) = room.attached.get_mut(&you.id) {
            if *count > 1 {
                *count -= 1;
                tracing::debug!(room_id = %room_id, member = %you.name, connections = *count,
                    "connection detached, member still present");
                return;
            }
            room.attached.remove(&you.id);
        }
        room.members.retain(|m| m.id != you.id);
        let _ = room
            .broadcaster
            .send(ServerMsg::Event(RoomEvent::MemberRemoved {
                member: you.clone(),
            }));
        tracing::info!(room_id = %room_id, member = %you.name, "member left room");
        if room.members.is_empty() {
            rooms.remove(room_id);
            tracing::info!(room_id = %room_id, "room emptied and dropped");
        }
    }
}

pub async fn room_members(state: &AppState, room_id: &str) -> Option<Vec<PlayerPublic>> {
    let rooms = state.rooms.read().await;
    rooms.get(room_id).map(|r| r.members.clone())
}

/// Relay a client-published event to the room. Membership events are
/// server-only and rejected upstream in the ws handler.
pub async fn publish_event(state: &AppState, room_id: &str, event: RoomEvent) -> Result<(), String> {
    let mut rooms = state.rooms.write().await;
    let room = rooms
        .get_mut(room_id)
        .ok_or_else(|| format!("Room '{}' not found", room_id))?;
    if let RoomEvent::GameStarted { .. } = &event {
        room.game_started = true;
    }
    let _ = room.broadcaster.send(ServerMsg::Event(event));
    Ok(())
}
