// WebSocket handler: attach a connection to a room, then relay events
// between the socket and the room's broadcast channel.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::StreamExt;
use tokio::sync::broadcast;

use crate::server::state::{self, AppState};
use tricktable_shared::{ClientMsg, PlayerPublic, ServerMsg};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

struct Attachment {
    room_id: String,
    you: PlayerPublic,
    rx: broadcast::Receiver<ServerMsg>,
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    // The first meaningful message must be Create or Join; everything else
    // is answered but leaves the connection unattached.
    let Some(attachment) = wait_for_attach(&mut socket, &state).await else {
        return;
    };
    let Attachment {
        room_id,
        you,
        mut rx,
    } = attachment;

    tracing::info!(room_id = %room_id, member = %you.name, "websocket attached");

    loop {
        tokio::select! {
            biased;

            recv = rx.recv() => {
                match recv {
                    Ok(sm) => send_ws(&mut socket, &sm).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Slow consumer; the resend protocol covers the gap.
                        tracing::warn!(room_id = %room_id, missed, "socket lagged behind room broadcast");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = socket.next() => {
                match msg {
                    Some(Ok(Message::Text(txt))) => {
                        match serde_json::from_str::<ClientMsg>(&txt) {
                            Ok(cm) => process_client_msg(&state, &mut socket, &room_id, cm).await,
                            Err(_) => {
                                tracing::warn!(raw_in = %txt, "failed to parse incoming ClientMsg JSON");
                                send_ws(&mut socket, &ServerMsg::Error("Malformed ClientMsg JSON".into())).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    state::leave_room(&state, &room_id, &you).await;
    tracing::info!(room_id = %room_id, member = %you.name, "websocket detached");
}

async fn wait_for_attach(socket: &mut WebSocket, state: &AppState) -> Option<Attachment> {
    loop {
        let txt = match socket.next().await {
            Some(Ok(Message::Text(txt))) => txt,
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return None,
            _ => continue,
        };
        let cm = match serde_json::from_str::<ClientMsg>(&txt) {
            Ok(cm) => cm,
            Err(_) => {
                send_ws(socket, &ServerMsg::Error("Malformed ClientMsg JSON".into())).await;
                continue;
            }
        };
        match cm {
            ClientMsg::Create { token } => {
                let Some(you) = state::resolve_token(state, &token).await else {
                    send_ws(socket, &ServerMsg::Error("Invalid token".into())).await;
                    continue;
                };
                let (room_id, members, rx) = state::create_room(state, &you).await;
                send_ws(
                    socket,
                    &ServerMsg::Welcome {
                        room_id: room_id.clone(),
                        you: you.clone(),
                        members,
                        game_started: false,
                    },
                )
                .await;
                return Some(Attachment { room_id, you, rx });
            }
            ClientMsg::Join { token, room_id } => {
                let Some(you) = state::resolve_token(state, &token).await else {
                    send_ws(socket, &ServerMsg::Error("Invalid token".into())).await;
                    continue;
                };
                match state::join_room(state, &room_id, &you).await {
                    Ok((members, game_started, rx)) => {
                        send_ws(
                            socket,
                            &ServerMsg::Welcome {
                                room_id: room_id.clone(),
                                you: you.clone(),
                                members,
                                game_started,
                            },
                        )
                        .await;
                        return Some(Attachment { room_id, you, rx });
                    }
                    Err(e) => {
                        send_ws(socket, &ServerMsg::Error(e)).await;
                        continue;
                    }
                }
            }
            ClientMsg::Ping => send_ws(socket, &ServerMsg::Pong).await,
            ClientMsg::Publish(_) | ClientMsg::RequestMembers => {
                send_ws(
                    socket,
                    &ServerMsg::Error("Not attached to a room; send Create or Join first".into()),
                )
                .await;
            }
        }
    }
}

async fn process_client_msg(
    state: &AppState,
    socket: &mut WebSocket,
    room_id: &str,
    cm: ClientMsg,
) {
    match cm {
        ClientMsg::Publish(event) => {
            if event.is_membership_event() {
                send_ws(
                    socket,
                    &ServerMsg::Error("Membership events are server-emitted only".into()),
                )
                .await;
                return;
            }
            if let Err(e) = state::publish_event(state, room_id, event).await {
                send_ws(socket, &ServerMsg::Error(e)).await;
            }
        }
        ClientMsg::RequestMembers => {
            let members = state::room_members(state, room_id).await.unwrap_or_default();
            send_ws(socket, &ServerMsg::Members(members)).await;
        }
        ClientMsg::Ping => send_ws(socket, &ServerMsg::Pong).await,
        ClientMsg::Create { .. } | ClientMsg::Join { .. } => {
            send_ws(
                socket,
                &ServerMsg::Error("Already attached to a room".into()),
            )
            .await;
        }
    }
}

async fn send_ws(socket: &mut WebSocket, msg: &ServerMsg) {
    match serde_json::to_string(msg) {
        Ok(txt) => {
            let _ = socket.send(Message::Text(txt)).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize ServerMsg for websocket send");
        }
    }
}
