use anyhow::{bail, Context};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use tricktable_shared::{ClientMsg, PlayerPublic, RoomEvent, ServerMsg};

pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// An established room attachment: the split socket plus the Welcome payload.
pub struct Attached {
    pub writer: WsWriter,
    pub reader: WsReader,
    pub room_id: String,
    pub you: PlayerPublic,
    pub members: Vec<PlayerPublic>,
    pub game_started: bool,
}

/// Try to build a websocket URL from a base string (like "localhost:3001" or "http://host:3001")
pub fn build_ws_url(base: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(base).or_else(|_| Url::parse(&format!("http://{}", base)))?;

    match url.scheme() {
        "http" => url.set_scheme("ws").ok(),
        "https" => url.set_scheme("wss").ok(),
        "ws" | "wss" => Some(()),
        _ => None,
    }
    .ok_or_else(|| anyhow::anyhow!("Unsupported URL scheme: {}", url.scheme()))?;

    // Force path to /ws
    if url.path() != "/ws" {
        url.set_path("/ws");
    }
    Ok(url)
}

/// Connect over websocket, send the attach message (Create or Join) and wait
/// for the server's Welcome.
pub async fn attach(server: &str, attach_msg: ClientMsg) -> anyhow::Result<Attached> {
    let ws_url = build_ws_url(server)?;
    let (ws_stream, _resp) = tokio_tungstenite::connect_async(ws_url.as_str())
        .await
        .with_context(|| format!("connecting to {}", ws_url))?;
    let (mut writer, mut reader) = ws_stream.split();

    let txt = serde_json::to_string(&attach_msg)?;
    writer.send(Message::Text(txt)).await?;

    while let Some(msg) = reader.next().await {
        match msg? {
            Message::Text(txt) => match serde_json::from_str::<ServerMsg>(&txt) {
                Ok(ServerMsg::Welcome {
                    room_id,
                    you,
                    members,
                    game_started,
                }) => {
                    return Ok(Attached {
                        writer,
                        reader,
                        room_id,
                        you,
                        members,
                        game_started,
                    })
                }
                Ok(ServerMsg::Error(e)) => bail!("server rejected attach: {}", e),
                Ok(_) => continue,
                Err(_) => continue,
            },
            Message::Close(_) => break,
            _ => continue,
        }
    }
    bail!("connection closed before Welcome")
}

pub async fn publish(writer: &mut WsWriter, event: RoomEvent) -> anyhow::Result<()> {
    let txt = serde_json::to_string(&ClientMsg::Publish(event))?;
    writer.send(Message::Text(txt)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_from_http_base() {
        let url = build_ws_url("http://localhost:3001").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:3001/ws");
    }

    #[test]
    fn ws_url_upgrades_scheme_and_forces_path() {
        let url = build_ws_url("https://table.example.com/api").unwrap();
        assert_eq!(url.as_str(), "wss://table.example.com/ws");
    }

    #[test]
    fn ws_url_rejects_odd_schemes() {
        assert!(build_ws_url("ftp://host").is_err());
    }
}
