use crate::handler::{self, BotState};
use crate::models::{self, intent, op};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, error, info, warn};

const INTENTS: u32 = intent::GUILDS
    | intent::GUILD_MEMBERS
    | intent::GUILD_MESSAGES
    | intent::DIRECT_MESSAGES
    | intent::MESSAGE_CONTENT;

pub async fn run(token: String, state: Arc<BotState>) {
    loop {
        if let Err(e) = connect_and_run(&token, Arc::clone(&state)).await {
            error!("Gateway error: {:?}. Reconnecting in 5s…", e);
        } else {
            info!("Gateway asked us to reconnect. Reconnecting in 5s…");
        }
        sleep(Duration::from_secs(5)).await;
    }
}

/// One gateway session. Returns `Ok` when the gateway requests a reconnect.
async fn connect_and_run(token: &str, state: Arc<BotState>) -> anyhow::Result<()> {
    let mut gw_url = state.rest.get_gateway_url().await?;
    if !gw_url.ends_with('/') {
        gw_url.push('/');
    }
    let ws_url = format!("{}?v=10&encoding=json", gw_url);
    info!("Connecting to Discord Gateway: {}...", ws_url);

    let mut request = ws_url.into_client_request()?;
    request
        .headers_mut()
        .insert("User-Agent", "DiscordBot (https://github.com/rimuru, 1.0)".parse()?);

    let (ws_stream, _) = connect_async(request).await?;
    info!("✅ WebSocket handshake complete");

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    let hello_msg = ws_stream
        .next()
        .await
        .ok_or_else(|| anyhow::anyhow!("Stream closed before HELLO"))??;

    let hello_payload: models::Payload = serde_json::from_str(hello_msg.to_text()?)?;
    let heartbeat_interval = hello_payload
        .d
        .and_then(|d| d.get("heartbeat_interval").and_then(|v| v.as_u64()))
        .ok_or_else(|| anyhow::anyhow!("Missing heartbeat_interval"))?;

    info!("HELLO received — heartbeat interval: {}ms", heartbeat_interval);

    // last sequence number seen, 0 until the first dispatch
    let sequence = Arc::new(AtomicU64::new(0));

    let mut interval_timer = tokio::time::interval(Duration::from_millis(heartbeat_interval));
    let (hb_tx, mut hb_rx) = tokio::sync::mpsc::unbounded_channel::<Message>();
    let hb_sequence = Arc::clone(&sequence);
    let heartbeat = tokio::spawn(async move {
        loop {
            interval_timer.tick().await;
            let seq = match hb_sequence.load(Ordering::Relaxed) {
                0 => json!(null),
                s => json!(s),
            };
            let hb = json!({ "op": op::HEARTBEAT, "d": seq });
            if hb_tx.send(Message::Text(hb.to_string().into())).is_err() {
                break;
            }
        }
    });

    let identify = json!({
        "op": op::IDENTIFY,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": { "os": std::env::consts::OS, "browser": "rimuru-devtools", "device": "rimuru-devtools" }
        }
    });
    ws_sink.send(Message::Text(identify.to_string().into())).await?;
    info!("IDENTIFY sent (intents={})", INTENTS);

    let result = loop {
        tokio::select! {
            Some(hb_msg) = hb_rx.recv() => {
                if let Err(e) = ws_sink.send(hb_msg).await {
                    break Err(e.into());
                }
            }
            next = ws_stream.next() => {
                let msg = match next {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => break Err(e.into()),
                    None => break Err(anyhow::anyhow!("Gateway stream closed")),
                };
                if msg.is_close() {
                    break Err(anyhow::anyhow!("Gateway closed the connection: {:?}", msg));
                }
                if !msg.is_text() {
                    continue;
                }
                let payload: models::Payload = match serde_json::from_str(msg.to_text()?) {
                    Ok(p) => p,
                    Err(e) => { error!("Parse error: {:?}", e); continue; }
                };
                if let Some(s) = payload.s {
                    sequence.store(s, Ordering::Relaxed);
                }

                match payload.op {
                    op::DISPATCH => dispatch(&state, payload),
                    op::HEARTBEAT_ACK => debug!("Heartbeat ACK"),
                    op::RECONNECT => break Ok(()),
                    op::INVALID_SESSION => {
                        warn!("Session invalidated");
                        break Ok(());
                    }
                    other => debug!("Ignoring opcode {}", other),
                }
            }
        }
    };

    heartbeat.abort();
    result
}

fn dispatch(state: &Arc<BotState>, payload: models::Payload) {
    let Some(t) = payload.t.as_deref() else {
        return;
    };
    let d = payload.d.unwrap_or_else(|| json!({}));
    let state = Arc::clone(state);

    match t {
        "READY" => match serde_json::from_value::<models::ReadyData>(d) {
            Ok(ready) => {
                // before any GUILD_CREATE task can run
                state.expect_guilds(ready.guilds.iter().map(|g| g.id));
                tokio::spawn(async move { handler::handle_ready(state, ready).await });
            }
            Err(e) => error!("Bad READY payload: {:?}", e),
        },
        "GUILD_CREATE" => match serde_json::from_value::<models::Guild>(d) {
            Ok(guild) => {
                tokio::spawn(async move { handler::handle_guild_create(state, guild).await });
            }
            Err(e) => error!("Bad GUILD_CREATE payload: {:?}", e),
        },
        "GUILD_DELETE" => {
            tokio::spawn(async move { handler::handle_guild_delete(state, d).await });
        }
        "MESSAGE_CREATE" => match serde_json::from_value::<models::Message>(d) {
            Ok(msg) => {
                tokio::spawn(async move { handler::handle_message(state, msg).await });
            }
            Err(e) => error!("Bad MESSAGE_CREATE payload: {:?}", e),
        },
        "INTERACTION_CREATE" => match serde_json::from_value::<models::Interaction>(d) {
            Ok(interaction) => {
                tokio::spawn(async move { handler::handle_interaction(state, interaction).await });
            }
            Err(e) => error!("Bad INTERACTION_CREATE payload: {:?}", e),
        },
        _ => debug!("Dispatching ignored event: {}", t),
    }
}
