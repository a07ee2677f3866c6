//! WebSocket client session management.

use std::sync::Arc;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};
use tunebox_server::infrastructure::dto::websocket::ServerMessage;

use crate::{
    command::{Input, parse_input},
    domain::{SessionState, connect_url},
    error::ClientError,
    formatter::MessageFormatter,
    runner::ClientConfig,
    ui::print_above_prompt,
};

/// Run one WebSocket session until the user quits or the connection drops.
///
/// `Ok(())` means the user ended the session; any error is a candidate for
/// reconnecting.
pub async fn run_client_session(
    config: &ClientConfig,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let url = connect_url(
        &config.url,
        &config.username,
        config.profile_color.as_deref(),
    )?;

    let (ws_stream, _response) = connect_async(&url).await.map_err(|e| match e {
        tungstenite::Error::Url(_) => ClientError::InvalidUrl(config.url.clone()),
        other => ClientError::ConnectionError(other.to_string()),
    })?;

    tracing::info!("Connected to Tunebox server!");

    let (mut write, mut read) = ws_stream.split();
    let state = Arc::new(Mutex::new(SessionState::new()));

    let state_for_read = state.clone();
    let username = config.username.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            let output = match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(message) => {
                            if let ServerMessage::Reply(reply) = &message {
                                state_for_read.lock().await.on_reply(reply);
                            }
                            MessageFormatter::format_server_message(&message, &username)
                        }
                        Err(e) => {
                            tracing::debug!("Unrecognized frame: {}", e);
                            MessageFormatter::format_raw_message(text.as_str())
                        }
                    }
                }
                Ok(Message::Binary(data)) => MessageFormatter::format_binary_message(data.len()),
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => continue,
            };
            print_above_prompt(&output, &username);
        }
    });

    // If any one side completes, stop the other
    tokio::select! {
        _ = &mut read_task => {
            Err(ClientError::ConnectionError("Connection lost".to_string()))
        }
        result = write_loop(&mut write, input_rx, &state, &config.username) => {
            read_task.abort();
            result
        }
    }
}

/// Turn prompt lines into requests until the input ends or the user quits
async fn write_loop<W>(
    write: &mut W,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    state: &Mutex<SessionState>,
    username: &str,
) -> Result<(), ClientError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    while let Some(line) = input_rx.recv().await {
        let input = {
            let state = state.lock().await;
            parse_input(&line, state.current_room())
        };

        let request = match input {
            Ok(Input::Request(op)) => state.lock().await.prepare(op),
            Ok(Input::Help) => {
                print_above_prompt(&MessageFormatter::format_help(), username);
                continue;
            }
            Ok(Input::Quit) => break,
            Err(e) => {
                print_above_prompt(&format!("\n! {}\n", e), username);
                continue;
            }
        };

        let json = match serde_json::to_string(&request) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize request: {}", e);
                continue;
            }
        };
        tracing::debug!("Sending {}", json);

        if let Err(e) = write.send(Message::Text(json.into())).await {
            tracing::warn!("Failed to send request: {}", e);
            return Err(ClientError::ConnectionError(e.to_string()));
        }
    }

    write.send(Message::Close(None)).await.ok();
    Ok(())
}
