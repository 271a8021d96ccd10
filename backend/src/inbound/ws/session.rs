//! Per-connection WebSocket handler.
//!
//! Keeps framing and heartbeats at the edge. The public contract pings
//! every 5s and considers a connection idle after 10s without client
//! traffic; tests shorten these intervals to speed up feedback. Clients
//! are not required to send application messages, so inbound frames only
//! refresh the heartbeat clock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::warn;

use super::hub::{ConnectionId, NotificationHub};

/// Time between heartbeats to the client.
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client.
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

enum SessionEnd {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

/// Drive one subscriber connection until it ends, then drop it from the
/// hub registry on every exit path.
pub(super) async fn handle_ws_session(
    hub: Arc<NotificationHub>,
    connection_id: ConnectionId,
    session: Session,
    stream: MessageStream,
) {
    let end = run(session.clone(), stream).await;
    hub.unsubscribe(connection_id);
    log_shutdown_reason(&end);
    close_session_if_needed(session, close_action_for(end)).await;
}

async fn run(mut session: Session, mut stream: MessageStream) -> SessionEnd {
    let mut last_heartbeat = Instant::now();
    let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

    loop {
        let result = tokio::select! {
            _ = heartbeat.tick() => {
                handle_heartbeat_tick(&mut session, &last_heartbeat).await
            }
            message = stream.recv() => {
                handle_stream_message(&mut session, &mut last_heartbeat, message).await
            }
        };

        if let Err(end) = result {
            return end;
        }
    }
}

async fn handle_heartbeat_tick(
    session: &mut Session,
    last_heartbeat: &Instant,
) -> Result<(), SessionEnd> {
    if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionEnd::HeartbeatTimeout);
    }
    session.ping(b"").await.map_err(SessionEnd::Network)
}

async fn handle_stream_message(
    session: &mut Session,
    last_heartbeat: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), SessionEnd> {
    let Some(message) = message else {
        return Err(SessionEnd::StreamClosed);
    };

    match message {
        Ok(Message::Ping(payload)) => {
            *last_heartbeat = Instant::now();
            session.pong(&payload).await.map_err(SessionEnd::Network)
        }
        Ok(Message::Close(reason)) => Err(SessionEnd::ClientClosed(reason)),
        Ok(_) => {
            // No client-to-server application messages exist; anything
            // else only proves the peer is alive.
            *last_heartbeat = Instant::now();
            Ok(())
        }
        Err(error) => Err(SessionEnd::Protocol(error)),
    }
}

fn log_shutdown_reason(end: &SessionEnd) {
    match end {
        SessionEnd::HeartbeatTimeout => {
            warn!("WebSocket heartbeat timeout; closing connection");
        }
        SessionEnd::Protocol(error) => {
            warn!(error = %error, "WebSocket protocol error");
        }
        SessionEnd::Network(error) => {
            warn!(error = %error, "WebSocket send failed; closing connection");
        }
        SessionEnd::ClientClosed(_) | SessionEnd::StreamClosed => {}
    }
}

fn close_action_for(end: SessionEnd) -> CloseAction {
    match end {
        SessionEnd::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionEnd::Protocol(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionEnd::ClientClosed(reason) => CloseAction::Close(reason),
        SessionEnd::StreamClosed | SessionEnd::Network(_) => CloseAction::None,
    }
}

async fn close_session_if_needed(session: Session, close_action: CloseAction) {
    if let CloseAction::Close(reason) = close_action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "Failed to close WebSocket session");
        }
    }
}
