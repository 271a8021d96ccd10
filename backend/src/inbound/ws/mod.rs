//! WebSocket inbound adapter bridging domain events to client payloads.
//!
//! Responsibilities:
//! - upgrade `/ws` requests and register the connection with the hub
//! - keep framing, heartbeats, and the subscriber registry at the edge
//! - expose the hub to the domain through the event publisher port

use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::error;

mod session;

pub mod hub;
pub mod messages;

pub use hub::{ConnectionId, EventSink, NotificationHub, SinkClosed, WsHub};

/// Handle WebSocket upgrade for the `/ws` endpoint.
///
/// The connection is registered with the hub before the session task is
/// spawned, so a status change committed immediately after the upgrade
/// already reaches this subscriber.
#[get("/ws")]
pub async fn ws_entry(
    hub: web::Data<NotificationHub>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let (response, session, message_stream) = actix_ws::handle(&req, stream).map_err(|err| {
        error!(error = %err, "WebSocket upgrade failed");
        err
    })?;

    let connection_id = hub.subscribe(session.clone());
    actix_web::rt::spawn(session::handle_ws_session(
        hub.into_inner(),
        connection_id,
        session,
        message_stream,
    ));

    Ok(response)
}
