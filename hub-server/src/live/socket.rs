//! Socket.IO channel
//!
//! Clients connect to the default namespace with `auth: { token }`. The
//! token goes through the same JWT and session checks as the REST API; the
//! socket then joins the single room of its principal. Sockets with a
//! missing or invalid token receive `auth_error` and are disconnected.

use serde::Deserialize;
use shared::live::room;
use shared::models::ActorKind;
use socketioxide::SocketIo;
use socketioxide::extract::{SocketRef, TryData};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::LiveHub;
use crate::auth::{CurrentUser, authenticate_token};
use crate::core::ServerState;

/// Handshake payload
#[derive(Debug, Deserialize)]
pub struct SocketAuth {
    pub token: String,
}

/// Room a principal listens on
pub fn room_for(user: &CurrentUser) -> Option<String> {
    match user.kind {
        ActorKind::Admin => Some(room::ADMIN.to_string()),
        ActorKind::Staff => user.restaurant_id.map(room::restaurant),
        ActorKind::Customer => Some(room::customer(user.id)),
    }
}

fn reject(socket: &SocketRef, reason: &str) {
    crate::security_log!("WARN", "socket_auth_failed", socket_id = socket.id.to_string(), reason = reason.to_string());
    let _ = socket.emit("auth_error", &serde_json::json!({ "message": reason }));
    let _ = socket.clone().disconnect();
}

/// Register the default namespace handler
pub fn register(io: &SocketIo, state: ServerState) {
    io.ns("/", move |socket: SocketRef, TryData(auth): TryData<SocketAuth>| {
        let state = state.clone();
        async move {
            let auth = match auth {
                Ok(auth) => auth,
                Err(e) => {
                    tracing::debug!(error = %e, "Socket handshake without token");
                    reject(&socket, "Missing token");
                    return;
                }
            };

            let user = match authenticate_token(&state, &auth.token).await {
                Ok(user) => user,
                Err(e) => {
                    reject(&socket, &e.message);
                    return;
                }
            };

            let Some(room) = room_for(&user) else {
                reject(&socket, "No room for principal");
                return;
            };

            tracing::info!(
                socket_id = %socket.id,
                actor = %user.kind,
                actor_id = user.id,
                room = %room,
                "Live socket connected"
            );
            socket.join(room);

            socket.on_disconnect(|socket: SocketRef| async move {
                tracing::debug!(socket_id = %socket.id, "Live socket disconnected");
            });
        }
    });
}

/// Relay hub events to their rooms until shutdown
pub async fn forward(io: SocketIo, hub: LiveHub, shutdown: CancellationToken) {
    let mut rx = hub.subscribe();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Live forwarder stopped");
                return;
            }
            received = rx.recv() => match received {
                Ok(event) => {
                    let name = event.event.as_str();
                    if let Err(e) = io.to(event.room.clone()).emit(name, &event.payload).await {
                        tracing::warn!(room = %event.room, event = name, error = %e, "Live emit failed");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Live forwarder lagged behind, events dropped");
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Live hub closed");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(kind: ActorKind, restaurant_id: Option<i64>) -> CurrentUser {
        CurrentUser {
            id: 5,
            name: "x".into(),
            kind,
            restaurant_id,
            role: "r".into(),
            permissions: vec![],
            session_id: "s".into(),
        }
    }

    #[test]
    fn each_principal_gets_one_room() {
        assert_eq!(room_for(&user(ActorKind::Admin, None)).as_deref(), Some("admin"));
        assert_eq!(
            room_for(&user(ActorKind::Staff, Some(12))).as_deref(),
            Some("restaurant:12")
        );
        assert_eq!(room_for(&user(ActorKind::Staff, None)), None);
        assert_eq!(
            room_for(&user(ActorKind::Customer, None)).as_deref(),
            Some("customer:5")
        );
    }
}
