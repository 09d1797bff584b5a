//! Signaling relay for huddle calls. Media never passes through here: the
//! server hands out connection ids, keeps per-room call membership and
//! forwards offers, answers and ICE candidates between members.

pub mod room;
pub mod signaling;

pub use room::*;
pub use signaling::*;

use axum::Router;
use axum::routing::get;
use huddle_core::IceServerConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Builds the `/ws` router with fresh room and peer registries.
pub fn router(ice_servers: Vec<IceServerConfig>) -> Router {
    let signaling = SignalingService::new(ice_servers);
    let rooms = RoomManager::new(Arc::new(signaling.clone()));

    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(ServerState { signaling, rooms })
}

pub async fn serve(listener: TcpListener, ice_servers: Vec<IceServerConfig>) -> anyhow::Result<()> {
    info!("Signaling server listening on ws://{}/ws", listener.local_addr()?);
    axum::serve(listener, router(ice_servers)).await?;
    Ok(())
}
