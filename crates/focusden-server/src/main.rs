//! Focusden Signaling Server
//!
//! Full-mesh WebRTC signaling for lobby rooms. Clients connect to
//! `ws://host:port/signaling/{room_id}`; everything after signaling
//! happens peer-to-peer over data channels.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use matchbox_signaling::SignalingServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> () {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("FOCUSDEN_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let server = SignalingServer::full_mesh_builder(addr)
        .cors()
        .trace()
        .on_peer_connected(|peer_id| {
            tracing::info!("Peer connected: {peer_id}");
        })
        .on_peer_disconnected(|peer_id| {
            tracing::info!("Peer disconnected: {peer_id}");
        })
        .build_with(|signaling_router| {
            Router::new()
                .route("/healthz", get(|| async { "ok" }))
                .nest("/signaling", signaling_router)
        });

    tracing::info!("Server listening on {addr}");
    tracing::info!("  - Signaling: ws://{addr}/signaling/{{room_id}}");

    server.serve().await.unwrap();
}
