// ============================
// tripmate-backend-lib/src/ws_router.rs
// ============================
//! Router assembly and WebSocket connection handling.
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use tripmate_common::ClientEvent;

use crate::handlers::{live, trips};
use crate::metrics::{WS_ACTIVE, WS_CONNECTION, WS_DISCONNECTION};
use crate::store::Store;
use crate::AppState;

/// Create the full application router: the one-shot HTTP surface plus the
/// `/ws` event channel, with CORS wide open the way the web client expects.
pub fn create_router<S: Store + Send + Sync + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .merge(trips::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Handler for WebSocket connections
async fn ws_handler<S: Store + Send + Sync + 'static>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection<S: Store + Send + Sync + 'static>(
    socket: WebSocket,
    state: Arc<AppState<S>>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Register this connection's outbound channel; everything sent through
    // the registry funnels into the send task below.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let conn_id = state.registry.register(tx);

    counter!(WS_CONNECTION).increment(1);
    gauge!(WS_ACTIVE).increment(1.0);
    tracing::debug!(%conn_id, "connection registered");

    // Forward server events to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize server event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Process incoming frames in arrival order for this connection
    while let Some(Ok(message)) = ws_rx.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    if let Err(e) = live::handle_event(&state, conn_id, event).await {
                        // swallowed: the client sees a missing event, not an error
                        tracing::warn!(%conn_id, error = %e, "event handler failed");
                    }
                }
                Err(e) => {
                    // unrecognized frames are dropped, not answered
                    tracing::warn!(%conn_id, error = %e, "dropping unrecognized frame");
                }
            },
            Message::Close(_) => break,
            _ => {} // Ignore other message types for now
        }
    }

    // Cleanup: the connection's flags leave the aggregate with it
    state.registry.unregister(conn_id);
    tracing::debug!(%conn_id, "connection deregistered");

    counter!(WS_DISCONNECTION).increment(1);
    gauge!(WS_ACTIVE).decrement(1.0);

    send_task.abort();
}
