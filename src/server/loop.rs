// Server loop module
// Accepts connections until shutdown is requested

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;

/// Accept loop; must run inside a `LocalSet`
///
/// Returns once `shutdown` is notified. Connections already being served keep
/// running on the local set until the runtime stops.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => tracing::error!(error = %e, "failed to accept connection"),
                }
            }

            () = shutdown.notified() => {
                tracing::info!(addr = %listener.local_addr()?, "shutting down");
                return Ok(());
            }
        }
    }
}
