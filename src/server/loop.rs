// Server loop module
// Accepts connections until shutdown is requested

use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::handle_connection;
use super::signal::Shutdown;
use crate::config::AppState;
use crate::logger;

/// Accept loop
///
/// Each connection is served in its own task. When `shutdown` fires the loop
/// stops and the listener is closed; connections already accepted are not
/// waited for.
pub async fn run_accept_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: &Shutdown,
) -> std::io::Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_warning(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.wait() => break,
        }
    }

    drop(listener);
    Ok(())
}
