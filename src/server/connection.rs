// Connection handling module
// Serves one accepted TCP connection through hyper

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::preflight::{self, Preflight, Rewind};
use crate::config::AppState;
use crate::handler::{self, DevHeaders};
use crate::http::request_head::HeadError;
use crate::logger;

/// Time allowed for a client to send its request head
const HEAD_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Time spent discarding unread input after a rejection, so closing the
/// socket does not reset the connection before the client reads the page
const REJECT_LINGER: Duration = Duration::from_secs(1);

/// Handle a single connection in a spawned task.
///
/// The request head is checked first; malformed heads get an error page
/// from `preflight`. Everything else goes to hyper with the request handler
/// wrapped in `DevHeaders`, so every response written on this connection
/// carries the development headers.
pub fn handle_connection(mut stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let head = match timeout(HEAD_READ_TIMEOUT, preflight::read_request_head(&mut stream)).await {
            Ok(Ok(head)) => head,
            // Resets and idle clients are routine
            Ok(Err(_)) | Err(_) => return,
        };

        let buffered = match head {
            Preflight::Closed => return,
            Preflight::Rejected(err) => {
                reject(stream, peer_addr, &err, &state).await;
                return;
            }
            Preflight::Accepted(buffered) => buffered,
        };

        let io = TokioIo::new(Rewind::new(buffered, stream));

        let mut builder = http1::Builder::new();
        // One request per connection, so every request passes the head check
        builder.keep_alive(false);

        let service = DevHeaders::new(service_fn(move |req: Request<Incoming>| {
            handler::handle_request(req, Arc::clone(&state), peer_addr)
        }));

        if let Err(err) = builder.serve_connection(io, service).await {
            if !err.is_incomplete_message() {
                logger::log_connection_error(&err);
            }
        }
    });
}

async fn reject(mut stream: TcpStream, peer_addr: SocketAddr, err: &HeadError, state: &AppState) {
    logger::log_warning(&format!(
        "Rejected request from {peer_addr}: {} {}",
        err.status().as_u16(),
        err.message()
    ));

    if let Err(e) = preflight::write_rejection(&mut stream, err, &state.config.http.server_name).await {
        logger::log_warning(&format!("Failed to send error response to {peer_addr}: {e}"));
        return;
    }
    let _ = timeout(REJECT_LINGER, tokio::io::copy(&mut stream, &mut tokio::io::sink())).await;
}
