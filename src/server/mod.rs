// Server module entry point
// Binding, accept loop, connection serving and signal handling

pub mod connection;
pub mod listener;
pub mod preflight;
pub mod signal;

// Rust does not allow `loop` as a module name (keyword), so use server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use signal::{start_signal_handler, Shutdown};

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AppState, Config};

/// A bound static file server
///
/// Built from an explicit `Config`; nothing is shared through globals.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: Arc<Shutdown>,
}

impl Server {
    /// Resolve the configured host and bind the listener
    ///
    /// Bind failures (address in use, permission denied) are returned as-is.
    pub async fn bind(config: &Config) -> io::Result<Self> {
        let addr = listener::resolve(&config.server.host, config.server.port).await?;
        let listener = listener::create_listener(addr)?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            state: Arc::new(AppState::new(config)),
            shutdown: Arc::new(Shutdown::new()),
        })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL shown in the startup banner: configured host, bound port
    pub fn url(&self) -> String {
        format!(
            "http://{}:{}",
            self.state.config.server.host,
            self.local_addr.port()
        )
    }

    /// Handle used to stop `run`
    pub fn shutdown_handle(&self) -> Arc<Shutdown> {
        Arc::clone(&self.shutdown)
    }

    /// Serve until the shutdown handle is triggered
    pub async fn run(self) -> io::Result<()> {
        server_loop::run_accept_loop(self.listener, self.state, &self.shutdown).await
    }
}
