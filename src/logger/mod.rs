//! Logger module
//!
//! Console output for the server:
//! - Startup and shutdown banners (stdout)
//! - One access line per request (stderr)
//! - Errors and warnings (stderr)

mod format;

pub use format::AccessLogEntry;

pub fn log_server_start(url: &str) {
    println!("Starting server at {url}");
}

pub fn log_server_stopped() {
    println!("Server stopped.");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    eprintln!("{}", entry.format(format));
}
