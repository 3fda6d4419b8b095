//! devserve: a local development static file server
//!
//! Serves the current directory over HTTP/1.1 and marks every response as
//! CORS-permissive and uncacheable.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use server::{Server, Shutdown};
