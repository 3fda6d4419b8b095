//! Request handler module
//!
//! Request dispatch, static file serving, directory listings and the
//! response middleware wrapped around them.

pub mod listing;
pub mod middleware;
pub mod router;
pub mod static_files;

// Re-export main entry points
pub use middleware::DevHeaders;
pub use router::handle_request;
