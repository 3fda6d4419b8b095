// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
}

/// Listening endpoint configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Served directory configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FilesConfig {
    /// Directory requests are resolved against
    pub root: String,
    /// Files served in place of a directory listing, tried in order
    pub index_files: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (`common` or `combined`)
    pub access_log_format: String,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Value of the `Server` response header
    pub server_name: String,
}
