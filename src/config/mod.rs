// Configuration module entry point
// Builds the fixed server configuration and the shared runtime state

mod state;
mod types;

pub use state::AppState;
pub use types::{Config, FilesConfig, HttpConfig, LoggingConfig, ServerConfig};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;

impl Config {
    /// Load the default configuration (`localhost:8000`, current directory)
    ///
    /// No file or environment source is consulted.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::with_address(DEFAULT_HOST, DEFAULT_PORT)
    }

    /// Build a configuration listening on `host:port`, all other values defaulted
    pub fn with_address(host: &str, port: u16) -> Result<Self, config::ConfigError> {
        defaults()?
            .set_override("server.host", host)?
            .set_override("server.port", i64::from(port))?
            .build()?
            .try_deserialize()
    }

    /// Build a configuration serving `root` on `host:port`
    pub fn with_root(host: &str, port: u16, root: &str) -> Result<Self, config::ConfigError> {
        defaults()?
            .set_override("server.host", host)?
            .set_override("server.port", i64::from(port))?
            .set_override("files.root", root)?
            .build()?
            .try_deserialize()
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
{
    config::Config::builder()
        .set_default("server.host", DEFAULT_HOST)?
        .set_default("server.port", i64::from(DEFAULT_PORT))?
        .set_default("files.root", ".")?
        .set_default("files.index_files", vec!["index.html", "index.htm"])?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "common")?
        .set_default(
            "http.server_name",
            concat!("devserve/", env!("CARGO_PKG_VERSION")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let cfg = Config::load().unwrap();
        assert_eq!(cfg.server.host, "localhost");
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.files.root, ".");
        assert_eq!(cfg.files.index_files, vec!["index.html", "index.htm"]);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "common");
        assert!(cfg.http.server_name.starts_with("devserve/"));
    }

    #[test]
    fn test_with_address_overrides() {
        let cfg = Config::with_address("127.0.0.1", 0).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 0);
        assert_eq!(cfg.files.root, ".");
    }

    #[test]
    fn test_with_root() {
        let cfg = Config::with_root("127.0.0.1", 9000, "/srv/www").unwrap();
        assert_eq!(cfg.files.root, "/srv/www");
        assert_eq!(cfg.server.port, 9000);
    }
}
