use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Runtime configuration for the wiki server
pub struct Config {
    pub base_dir: PathBuf,
    pub static_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("wiki"),
            static_dir: PathBuf::from("static"),
            host: "0.0.0.0".to_string(),
            port: 5004,
        }
    }

    /// Defaults with environment overrides applied: `LAMINA_DIR`,
    /// `LAMINA_STATIC_DIR`, `LAMINA_HOST`, `LAMINA_PORT`.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(dir) = std::env::var("LAMINA_DIR") {
            config.base_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("LAMINA_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Ok(host) = std::env::var("LAMINA_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("LAMINA_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        config
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        let ip = self
            .host
            .parse()
            .unwrap_or_else(|_| IpAddr::from([0, 0, 0, 0]));
        SocketAddr::new(ip, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
