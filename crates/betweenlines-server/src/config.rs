//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use betweenlines_shared::constants::{DEFAULT_HTTP_PORT, MAX_AUDIO_SIZE};

/// Which document + blob backend the letter service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// SQLite documents and audio files on disk.
    Durable,
    /// Everything in process memory; lost on restart.
    Local,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "durable" | "sqlite" => Ok(Self::Durable),
            "local" | "memory" => Ok(Self::Local),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Origin this deployment is reachable at; shareable links and audio
    /// URLs are built from it.
    /// Env: `PUBLIC_ORIGIN`
    /// Default: `http://localhost:8080`
    pub public_origin: String,

    /// Env: `STORE_BACKEND` (`durable` / `local`)
    /// Default: `durable`
    pub backend: StoreBackend,

    /// SQLite file used by the durable backend.
    /// Env: `DATABASE_PATH`
    /// Default: `./betweenlines.db`
    pub database_path: PathBuf,

    /// Directory where uploaded audio is stored by the durable backend.
    /// Env: `BLOB_STORAGE_PATH`
    /// Default: `./blobs`
    pub blob_storage_path: PathBuf,

    /// Maximum audio attachment size in bytes.
    /// Env: `MAX_AUDIO_SIZE`
    /// Default: 20 MiB
    pub max_audio_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            public_origin: format!("http://localhost:{DEFAULT_HTTP_PORT}"),
            backend: StoreBackend::Durable,
            database_path: PathBuf::from("./betweenlines.db"),
            blob_storage_path: PathBuf::from("./blobs"),
            max_audio_size: MAX_AUDIO_SIZE,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(origin) = lookup("PUBLIC_ORIGIN") {
            let origin = origin.trim().trim_end_matches('/');
            if !origin.is_empty() {
                config.public_origin = origin.to_string();
            }
        }

        if let Some(backend) = lookup("STORE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => config.backend = parsed,
                Err(e) => tracing::warn!(error = %e, "Invalid STORE_BACKEND, using default"),
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("BLOB_STORAGE_PATH") {
            config.blob_storage_path = PathBuf::from(path);
        }

        if let Some(val) = lookup("MAX_AUDIO_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_audio_size = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_AUDIO_SIZE, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.public_origin, "http://localhost:8080");
        assert_eq!(config.backend, StoreBackend::Durable);
        assert_eq!(config.max_audio_size, 20 * 1024 * 1024);
    }

    #[test]
    fn test_env_overrides() {
        let config = from_pairs(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("PUBLIC_ORIGIN", "https://letters.example/"),
            ("STORE_BACKEND", "local"),
            ("DATABASE_PATH", "/var/lib/bl/letters.db"),
            ("BLOB_STORAGE_PATH", "/var/lib/bl/blobs"),
            ("MAX_AUDIO_SIZE", "1024"),
        ]);

        assert_eq!(config.http_addr, ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.public_origin, "https://letters.example");
        assert_eq!(config.backend, StoreBackend::Local);
        assert_eq!(config.database_path, PathBuf::from("/var/lib/bl/letters.db"));
        assert_eq!(config.blob_storage_path, PathBuf::from("/var/lib/bl/blobs"));
        assert_eq!(config.max_audio_size, 1024);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_pairs(&[
            ("HTTP_ADDR", "not-an-addr"),
            ("STORE_BACKEND", "cloud"),
            ("MAX_AUDIO_SIZE", "0"),
        ]);
        let default = ServerConfig::default();

        assert_eq!(config.http_addr, default.http_addr);
        assert_eq!(config.backend, default.backend);
        assert_eq!(config.max_audio_size, default.max_audio_size);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("Durable".parse::<StoreBackend>(), Ok(StoreBackend::Durable));
        assert_eq!(" memory ".parse::<StoreBackend>(), Ok(StoreBackend::Local));
        assert!("s3".parse::<StoreBackend>().is_err());
    }
}
