//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

use timeblock_core::GeoPoint;

/// Coordinates used for weather lookups when no per-event geocoding is
/// available (Sydney CBD).
pub const DEFAULT_FORECAST_POINT: GeoPoint = GeoPoint {
    latitude: -33.865_143,
    longitude: 151.209_900,
};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the Unix socket.
    pub socket_path: PathBuf,

    /// Connection timeout.
    pub connection_timeout: Duration,

    /// Maximum concurrent connections.
    pub max_connections: usize,

    /// Whether to remove stale socket on startup.
    pub cleanup_stale_socket: bool,

    /// Per-lookup timeout for holiday and weather enrichment.
    pub enrichment_timeout: Duration,

    /// Coordinates handed to the weather source for event forecasts.
    pub forecast_point: GeoPoint,

    /// ISO country code used for public holiday lookups.
    pub holiday_country: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            connection_timeout: Duration::from_secs(30),
            max_connections: 100,
            cleanup_stale_socket: true,
            enrichment_timeout: Duration::from_secs(5),
            forecast_point: DEFAULT_FORECAST_POINT,
            holiday_country: "AU".to_string(),
        }
    }
}

impl ServerConfig {
    /// Creates a new server configuration with the given socket path.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            ..Default::default()
        }
    }

    /// Builder: set connection timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Builder: set max connections.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Builder: set cleanup stale socket.
    pub fn with_cleanup_stale_socket(mut self, cleanup: bool) -> Self {
        self.cleanup_stale_socket = cleanup;
        self
    }

    /// Builder: set enrichment lookup timeout.
    pub fn with_enrichment_timeout(mut self, timeout: Duration) -> Self {
        self.enrichment_timeout = timeout;
        self
    }

    /// Builder: set forecast coordinates.
    pub fn with_forecast_point(mut self, point: GeoPoint) -> Self {
        self.forecast_point = point;
        self
    }

    /// Builder: set holiday country code.
    pub fn with_holiday_country(mut self, country: impl Into<String>) -> Self {
        self.holiday_country = country.into();
        self
    }
}

/// Returns the default socket path.
///
/// Uses `$XDG_RUNTIME_DIR/timeblock.sock` if available,
/// otherwise falls back to `/tmp/timeblock-$UID.sock`.
pub fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(runtime_dir).join("timeblock.sock")
    } else {
        #[cfg(unix)]
        let uid = unsafe { libc::getuid() };
        #[cfg(not(unix))]
        let uid = 0;
        PathBuf::from(format!("/tmp/timeblock-{}.sock", uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert!(config.socket_path.to_string_lossy().contains("timeblock"));
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
        assert_eq!(config.max_connections, 100);
        assert!(config.cleanup_stale_socket);
        assert_eq!(config.holiday_country, "AU");
    }

    #[test]
    fn custom_config() {
        let config = ServerConfig::new("/custom/path.sock")
            .with_connection_timeout(Duration::from_secs(60))
            .with_max_connections(50)
            .with_cleanup_stale_socket(false)
            .with_enrichment_timeout(Duration::from_secs(2))
            .with_holiday_country("FR");

        assert_eq!(config.socket_path, PathBuf::from("/custom/path.sock"));
        assert_eq!(config.connection_timeout, Duration::from_secs(60));
        assert_eq!(config.max_connections, 50);
        assert!(!config.cleanup_stale_socket);
        assert_eq!(config.enrichment_timeout, Duration::from_secs(2));
        assert_eq!(config.holiday_country, "FR");
    }

    #[test]
    fn default_socket_path_format() {
        let path = default_socket_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("timeblock"));
        assert!(path_str.ends_with(".sock"));
    }
}
