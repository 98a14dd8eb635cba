//! API configuration.

/// Which object store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// S3-compatible bucket configured through `STORAGE_*` variables
    S3,
    /// Process-local store, for local development
    Memory,
}

impl StorageBackend {
    fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Self::Memory,
            _ => Self::S3,
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Object store backend
    pub storage_backend: StorageBackend,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            storage_backend: StorageBackend::S3,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            storage_backend: std::env::var("STORAGE_BACKEND")
                .map(|s| StorageBackend::parse(&s))
                .unwrap_or(StorageBackend::S3),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.environment)
    }
}

/// Whether an `ENVIRONMENT` value names a production deployment.
pub fn is_production_environment(environment: &str) -> bool {
    environment.trim().eq_ignore_ascii_case("production")
}

/// Read `ENVIRONMENT` from the process environment.
pub fn production_from_env() -> bool {
    std::env::var("ENVIRONMENT").is_ok_and(|env| is_production_environment(&env))
}
