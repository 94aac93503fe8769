use std::env;
use std::time::Duration;

use crate::shared::constants::{
    DEFAULT_MAX_PHOTOS_PER_INCIDENT, DEFAULT_MAX_PHOTO_SIZE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
    SEARCH_MAX_RESULTS,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub incidents: IncidentsConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Session token validation settings.
///
/// Tokens are issued by the web front-end's session service and signed with
/// the same shared secret (HS256).
#[derive(Clone)]
pub struct AuthConfig {
    pub session_secret: String,
    pub jwt_leeway: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_secret", &"***")
            .field("jwt_leeway", &self.jwt_leeway)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Limits applied to incident listing, search and photo uploads
#[derive(Debug, Clone)]
pub struct IncidentsConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub search_max_results: i64,
    pub max_photos_per_incident: usize,
    /// Maximum photo size in bytes
    pub max_photo_size: usize,
}

impl Default for IncidentsConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            search_max_results: SEARCH_MAX_RESULTS,
            max_photos_per_incident: DEFAULT_MAX_PHOTOS_PER_INCIDENT,
            max_photo_size: DEFAULT_MAX_PHOTO_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            incidents: IncidentsConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60; // 1 minute
    const MIN_SECRET_LENGTH: usize = 32;

    pub fn from_env() -> Result<Self, String> {
        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| "SESSION_SECRET environment variable is required".to_string())?;

        if session_secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(format!(
                "SESSION_SECRET must be at least {} characters",
                Self::MIN_SECRET_LENGTH
            ));
        }

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        Ok(Self {
            session_secret,
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Safe City API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for Safe City".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl IncidentsConfig {
    pub fn from_env() -> Result<Self, String> {
        let default_page_size = env::var("DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse::<i64>()
            .map_err(|_| "DEFAULT_PAGE_SIZE must be a valid number".to_string())?;

        let max_page_size = env::var("MAX_PAGE_SIZE")
            .unwrap_or_else(|_| MAX_PAGE_SIZE.to_string())
            .parse::<i64>()
            .map_err(|_| "MAX_PAGE_SIZE must be a valid number".to_string())?;

        if max_page_size < 1 || default_page_size < 1 || default_page_size > max_page_size {
            return Err(
                "DEFAULT_PAGE_SIZE must be between 1 and MAX_PAGE_SIZE (inclusive)".to_string(),
            );
        }

        let search_max_results = env::var("SEARCH_MAX_RESULTS")
            .unwrap_or_else(|_| SEARCH_MAX_RESULTS.to_string())
            .parse::<i64>()
            .map_err(|_| "SEARCH_MAX_RESULTS must be a valid number".to_string())?;

        if search_max_results < 1 {
            return Err("SEARCH_MAX_RESULTS must be at least 1".to_string());
        }

        let max_photos_per_incident = env::var("MAX_PHOTOS_PER_INCIDENT")
            .unwrap_or_else(|_| DEFAULT_MAX_PHOTOS_PER_INCIDENT.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_PHOTOS_PER_INCIDENT must be a valid number".to_string())?;

        let max_photo_size = env::var("MAX_PHOTO_SIZE")
            .unwrap_or_else(|_| DEFAULT_MAX_PHOTO_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_PHOTO_SIZE must be a valid number".to_string())?;

        Ok(Self {
            default_page_size,
            max_page_size,
            search_max_results,
            max_photos_per_incident,
            max_photo_size,
        })
    }
}
