//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use axum::http::HeaderValue;
use serde::Deserialize;

use crate::error::{Result, ServiceError};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Bind address for the HTTP server.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Data and Media ===
    /// JSON file holding the character catalog.
    #[serde(default = "default_characters_file")]
    pub characters_file: PathBuf,

    /// Root for the catch-all static file service.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Root served under `/music`.
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,

    /// Root served under `/video`.
    #[serde(default = "default_video_dir")]
    pub video_dir: PathBuf,

    /// `max-age` for media responses, in seconds.
    #[serde(default = "default_media_cache_max_age")]
    pub media_cache_max_age_secs: u64,

    // === Media URL Rewriting ===
    /// Fixed base prepended to relative media paths (e.g. "https://cdn.example.com").
    #[serde(default)]
    pub base_url: Option<String>,

    /// Derive the media base from the request's own origin when no base URL is set.
    #[serde(default)]
    pub absolute_media_urls: bool,

    // === Cross-Origin ===
    /// Allowed browser origins, comma separated. Unset or "*" allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Option<Vec<String>>,

    // === Observability ===
    /// Install the Prometheus recorder and serve `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3003
}

fn default_characters_file() -> PathBuf {
    PathBuf::from("data/characters.json")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_music_dir() -> PathBuf {
    PathBuf::from("public/music")
}

fn default_video_dir() -> PathBuf {
    PathBuf::from("public/video")
}

fn default_media_cache_max_age() -> u64 {
    31_536_000 // one year
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            characters_file: default_characters_file(),
            public_dir: default_public_dir(),
            music_dir: default_music_dir(),
            video_dir: default_video_dir(),
            media_cache_max_age_secs: default_media_cache_max_age(),
            base_url: None,
            absolute_media_urls: false,
            cors_allowed_origins: None,
            metrics_enabled: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    ///
    /// Logging settings (`RUST_LOG`, `VERBOSE`) are not part of this struct;
    /// the binary reads them before any config is loaded.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(invalid("PORT must be non-zero".to_string()));
        }

        if let Some(base) = &self.base_url {
            let parsed = url::Url::parse(base)
                .map_err(|e| invalid(format!("BASE_URL is not a valid URL: {}", e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(invalid("BASE_URL must use http or https".to_string()));
            }
        }

        for origin in self.cors_origins() {
            if HeaderValue::from_str(origin).is_err() {
                return Err(invalid(format!(
                    "CORS_ALLOWED_ORIGINS has invalid origin {:?}",
                    origin
                )));
            }
        }

        Ok(())
    }

    /// Explicitly allowed origins; empty means any origin is allowed.
    pub fn cors_origins(&self) -> &[String] {
        match &self.cors_allowed_origins {
            Some(origins) if !origins.iter().any(|o| o.trim() == "*") => origins,
            _ => &[],
        }
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Human-readable summary of how media paths are returned.
    pub fn media_url_policy(&self) -> String {
        match &self.base_url {
            Some(base) => format!("absolute, base {}", base),
            None if self.absolute_media_urls => "absolute, derived from request".to_string(),
            None => "relative".to_string(),
        }
    }
}

fn invalid(reason: String) -> ServiceError {
    ServiceError::InvalidConfig(reason)
}
