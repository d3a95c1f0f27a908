//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::debug;

use crate::catalog::{Character, CharacterCatalog};
use crate::config::Config;
use crate::error::CatalogError;
use crate::metrics::{self, Endpoint, RequestTimer};

use super::params::{limit_param, parse_id, parse_limit, QueryPairs};

/// Where the base for absolute media URLs comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaBase {
    /// Return media paths as stored.
    Relative,
    /// Prefix with a configured base URL.
    Fixed(String),
    /// Prefix with the origin the request was addressed to.
    FromRequest,
}

impl MediaBase {
    /// Pick the policy from configuration. A configured base URL wins.
    pub fn from_config(config: &Config) -> Self {
        match &config.base_url {
            Some(base) => MediaBase::Fixed(base.clone()),
            None if config.absolute_media_urls => MediaBase::FromRequest,
            None => MediaBase::Relative,
        }
    }

    /// Resolve the base for one request.
    ///
    /// Request-derived bases use `X-Forwarded-Proto` (default http) and the
    /// `Host` header; without a `Host` header nothing is rewritten.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        match self {
            MediaBase::Relative => None,
            MediaBase::Fixed(base) => Some(base.clone()),
            MediaBase::FromRequest => {
                let host = headers.get("host")?.to_str().ok()?;
                let scheme = headers
                    .get("x-forwarded-proto")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.split(',').next())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .unwrap_or("http");
                Some(format!("{}://{}", scheme, host))
            }
        }
    }
}

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Character catalog service.
    pub catalog: Arc<CharacterCatalog>,
    /// Media URL policy.
    pub media_base: MediaBase,
    /// Prometheus handle, present when metrics are enabled.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(catalog: CharacterCatalog, media_base: MediaBase) -> Self {
        Self {
            catalog: Arc::new(catalog),
            media_base,
            prometheus: None,
        }
    }

    /// Build state from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CharacterCatalog::new(config.characters_file.clone()),
            MediaBase::from_config(config),
        )
    }

    /// Attach a Prometheus handle so `/metrics` can render it.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("catalog", &self.catalog)
            .field("media_base", &self.media_base)
            .field("metrics_enabled", &self.prometheus.is_some())
            .finish()
    }
}

/// Health check handler - always returns 200 with plain text.
pub async fn health() -> &'static str {
    "Character Cards API is running"
}

/// Metrics handler - Prometheus text format, 404 when metrics are disabled.
pub async fn metrics_text(State(state): State<AppState>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

/// All characters shuffled, optionally capped by `?limit=`.
pub async fn list_characters(
    State(state): State<AppState>,
    Query(query): Query<QueryPairs>,
    headers: HeaderMap,
) -> Result<Json<Vec<Character>>, CatalogError> {
    let _timer = RequestTimer::new(Endpoint::ListCharacters);
    let limit = parse_limit(limit_param(&query));
    let base = state.media_base.resolve(&headers);

    let characters = state.catalog.list_all(limit, base.as_deref()).await?;

    debug!(?limit, returned = characters.len(), "Listed characters");
    metrics::add_characters_served(characters.len());
    Ok(Json(characters))
}

/// One random character.
pub async fn random_character(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Character>, CatalogError> {
    let _timer = RequestTimer::new(Endpoint::RandomCharacter);
    let base = state.media_base.resolve(&headers);

    let character = state.catalog.random(base.as_deref()).await?;

    debug!(id = ?character.id(), "Picked random character");
    metrics::add_characters_served(1);
    Ok(Json(character))
}

/// Character by id; 404 when nothing matches.
pub async fn character_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Character>, CatalogError> {
    let _timer = RequestTimer::new(Endpoint::CharacterById);
    let base = state.media_base.resolve(&headers);

    let result = match parse_id(&raw_id) {
        Some(id) => state.catalog.by_id(id, base.as_deref()).await,
        None => {
            // Still read the file so a broken store surfaces as a 500.
            state.catalog.load().await?;
            Err(CatalogError::NotFound { id: raw_id })
        }
    };

    match result {
        Ok(character) => {
            metrics::add_characters_served(1);
            Ok(Json(character))
        }
        Err(e) => {
            if e.is_not_found() {
                debug!(error = %e, "Character lookup missed");
                metrics::inc_character_not_found();
            }
            Err(e)
        }
    }
}
