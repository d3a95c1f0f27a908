//! HTTP API route definitions.

use std::path::Path;
use std::time::Duration;

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, Response};
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::{MakeHeaderValue, SetResponseHeader, SetResponseHeaderLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;

use super::handlers::{
    character_by_id, health, list_characters, metrics_text, random_character, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        // Character endpoints
        .route("/api/characters", get(list_characters))
        .route("/api/character/random", get(random_character))
        .route("/api/character/:id", get(character_by_id))
        .with_state(state)
}

/// Create the full application: API routes, static media, CORS and tracing.
pub fn create_app(state: AppState, config: &Config) -> Router {
    let cache_control = CacheOnSuccess(media_cache_control(config.media_cache_max_age_secs));

    create_router(state)
        .nest_service("/music", media_service(&config.music_dir, cache_control.clone()))
        .nest_service("/video", media_service(&config.video_dir, cache_control))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
}

/// Static media directory with a long-lived `Cache-Control` header.
fn media_service(
    dir: &Path,
    cache_control: CacheOnSuccess,
) -> SetResponseHeader<ServeDir, CacheOnSuccess> {
    ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(CACHE_CONTROL, cache_control))
        .service(ServeDir::new(dir))
}

/// Header value that is only set on 2xx responses, so misses and errors
/// are never cached.
#[derive(Debug, Clone)]
struct CacheOnSuccess(HeaderValue);

impl<B> MakeHeaderValue<Response<B>> for CacheOnSuccess {
    fn make_header_value(&mut self, response: &Response<B>) -> Option<HeaderValue> {
        response.status().is_success().then(|| self.0.clone())
    }
}

fn media_cache_control(max_age_secs: u64) -> HeaderValue {
    HeaderValue::from_str(&format!("public, max-age={}", max_age_secs))
        .unwrap_or_else(|_| HeaderValue::from_static("public"))
}

/// CORS policy: permissive unless specific origins are configured.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins = config.cors_origins();
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::MediaBase;
    use crate::catalog::CharacterCatalog;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::collections::HashSet;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn write_catalog(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("characters.json");
        std::fs::write(
            &path,
            json!({
                "characters": [
                    { "id": 1, "name": "Ash", "defeatMusic": "/music/a.mp3" },
                    { "id": 2, "name": "Bo" },
                    { "id": 3, "name": "Cy", "defeatVideo": "/video/c.mp4" }
                ]
            })
            .to_string(),
        )
        .unwrap();
        path
    }

    fn app(dir: &TempDir, media_base: MediaBase) -> Router {
        let state = AppState::new(CharacterCatalog::new(write_catalog(dir)), media_base);
        create_router(state)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).header("host", "cards.local").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn ids(body: &Value) -> Vec<i64> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn health_endpoint_returns_plain_text() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, MediaBase::Relative)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"Character Cards API is running");
    }

    #[tokio::test]
    async fn list_returns_everything_without_limit() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get(app(&dir, MediaBase::Relative), "/api/characters").await;

        assert_eq!(status, StatusCode::OK);
        let mut got = ids(&body);
        got.sort_unstable();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn list_honours_limit() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get(app(&dir, MediaBase::Relative), "/api/characters?limit=2").await;

        assert_eq!(status, StatusCode::OK);
        let got: HashSet<i64> = ids(&body).into_iter().collect();
        assert_eq!(got.len(), 2);
        assert!(got.is_subset(&HashSet::from([1, 2, 3])));
    }

    #[tokio::test]
    async fn list_ignores_garbage_limit() {
        let dir = TempDir::new().unwrap();

        for uri in ["/api/characters?limit=abc", "/api/characters?limit=0", "/api/characters?limit=-1"] {
            let (status, body) = get(app(&dir, MediaBase::Relative), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(ids(&body).len(), 3, "{uri}");
        }
    }

    #[tokio::test]
    async fn repeated_limit_uses_the_first() {
        let dir = TempDir::new().unwrap();

        let (status, body) =
            get(app(&dir, MediaBase::Relative), "/api/characters?limit=1&limit=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body).len(), 1);
    }

    #[tokio::test]
    async fn random_returns_a_member() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get(app(&dir, MediaBase::Relative), "/api/character/random").await;

        assert_eq!(status, StatusCode::OK);
        assert!((1..=3).contains(&body["id"].as_i64().unwrap()));
    }

    #[tokio::test]
    async fn by_id_hit() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get(app(&dir, MediaBase::Relative), "/api/character/2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": 2, "name": "Bo" }));
    }

    #[tokio::test]
    async fn by_id_miss_is_404() {
        let dir = TempDir::new().unwrap();

        for uri in ["/api/character/5", "/api/character/abc"] {
            let (status, body) = get(app(&dir, MediaBase::Relative), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({ "message": "Character not found" }));
        }
    }

    #[tokio::test]
    async fn missing_store_is_500() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(
            CharacterCatalog::new(dir.path().join("missing.json")),
            MediaBase::Relative,
        );

        for uri in ["/api/characters", "/api/character/random", "/api/character/1", "/api/character/x"] {
            let (status, body) = get(create_router(state.clone()), uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert!(body["message"].is_string());
            assert!(body["error"].as_str().unwrap().contains("missing.json"));
        }
    }

    #[tokio::test]
    async fn fixed_base_rewrites_media() {
        let dir = TempDir::new().unwrap();
        let base = MediaBase::Fixed("https://x".to_string());

        let (_, ash) = get(app(&dir, base.clone()), "/api/character/1").await;
        let (_, bo) = get(app(&dir, base), "/api/character/2").await;

        assert_eq!(ash["defeatMusic"], json!("https://x/music/a.mp3"));
        assert!(bo.get("defeatMusic").is_none());
    }

    #[tokio::test]
    async fn request_base_rewrites_media() {
        let dir = TempDir::new().unwrap();

        let (_, cy) = get(app(&dir, MediaBase::FromRequest), "/api/character/3").await;

        assert_eq!(cy["defeatVideo"], json!("http://cards.local/video/c.mp4"));
    }

    #[tokio::test]
    async fn metrics_endpoint_is_404_when_disabled() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, MediaBase::Relative)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn cache_header_only_on_success() {
        let mut make = CacheOnSuccess(media_cache_control(60));

        let ok = Response::builder().status(StatusCode::OK).body(()).unwrap();
        let partial = Response::builder().status(StatusCode::PARTIAL_CONTENT).body(()).unwrap();
        let missing = Response::builder().status(StatusCode::NOT_FOUND).body(()).unwrap();

        assert!(make.make_header_value(&ok).is_some());
        assert!(make.make_header_value(&partial).is_some());
        assert_eq!(make.make_header_value(&missing), None);
    }

    #[test]
    fn cache_control_value() {
        assert_eq!(media_cache_control(60), HeaderValue::from_static("public, max-age=60"));
    }
}
