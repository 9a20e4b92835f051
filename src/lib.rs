//! Mood Vault API: mood and music tracking backend.
//!
//! The HTTP surface is a fixed dispatch table under [`API_BASE_PATH`]. The
//! persistent schema lives in [`db::schema`] and is materialized by the
//! `moodvault-migrate` binary.

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod migrate;
pub mod models;
pub mod repos;
pub mod validation;

use config::Config;

/// Mount prefix for every route.
pub const API_BASE_PATH: &str = "/api";

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health-check", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    Router::new()
        .nest(API_BASE_PATH, api)
        .fallback(handlers::not_found)
        .with_state(state)
}

/// CORS for the configured origins. `*` anywhere in the list allows any
/// origin; entries that are not valid header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // The pool is lazy and points nowhere: any route that touched it would fail.
    fn test_state() -> AppState {
        let config = Config::from_lookup(|name: &str| {
            (name == "DATABASE_URL").then(|| "postgres://nobody@127.0.0.1:1/none".to_string())
        })
        .unwrap();
        let db = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState {
            db,
            config: Arc::new(config),
        }
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_returns_static_document() {
        let (status, body) = send(
            Request::builder()
                .uri("/api/health-check")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "🧠 Mood Vault API is running.");
        assert_eq!(body["docs"], "Coming soon...");
    }

    #[tokio::test]
    async fn test_health_check_ignores_body_and_headers() {
        let (status, body) = send(
            Request::builder()
                .uri("/api/health-check?verbose=1")
                .header("authorization", "Bearer garbage")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"anything": true}"#))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_health_check_is_mounted_under_base_path() {
        let (status, body) = send(
            Request::builder()
                .uri("/health-check")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 404);
    }

    #[tokio::test]
    async fn test_readyz_reports_unreachable_database() {
        let (status, body) = send(
            Request::builder()
                .uri("/api/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["checks"]["database"], "failed");
        assert_eq!(body["reason"], "unreachable");
    }

    async fn allowed_origin(origins: &[&str], origin: &str) -> Option<String> {
        let origins: Vec<String> = origins.iter().map(|o| o.to_string()).collect();
        let app = router(test_state()).layer(cors_layer(&origins));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health-check")
                    .header("origin", origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_wildcard_allows_any_origin() {
        let allowed = allowed_origin(&["https://moodvault.app", "*"], "https://elsewhere.dev").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_cors_list_echoes_known_origin_only() {
        let origins = ["https://moodvault.app", "not a\nheader"];
        assert_eq!(
            allowed_origin(&origins, "https://moodvault.app").await.as_deref(),
            Some("https://moodvault.app")
        );
        assert_eq!(allowed_origin(&origins, "https://elsewhere.dev").await, None);
    }
}
