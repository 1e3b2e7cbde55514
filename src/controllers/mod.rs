pub mod events;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().merge(events::routes())
}

/// Полный роутер приложения: служебные маршруты и API под `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.app.cors_origins);

    Router::new()
        .route("/", get(|| async { Json(json!({ "status": "Events API running" })) }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins.to_vec();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|origin| origin_allowed(&allowed, origin))
                .unwrap_or(false)
        }))
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Точное совпадение либо шаблон вида `https://*.vercel.app`.
pub fn origin_allowed(allowed: &[String], origin: &str) -> bool {
    allowed.iter().any(|entry| match entry.split_once("*.") {
        Some((prefix, suffix)) => {
            let Some(host) = origin.strip_prefix(prefix) else {
                return false;
            };
            host.len() > suffix.len() + 1 && host.ends_with(&format!(".{suffix}"))
        }
        None => entry == origin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_origins_match_subdomains_only() {
        let allowed = vec![
            "http://localhost:5173".to_string(),
            "https://*.vercel.app".to_string(),
        ];
        assert!(origin_allowed(&allowed, "http://localhost:5173"));
        assert!(origin_allowed(&allowed, "https://ngo-events.vercel.app"));
        assert!(!origin_allowed(&allowed, "https://vercel.app"));
        assert!(!origin_allowed(&allowed, "http://ngo-events.vercel.app"));
        assert!(!origin_allowed(&allowed, "https://evil.example"));
    }
}
