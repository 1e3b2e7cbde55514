use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::cache::CacheStatus;
use crate::scraping::list::is_url_safe;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(get_all_events))
        .route("/events/{slug}", get(get_event_by_slug))
}

/// Конверт ответа: `{ success, data }` или `{ success, message }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn success<T: Serialize>(data: T, cache: CacheStatus) -> Response {
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    };
    ([("X-Cache", cache.as_header())], Json(body)).into_response()
}

fn failure(status: StatusCode, message: String) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        message: Some(message),
    };
    (status, Json(body)).into_response()
}

pub async fn get_all_events(State(state): State<Arc<AppState>>) -> Response {
    match state.events.list_events().await {
        Ok(fetched) => success(fetched.value, fetched.cache),
        Err(e) => {
            tracing::error!("Failed to load events: {:?}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub async fn get_event_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    if !is_url_safe(&slug) {
        return failure(StatusCode::BAD_REQUEST, format!("invalid event slug: {slug:?}"));
    }

    match state.events.event_detail(&slug).await {
        Ok(fetched) => success(fetched.value, fetched.cache),
        Err(e) => {
            tracing::error!("Failed to load event {}: {:?}", slug, e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
