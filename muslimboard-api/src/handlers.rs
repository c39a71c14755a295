//! API route handlers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, RawQuery, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use muslimboard_core::{
    CacheKey, CoordinateQuery, ImageUrl, LocationQuery, QueryParams, FALLBACK_IMAGE_CONTENT_TYPE,
};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

fn cache_key(state: &AppState, uri: &OriginalUri) -> CacheKey {
    CacheKey::from_request(uri.0.path(), uri.0.query(), state.config.cache_key_mode)
}

/// GET /api/v1/shalat-schedule/by-coordinate
pub async fn schedule_by_coordinate(
    State(state): State<Arc<AppState>>,
    uri: OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Envelope<SchedulePayload>>> {
    let key = cache_key(&state, &uri);
    let query = CoordinateQuery::from_query(raw.as_deref());
    let resolution = state.schedules.by_coordinate(&key, &query).await?;

    Ok(Json(Envelope::ok(SchedulePayload::from(resolution))))
}

/// GET /api/v1/shalat-schedule/by-location
pub async fn schedule_by_location(
    State(state): State<Arc<AppState>>,
    uri: OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Envelope<SchedulePayload>>> {
    let key = cache_key(&state, &uri);
    let query = LocationQuery::from_query(raw.as_deref());
    let resolved = state.schedules.by_location(&key, &query).await?;

    Ok(Json(Envelope::ok(SchedulePayload::Schedule(resolved.result))))
}

/// GET /api/v1/image
///
/// Streams the origin body through without buffering. Once the first chunk
/// is sent the status is committed, so a failure mid-stream can only cut the
/// body short.
pub async fn proxy_image(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Result<Response> {
    let params = QueryParams::parse(raw.as_deref());
    let url = ImageUrl::from_param(params.get("image")).map_err(|e| {
        warn!(error = %e, "rejected image request");
        ApiError::from(e)
    })?;

    let image = state.images.fetch_image(&url).await?;

    let content_type = HeaderValue::from_str(&image.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_IMAGE_CONTENT_TYPE));
    let cache_control = HeaderValue::from_str(&format!(
        "public, max-age={}",
        state.config.image_max_age_secs
    ))
    .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, cache_control),
        ],
        Body::from_stream(image.body),
    )
        .into_response())
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cache: state.schedules.cache().store().stats().into(),
    })
}
