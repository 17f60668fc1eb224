//! Pipeline handlers: statistics and classified image.
//!
//! A client that passes a session id (query `session` or header
//! `x-ndvi-session`) gets its own generation sequence: a newer request in
//! the same session supersedes an older one, and the classified image is
//! served from the load that produced the report. Requests without a
//! session are processed on their own and never supersede anything.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::Response,
    Json,
};
use metrics::counter;
use ndvi_processor::{CornerSet, LoadCoordinator, LoadOutcome, Report};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::handlers::{png_response, CACHE_PRIVATE};
use crate::sessions::is_valid_session_id;
use crate::state::AppState;

/// Header carrying the client session id.
pub const SESSION_HEADER: &str = "x-ndvi-session";

#[derive(Debug, Deserialize)]
pub struct RasterQuery {
    /// Raster file name, or the path returned by `/api/rasters`.
    pub path: Option<String>,
    pub session: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub session: Option<String>,
    /// Generation returned by `/api/ndvi`; the image is only served while
    /// that load is the one on display.
    pub generation: Option<u64>,
}

/// Bounds and statistics of one raster.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NdviResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    pub generation: u64,
    /// URL of the classified image of this load, for session requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub bounds: CornerSet,
    pub report: Report,
}

fn requested_path<'a>(state: &AppState, query: &'a RasterQuery) -> Result<&'a str, ApiError> {
    let path = query
        .path
        .as_deref()
        .map(|p| state.config.relative_path(p.trim()))
        .unwrap_or_default();
    if path.is_empty() {
        return Err(ApiError::BadRequest("missing required parameter: path".to_string()));
    }
    Ok(path)
}

/// Session id from the query string, falling back to the header.
fn session_id(query: Option<&str>, headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let id = query
        .or_else(|| headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()))
        .map(str::trim);

    match id {
        None => Ok(None),
        Some(id) if is_valid_session_id(id) => Ok(Some(id.to_string())),
        Some(id) => Err(ApiError::BadRequest(format!("invalid session id: {:?}", id))),
    }
}

/// GET /api/ndvi?path=&session= - Run the pipeline and return bounds and report
///
/// Within a session, a request overtaken by a newer one answers 409
/// instead of returning outdated results.
pub async fn ndvi_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<RasterQuery>,
    headers: HeaderMap,
) -> Result<Json<NdviResponse>, ApiError> {
    counter!("ndvi_http_requests_total", "endpoint" => "ndvi").increment(1);
    let path = requested_path(&state, &query)?;
    let session = session_id(query.session.as_deref(), &headers)?;

    let coordinator = match &session {
        Some(id) => state.sessions.coordinator(id).await,
        None => Arc::new(LoadCoordinator::new(state.pipeline())),
    };

    match coordinator
        .load(&state.source, Arc::clone(&state.decoder), path)
        .await
    {
        LoadOutcome::Ready { generation, output } => {
            info!(
                path,
                session = session.as_deref().unwrap_or("-"),
                generation,
                valid = output.report.valid_count,
                "Raster processed"
            );
            let image = session
                .as_ref()
                .map(|id| format!("/api/ndvi/image?session={}&generation={}", id, generation));
            Ok(Json(NdviResponse {
                session,
                generation,
                image,
                bounds: output.bounds,
                report: output.report.clone(),
            }))
        }
        LoadOutcome::Failed(e) => Err(e.into()),
        LoadOutcome::Superseded { generation, latest } => {
            Err(ApiError::Superseded { generation, latest })
        }
        LoadOutcome::Aborted { message, .. } => Err(ApiError::Internal(message)),
    }
}

/// GET /api/ndvi/image?session=&generation= - Classified image as PNG
///
/// Encodes the image of the load currently on display in the session. When
/// `generation` is given it must be that load, so a report and its image
/// always come from the same raster.
pub async fn image_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    counter!("ndvi_http_requests_total", "endpoint" => "image").increment(1);
    let session = session_id(query.session.as_deref(), &headers)?
        .ok_or_else(|| ApiError::BadRequest("missing required parameter: session".to_string()))?;

    let coordinator = state
        .sessions
        .get(&session)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("unknown session {}", session)))?;

    let load = coordinator.state();
    let (output, shown) = match (load.current, load.current_generation) {
        (Some(output), Some(shown)) => (output, shown),
        _ => {
            return Err(ApiError::NotFound(format!(
                "no raster on display in session {}",
                session
            )))
        }
    };

    if let Some(requested) = query.generation {
        if requested < shown {
            return Err(ApiError::Superseded {
                generation: requested,
                latest: shown,
            });
        }
        if requested > shown {
            return Err(ApiError::NotFound(format!(
                "load {} of session {} has no image",
                requested, session
            )));
        }
    }

    let png =
        tokio::task::spawn_blocking(move || renderer::encode_classified(&output.classified_image))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(png_response(png, CACHE_PRIVATE))
}
