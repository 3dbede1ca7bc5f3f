//! Request handlers: login, the MJPEG stream, navigation and status.

use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, warn};

use feed_core::{mjpeg, NavRequest};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

fn unauthenticated(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
}

/// `POST /login`: exchange credentials for an access token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    if !state
        .credentials
        .authenticate(&request.username, &request.password)
    {
        info!(username = %request.username, "login rejected");
        return unauthenticated("Invalid Credentials.");
    }

    match state.gate.issue(&request.username) {
        Ok(token) => {
            info!(username = %request.username, "login succeeded");
            Json(LoginResponse { token }).into_response()
        }
        Err(e) => {
            error!(error = %e, "token signing failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub token: Option<String>,
}

/// `GET /video?token=...`: unbounded MJPEG stream of the latest frames.
///
/// The token is re-checked on every request. The stream itself has no end
/// condition; it runs until the client disconnects, emitting one part per
/// tick whenever a frame is available. Clients slower or faster than the
/// producer skip or repeat frames.
pub async fn video(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
) -> Response {
    let Some(token) = query.token else {
        return unauthenticated("Missing token.");
    };

    match state.gate.verify(&token) {
        Ok(identity) => debug!(%identity, "stream session authorized"),
        Err(e) => {
            warn!(reason = %e, "stream session rejected");
            return unauthenticated("Invalid or expired token.");
        }
    }

    let buffer = state.buffer.clone();
    let interval = state.stream_interval;
    let stream = async_stream::stream! {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let snapshot = buffer.snapshot();
            if let Some(jpeg) = snapshot.frame {
                yield Ok::<_, Infallible>(mjpeg::part(&jpeg));
            }
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mjpeg::content_type())
        .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
        .body(Body::from_stream(stream))
        .expect("failed to build MJPEG response")
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    /// Target location index; omitted means "advance to the next".
    pub location: Option<usize>,
}

/// `POST /navigate`: request a location change.
///
/// Applied by the producer on its next cycle; if several requests land
/// within one cycle the last one wins. An out-of-range index is corrected
/// to the first location by the producer rather than rejected here.
pub async fn navigate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NavigateRequest>,
) -> Response {
    let Some(mailbox) = &state.navigation else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Navigation is not available." })),
        )
            .into_response();
    };

    let (nav_request, accepted) = match request.location {
        Some(index) => (NavRequest::GoTo(index), json!({ "go_to": index })),
        None => (NavRequest::Advance, json!("advance")),
    };
    mailbox.post(nav_request);
    info!(?nav_request, "navigation request queued");

    Json(json!({ "status": "accepted", "request": accepted })).into_response()
}

/// `GET /locations`: names of the configured video locations.
pub async fn locations(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({ "locations": state.location_names }))
}

/// `GET /status`: pipeline snapshot for monitoring.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let snapshot = state.buffer.snapshot();
    let current = state.active_index.load(Ordering::Relaxed);
    Json(json!({
        "locations": state.location_names.len(),
        "current": current,
        "current_name": state.location_names.get(current),
        "frames_published": snapshot.version,
        "frame_available": snapshot.frame.is_some(),
    }))
}
