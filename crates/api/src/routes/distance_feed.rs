//! Distance feed route.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use booking_common::error::AppError;
use booking_engine::distance_feed::{DistanceFeedRequest, DistanceFeedService};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/distance-feed", post(distance_feed))
}

/// POST /api/distance-feed: Record distance/time and admin flags for a finished job.
async fn distance_feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<DistanceFeedRequest>,
) -> Result<Response, AppError> {
    let update = req.validate()?;

    if let Err(e) = DistanceFeedService::apply(&state.pool, &update).await {
        tracing::error!(
            job_id = update.job_id,
            user_id = auth.user_id,
            error = %e,
            "Distance feed rolled back"
        );
        let body = json!({
            "message": "Distance or Job records cannot be updated",
            "error": e.to_string(),
            "success": false
        });
        return Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response());
    }

    Ok(Json(json!("Record updated!")).into_response())
}
