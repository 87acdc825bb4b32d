//! Notification resend routes.
//!
//! The response status always equals the `status` field of the body.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use booking_common::error::AppError;
use booking_common::types::{Channel, DeliveryResult};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/jobs/{id}/resend-push", post(resend_push))
        .route("/api/jobs/{id}/resend-sms", post(resend_sms))
        .route("/api/jobs/{id}/resend/{channel}", post(resend_on_channel))
}

/// POST /api/jobs/:id/resend-push: Resend the push notification to the job's translator.
async fn resend_push(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<i64>,
) -> Result<Response, AppError> {
    resend(&state, &auth, job_id, Channel::Push).await
}

/// POST /api/jobs/:id/resend-sms: Resend the SMS notification to the job's translator.
async fn resend_sms(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<i64>,
) -> Result<Response, AppError> {
    resend(&state, &auth, job_id, Channel::Sms).await
}

/// POST /api/jobs/:id/resend/:channel: Resend on a channel named in the path.
async fn resend_on_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((job_id, channel)): Path<(i64, String)>,
) -> Result<Response, AppError> {
    let channel: Channel = channel.parse()?;
    resend(&state, &auth, job_id, channel).await
}

async fn resend(
    state: &AppState,
    auth: &AuthUser,
    job_id: i64,
    channel: Channel,
) -> Result<Response, AppError> {
    tracing::info!(
        job_id,
        %channel,
        user_id = auth.user_id,
        role = auth.role(),
        "Notification resend requested"
    );

    let Some(lock) = state.resend_lock.clone() else {
        let result = state.dispatcher.dispatch(job_id, channel).await?;
        return Ok(delivery_response(result));
    };

    let Some(token) = lock.acquire(job_id, channel).await? else {
        return Err(AppError::Conflict(format!(
            "A {} resend for job {} is already in progress",
            channel, job_id
        )));
    };

    // Detached so the lock is released even if the client disconnects
    let dispatcher = state.dispatcher.clone();
    let outcome = tokio::spawn(async move {
        let outcome = dispatcher.dispatch(job_id, channel).await;
        if let Err(e) = lock.release(job_id, channel, &token).await {
            tracing::warn!(job_id, %channel, error = %e, "Failed to release resend lock");
        }
        outcome
    })
    .await
    .map_err(|e| AppError::Internal(format!("Resend task failed: {}", e)))?;

    Ok(delivery_response(outcome?))
}

fn delivery_response(result: DeliveryResult) -> Response {
    (result.status.http_status(), Json(result)).into_response()
}
