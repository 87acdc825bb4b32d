//! Distance feed: travel distance/time and admin bookkeeping reported after a job.
//!
//! A feed carries optional distance/time telemetry for the `distances` row of a
//! job plus session time, admin comment and three admin flags for the job
//! itself. Both updates run in one transaction.

use serde::Deserialize;
use sqlx::PgPool;

use booking_common::error::AppError;

/// Raw distance feed as posted by the admin panel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistanceFeedRequest {
    /// Form posts send the id as a string, JSON clients as a number.
    pub jobid: Option<serde_json::Value>,
    pub distance: Option<String>,
    pub time: Option<String>,
    pub session_time: Option<String>,
    pub flagged: Option<serde_json::Value>,
    pub manually_handled: Option<serde_json::Value>,
    pub by_admin: Option<serde_json::Value>,
    pub admincomment: Option<String>,
}

/// Admin flag as stored on the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Yes,
    No,
}

impl Flag {
    /// Only `"true"` (or JSON `true`) counts as set.
    fn from_input(value: Option<&serde_json::Value>) -> Self {
        match value {
            Some(serde_json::Value::String(s)) if s == "true" => Flag::Yes,
            Some(serde_json::Value::Bool(true)) => Flag::Yes,
            _ => Flag::No,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Yes => "yes",
            Flag::No => "no",
        }
    }

    pub fn is_set(&self) -> bool {
        *self == Flag::Yes
    }
}

/// A validated feed ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceFeedUpdate {
    pub job_id: i64,
    pub distance: Option<String>,
    pub time: Option<String>,
    pub session_time: Option<String>,
    pub admin_comment: Option<String>,
    pub flagged: Flag,
    pub manually_handled: Flag,
    pub by_admin: Flag,
}

fn parse_job_id(value: Option<&serde_json::Value>) -> Result<i64, AppError> {
    let invalid = || AppError::Validation("jobid must be an integer".to_string());
    match value {
        None | Some(serde_json::Value::Null) => {
            Err(AppError::Validation("jobid is required".to_string()))
        }
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
            Err(AppError::Validation("jobid is required".to_string()))
        }
        Some(serde_json::Value::Number(n)) => n.as_i64().ok_or_else(invalid),
        Some(serde_json::Value::String(s)) => s.trim().parse().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl DistanceFeedRequest {
    /// Normalize flags and reject incomplete feeds.
    pub fn validate(self) -> Result<DistanceFeedUpdate, AppError> {
        let job_id = parse_job_id(self.jobid.as_ref())?;

        let update = DistanceFeedUpdate {
            job_id,
            flagged: Flag::from_input(self.flagged.as_ref()),
            manually_handled: Flag::from_input(self.manually_handled.as_ref()),
            by_admin: Flag::from_input(self.by_admin.as_ref()),
            distance: non_empty(self.distance),
            time: non_empty(self.time),
            session_time: non_empty(self.session_time),
            admin_comment: non_empty(self.admincomment),
        };

        if update.flagged.is_set() && update.admin_comment.is_none() {
            return Err(AppError::Validation("Please, add comment".to_string()));
        }

        Ok(update)
    }
}

impl DistanceFeedUpdate {
    pub fn touches_distance(&self) -> bool {
        self.distance.is_some() || self.time.is_some()
    }

    pub fn touches_job(&self) -> bool {
        self.admin_comment.is_some()
            || self.session_time.is_some()
            || self.flagged.is_set()
            || self.manually_handled.is_set()
            || self.by_admin.is_set()
    }
}

/// Applies distance feeds.
pub struct DistanceFeedService;

impl DistanceFeedService {
    /// Apply the update atomically. Any failure rolls back both tables.
    pub async fn apply(pool: &PgPool, update: &DistanceFeedUpdate) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;

        if update.touches_distance() {
            sqlx::query("UPDATE distances SET distance = $1, time = $2 WHERE job_id = $3")
                .bind(update.distance.as_deref().unwrap_or(""))
                .bind(update.time.as_deref().unwrap_or(""))
                .bind(update.job_id)
                .execute(&mut *tx)
                .await?;
        }

        if update.touches_job() {
            sqlx::query(
                r#"
                UPDATE jobs
                SET admin_comments = $1, flagged = $2, session_time = $3,
                    manually_handled = $4, by_admin = $5
                WHERE id = $6
                "#,
            )
            .bind(update.admin_comment.as_deref().unwrap_or(""))
            .bind(update.flagged.as_str())
            .bind(update.session_time.as_deref().unwrap_or(""))
            .bind(update.manually_handled.as_str())
            .bind(update.by_admin.as_str())
            .bind(update.job_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            job_id = update.job_id,
            distance = update.touches_distance(),
            job = update.touches_job(),
            "Distance feed applied"
        );

        Ok(())
    }
}
