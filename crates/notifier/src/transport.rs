//! Collaborator seams the dispatcher is built on.
//!
//! The booking system owns job storage and the push/SMS providers; this
//! module only defines what the dispatcher needs from them.

use async_trait::async_trait;
use thiserror::Error;

use booking_common::error::AppError;
use booking_common::types::{Channel, Job, JobData};

/// Translator filter passed with every push resend: notify regardless of acceptance filters.
pub const BROADCAST_FILTER: &str = "*";

/// Failure to resolve a job for dispatch.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No job exists with this id.
    #[error("No query results for job {0}")]
    NotFound(i64),

    /// The backing store failed; never reported as a missing job.
    #[error(transparent)]
    Backend(#[from] AppError),
}

impl From<sqlx::Error> for LookupError {
    fn from(err: sqlx::Error) -> Self {
        LookupError::Backend(AppError::Database(err))
    }
}

/// Failure reported by a push or SMS send. The detail is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// Read access to bookings.
#[async_trait]
pub trait JobLookup: Send + Sync {
    /// Resolve a job by id.
    async fn find(&self, job_id: i64) -> Result<Job, LookupError>;

    /// Project a job into the transport payload shape.
    async fn to_data(&self, job: &Job) -> Result<JobData, AppError>;
}

/// Outbound notification delivery to translators.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Push to the translator(s) of `job`. `filter` is opaque and forwarded as-is.
    async fn send_push_to_translator(
        &self,
        job: &Job,
        data: &JobData,
        filter: &str,
    ) -> Result<(), TransportError>;

    async fn send_sms_to_translator(&self, job: &Job) -> Result<(), TransportError>;
}

/// Proof of holding a resend lock, unique per successful acquire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(pub String);

/// Refuses a resend while another one for the same job and channel is in flight.
#[async_trait]
pub trait ResendGuard: Send + Sync {
    /// `Some(token)` when the caller now holds the lock, `None` when it is taken.
    async fn acquire(&self, job_id: i64, channel: Channel) -> Result<Option<LockToken>, AppError>;

    /// Release a lock taken with `token`. A lock that expired and was taken
    /// by another caller is left in place.
    async fn release(
        &self,
        job_id: i64,
        channel: Channel,
        token: &LockToken,
    ) -> Result<(), AppError>;
}
