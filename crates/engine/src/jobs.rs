//! Job lookup over the booking system's PostgreSQL tables.
//!
//! Reads `jobs`, the active row of `translator_job_rel` and `user_meta`.
//! The tables are owned by the booking system; nothing here writes to them.

use async_trait::async_trait;
use sqlx::PgPool;

use booking_common::error::AppError;
use booking_common::types::{CustomerMeta, Job, JobData};
use booking_notifier::transport::{JobLookup, LookupError};

/// sqlx-backed [`JobLookup`].
#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobLookup for PgJobRepository {
    async fn find(&self, job_id: i64) -> Result<Job, LookupError> {
        let job: Option<Job> = sqlx::query_as(
            r#"
            SELECT j.id, j.user_id, j.from_language_id, j.status,
                   (j.immediate = 'yes') AS immediate,
                   j.duration, j.due, j.gender, j.certified, j.job_type,
                   tj.user_id AS translator_id
            FROM jobs j
            LEFT JOIN translator_job_rel tj
              ON tj.job_id = j.id AND tj.cancel_at IS NULL
            WHERE j.id = $1
            ORDER BY tj.created_at DESC NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        let job = job.ok_or(LookupError::NotFound(job_id))?;

        tracing::debug!(
            job_id,
            status = %job.status,
            translator_id = ?job.translator_id,
            "Job resolved"
        );

        Ok(job)
    }

    async fn to_data(&self, job: &Job) -> Result<JobData, AppError> {
        let meta: Option<CustomerMeta> = sqlx::query_as(
            "SELECT city AS customer_town, customer_type FROM user_meta WHERE user_id = $1",
        )
        .bind(job.user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(JobData::from_job(job, meta.unwrap_or_default()))
    }
}
