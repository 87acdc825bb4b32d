//! In-memory collaborators for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use booking_common::error::AppError;
use booking_common::types::{Channel, CustomerMeta, Job, JobData, JobStatus};

use crate::transport::{
    JobLookup, LockToken, LookupError, NotificationTransport, ResendGuard, TransportError,
};

/// An assigned booking with fixed field values.
pub fn sample_job(id: i64) -> Job {
    Job {
        id,
        user_id: 1000 + id,
        from_language_id: 4,
        status: JobStatus::Assigned,
        immediate: false,
        duration: 60,
        due: Utc
            .with_ymd_and_hms(2026, 5, 4, 13, 0, 0)
            .single()
            .unwrap_or_default(),
        gender: None,
        certified: Some("normal".to_string()),
        job_type: Some("paid".to_string()),
        translator_id: Some(77),
    }
}

/// Job store backed by a map.
#[derive(Default)]
pub struct InMemoryJobs {
    jobs: HashMap<i64, Job>,
    unavailable: bool,
    projection_fails: bool,
    finds: AtomicUsize,
}

impl InMemoryJobs {
    pub fn with(jobs: Vec<Job>) -> Self {
        Self {
            jobs: jobs.into_iter().map(|job| (job.id, job)).collect(),
            ..Self::default()
        }
    }

    /// A store whose backend is down for every lookup.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Jobs resolve, but projecting them into transport data fails.
    pub fn projection_failing(jobs: Vec<Job>) -> Self {
        Self {
            projection_fails: true,
            ..Self::with(jobs)
        }
    }

    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobLookup for InMemoryJobs {
    async fn find(&self, job_id: i64) -> Result<Job, LookupError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(AppError::Internal("job store unavailable".to_string()).into());
        }
        self.jobs
            .get(&job_id)
            .cloned()
            .ok_or(LookupError::NotFound(job_id))
    }

    async fn to_data(&self, job: &Job) -> Result<JobData, AppError> {
        if self.projection_fails {
            return Err(AppError::Internal("meta read failed".to_string()));
        }
        Ok(JobData::from_job(job, CustomerMeta::default()))
    }
}

/// One send observed by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub channel: Channel,
    pub job_id: i64,
    pub filter: Option<String>,
}

/// Transport that records every call and either succeeds or fails with a fixed detail.
#[derive(Default)]
pub struct RecordingTransport {
    fail_with: Option<String>,
    calls: Mutex<Vec<SentNotification>>,
}

impl RecordingTransport {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            fail_with: Some(detail.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SentNotification> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, sent: SentNotification) -> Result<(), TransportError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(sent);
        }
        match &self.fail_with {
            Some(detail) => Err(TransportError::new(detail.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn send_push_to_translator(
        &self,
        job: &Job,
        _data: &JobData,
        filter: &str,
    ) -> Result<(), TransportError> {
        self.record(SentNotification {
            channel: Channel::Push,
            job_id: job.id,
            filter: Some(filter.to_string()),
        })
    }

    async fn send_sms_to_translator(&self, job: &Job) -> Result<(), TransportError> {
        self.record(SentNotification {
            channel: Channel::Sms,
            job_id: job.id,
            filter: None,
        })
    }
}

/// Resend lock held in a map, with a counter for issued tokens.
#[derive(Default)]
pub struct InMemoryResendLock {
    held: Mutex<HashMap<(i64, Channel), LockToken>>,
    issued: AtomicUsize,
}

impl InMemoryResendLock {
    /// A lock already taken by another operator for `job_id` on `channel`.
    pub fn holding(job_id: i64, channel: Channel) -> Self {
        let lock = Self::default();
        if let Ok(mut held) = lock.held.lock() {
            held.insert((job_id, channel), LockToken("other-operator".to_string()));
        }
        lock
    }

    pub fn is_held(&self, job_id: i64, channel: Channel) -> bool {
        self.held
            .lock()
            .map(|held| held.contains_key(&(job_id, channel)))
            .unwrap_or(false)
    }

    pub fn acquire_count(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResendGuard for InMemoryResendLock {
    async fn acquire(&self, job_id: i64, channel: Channel) -> Result<Option<LockToken>, AppError> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| AppError::Internal("resend lock poisoned".to_string()))?;
        if held.contains_key(&(job_id, channel)) {
            return Ok(None);
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = LockToken(format!("token-{n}"));
        held.insert((job_id, channel), token.clone());
        Ok(Some(token))
    }

    async fn release(
        &self,
        job_id: i64,
        channel: Channel,
        token: &LockToken,
    ) -> Result<(), AppError> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| AppError::Internal("resend lock poisoned".to_string()))?;
        if held.get(&(job_id, channel)) == Some(token) {
            held.remove(&(job_id, channel));
        }
        Ok(())
    }
}
