//! Notification resend dispatcher.
//!
//! One call resolves a job, projects it into transport data and makes a single
//! send attempt on the requested channel. The outcome is always folded into a
//! [`DeliveryResult`]:
//!
//! - job missing → `404`, "Job not found"
//! - transport failure → `500`, a fixed channel-specific message, detail in `error`
//! - sent → `200`, a fixed channel-specific message
//!
//! Lookup backend failures are returned as `Err` so they surface as what they are.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use booking_common::error::AppError;
use booking_common::types::{Channel, DeliveryResult, Job, JobData};

use crate::transport::{
    BROADCAST_FILTER, JobLookup, LookupError, NotificationTransport, TransportError,
};

type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

type SendFn = for<'a> fn(&'a dyn NotificationTransport, &'a Job, &'a JobData) -> SendFuture<'a>;

/// Per-channel transport operation and the two user-facing messages.
struct ChannelRoute {
    send: SendFn,
    success_message: &'static str,
    failure_message: &'static str,
}

static PUSH_ROUTE: ChannelRoute = ChannelRoute {
    send: send_push,
    success_message: "Push notification sent successfully",
    failure_message: "Failed to send notification",
};

static SMS_ROUTE: ChannelRoute = ChannelRoute {
    send: send_sms,
    success_message: "SMS sent successfully",
    failure_message: "SMS notification failed",
};

fn route(channel: Channel) -> &'static ChannelRoute {
    match channel {
        Channel::Push => &PUSH_ROUTE,
        Channel::Sms => &SMS_ROUTE,
    }
}

fn send_push<'a>(
    transport: &'a dyn NotificationTransport,
    job: &'a Job,
    data: &'a JobData,
) -> SendFuture<'a> {
    transport.send_push_to_translator(job, data, BROADCAST_FILTER)
}

fn send_sms<'a>(
    transport: &'a dyn NotificationTransport,
    job: &'a Job,
    _data: &'a JobData,
) -> SendFuture<'a> {
    transport.send_sms_to_translator(job)
}

/// Resends push or SMS notifications for a job to its translator.
#[derive(Clone)]
pub struct NotificationDispatcher {
    lookup: Arc<dyn JobLookup>,
    transport: Arc<dyn NotificationTransport>,
}

impl NotificationDispatcher {
    pub fn new(lookup: Arc<dyn JobLookup>, transport: Arc<dyn NotificationTransport>) -> Self {
        Self { lookup, transport }
    }

    /// Make one delivery attempt for `job_id` over `channel`.
    ///
    /// No retries happen here; every call is itself a manual retry.
    pub async fn dispatch(
        &self,
        job_id: i64,
        channel: Channel,
    ) -> Result<DeliveryResult, AppError> {
        let route = route(channel);

        let job = match self.lookup.find(job_id).await {
            Ok(job) => job,
            Err(err @ LookupError::NotFound(_)) => {
                tracing::warn!(job_id, %channel, error = %err, "Resend skipped, job not found");
                return Ok(DeliveryResult::job_not_found(err.to_string()));
            }
            Err(LookupError::Backend(err)) => return Err(err),
        };

        let data = self.lookup.to_data(&job).await?;

        match (route.send)(self.transport.as_ref(), &job, &data).await {
            Ok(()) => {
                tracing::info!(
                    job_id,
                    %channel,
                    translator_id = ?job.translator_id,
                    "Notification resent"
                );
                Ok(DeliveryResult::delivered(route.success_message))
            }
            Err(err) => {
                tracing::warn!(job_id, %channel, error = %err, "Notification resend failed");
                Ok(DeliveryResult::transport_failed(route.failure_message, err.0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use booking_common::types::DeliveryStatus;

    use super::*;
    use crate::testing::{InMemoryJobs, RecordingTransport, sample_job};

    fn dispatcher(jobs: InMemoryJobs, transport: Arc<RecordingTransport>) -> NotificationDispatcher {
        NotificationDispatcher::new(Arc::new(jobs), transport)
    }

    #[tokio::test]
    async fn test_push_success() {
        let transport = Arc::new(RecordingTransport::succeeding());
        let d = dispatcher(InMemoryJobs::with(vec![sample_job(42)]), transport.clone());

        let result = d.dispatch(42, Channel::Push).await.unwrap();

        assert!(result.success);
        assert_eq!(result.message, "Push notification sent successfully");
        assert_eq!(result.status, DeliveryStatus::Ok);
        assert_eq!(result.error, None);

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].channel, Channel::Push);
        assert_eq!(calls[0].job_id, 42);
        assert_eq!(calls[0].filter.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_sms_success() {
        let transport = Arc::new(RecordingTransport::succeeding());
        let d = dispatcher(InMemoryJobs::with(vec![sample_job(42)]), transport.clone());

        let result = d.dispatch(42, Channel::Sms).await.unwrap();

        assert!(result.success);
        assert_eq!(result.message, "SMS sent successfully");
        assert_eq!(result.status.code(), 200);
        assert_eq!(transport.calls()[0].channel, Channel::Sms);
        assert_eq!(transport.calls()[0].filter, None);
    }

    #[tokio::test]
    async fn test_missing_job_never_reaches_transport() {
        for channel in Channel::ALL {
            let transport = Arc::new(RecordingTransport::succeeding());
            let d = dispatcher(InMemoryJobs::default(), transport.clone());

            let result = d.dispatch(99, channel).await.unwrap();

            assert!(!result.success);
            assert_eq!(result.message, "Job not found");
            assert_eq!(result.status, DeliveryStatus::NotFound);
            assert!(result.error.as_deref().unwrap().contains("99"));
            assert!(transport.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_sms_transport_failure_keeps_detail() {
        let transport = Arc::new(RecordingTransport::failing("timeout"));
        let d = dispatcher(InMemoryJobs::with(vec![sample_job(42)]), transport);

        let result = d.dispatch(42, Channel::Sms).await.unwrap();

        assert_eq!(
            result,
            DeliveryResult {
                success: false,
                message: "SMS notification failed".to_string(),
                status: DeliveryStatus::InternalError,
                error: Some("timeout".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_push_transport_failure_message_is_fixed() {
        let transport = Arc::new(RecordingTransport::failing("provider rejected token"));
        let d = dispatcher(InMemoryJobs::with(vec![sample_job(42)]), transport);

        let result = d.dispatch(42, Channel::Push).await.unwrap();

        assert_eq!(result.status.code(), 500);
        assert_eq!(result.message, "Failed to send notification");
        assert_eq!(result.error.as_deref(), Some("provider rejected token"));
    }

    #[tokio::test]
    async fn test_repeated_failure_classifies_identically() {
        let transport = Arc::new(RecordingTransport::failing("gateway 503"));
        let d = dispatcher(InMemoryJobs::with(vec![sample_job(7)]), transport.clone());

        let first = d.dispatch(7, Channel::Push).await.unwrap();
        let second = d.dispatch(7, Channel::Push).await.unwrap();

        assert_eq!(first.status, second.status);
        assert_eq!(first.message, second.message);
        // One attempt per call
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let transport = Arc::new(RecordingTransport::succeeding());
        let d = dispatcher(InMemoryJobs::unavailable(), transport.clone());

        let result = d.dispatch(42, Channel::Push).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_projection_failure_is_not_a_delivery_result() {
        for channel in Channel::ALL {
            let transport = Arc::new(RecordingTransport::succeeding());
            let d = dispatcher(
                InMemoryJobs::projection_failing(vec![sample_job(42)]),
                transport.clone(),
            );

            let result = d.dispatch(42, channel).await;

            assert!(
                matches!(&result, Err(AppError::Internal(msg)) if msg == "meta read failed"),
                "{channel}: {result:?}"
            );
            assert!(transport.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_each_dispatch_refetches_job() {
        let jobs = Arc::new(InMemoryJobs::with(vec![sample_job(5)]));
        let transport = Arc::new(RecordingTransport::succeeding());
        let d = NotificationDispatcher::new(jobs.clone(), transport);

        d.dispatch(5, Channel::Sms).await.unwrap();
        d.dispatch(5, Channel::Push).await.unwrap();

        assert_eq!(jobs.find_count(), 2);
    }
}
