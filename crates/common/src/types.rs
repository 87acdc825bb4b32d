use std::str::FromStr;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Booking lifecycle states as stored by the booking system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Assigned,
    Started,
    Completed,
    #[sqlx(rename = "withdrawbefore24")]
    #[serde(rename = "withdrawbefore24")]
    WithdrawBefore24,
    #[sqlx(rename = "withdrawafter24")]
    #[serde(rename = "withdrawafter24")]
    WithdrawAfter24,
    Timedout,
    #[sqlx(rename = "not_carried_out_customer")]
    #[serde(rename = "not_carried_out_customer")]
    NotCarriedOutCustomer,
    #[sqlx(rename = "not_carried_out_translator")]
    #[serde(rename = "not_carried_out_translator")]
    NotCarriedOutTranslator,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Assigned => write!(f, "assigned"),
            JobStatus::Started => write!(f, "started"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::WithdrawBefore24 => write!(f, "withdrawbefore24"),
            JobStatus::WithdrawAfter24 => write!(f, "withdrawafter24"),
            JobStatus::Timedout => write!(f, "timedout"),
            JobStatus::NotCarriedOutCustomer => write!(f, "not_carried_out_customer"),
            JobStatus::NotCarriedOutTranslator => write!(f, "not_carried_out_translator"),
        }
    }
}

/// Operator roles carried in API tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum UserType {
    Admin = 1,
    SuperAdmin = 2,
}

impl UserType {
    pub fn name(&self) -> &'static str {
        match self {
            UserType::Admin => "Admin",
            UserType::SuperAdmin => "Super Admin",
        }
    }
}

impl TryFrom<i32> for UserType {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(UserType::Admin),
            2 => Ok(UserType::SuperAdmin),
            other => Err(format!("unknown user type {}", other)),
        }
    }
}

impl From<UserType> for i32 {
    fn from(value: UserType) -> Self {
        value as i32
    }
}

/// A booking as read from the booking system, including its active translator assignment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: i64,
    /// Customer who placed the booking
    pub user_id: i64,
    pub from_language_id: i64,
    pub status: JobStatus,
    pub immediate: bool,
    /// Booked duration in minutes
    pub duration: i32,
    pub due: DateTime<Utc>,
    pub gender: Option<String>,
    pub certified: Option<String>,
    pub job_type: Option<String>,
    /// Translator currently assigned, if any
    pub translator_id: Option<i64>,
}

/// Customer profile fields the notification transport routes on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomerMeta {
    pub customer_town: Option<String>,
    pub customer_type: Option<String>,
}

/// Projection of a [`Job`] in the shape the notification transport expects.
///
/// Built fresh for every dispatch and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobData {
    pub job_id: i64,
    pub from_language_id: i64,
    pub immediate: bool,
    pub duration: i32,
    pub status: JobStatus,
    pub gender: Option<String>,
    pub certified: Option<String>,
    pub job_type: Option<String>,
    /// `YYYY-MM-DD`
    pub due_date: String,
    /// `HH:MM:SS`
    pub due_time: String,
    pub customer_town: Option<String>,
    pub customer_type: Option<String>,
    pub translator_id: Option<i64>,
}

impl JobData {
    pub fn from_job(job: &Job, meta: CustomerMeta) -> Self {
        Self {
            job_id: job.id,
            from_language_id: job.from_language_id,
            immediate: job.immediate,
            duration: job.duration,
            status: job.status,
            gender: job.gender.clone(),
            certified: job.certified.clone(),
            job_type: job.job_type.clone(),
            due_date: job.due.format("%Y-%m-%d").to_string(),
            due_time: job.due.format("%H:%M:%S").to_string(),
            customer_town: meta.customer_town,
            customer_type: meta.customer_type,
            translator_id: job.translator_id,
        }
    }
}

/// Notification channel a resend goes out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Push,
    Sms,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Push, Channel::Sms];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Push => "push",
            Channel::Sms => "sms",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = AppError;

    /// Case-insensitive; only `push` and `sms` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|channel| s.eq_ignore_ascii_case(channel.as_str()))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Invalid notification type '{}'. Valid types: push, sms",
                    s
                ))
            })
    }
}

/// Outcome class of a single dispatch, serialized as its HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u16")]
pub enum DeliveryStatus {
    /// Job resolved and the transport accepted the notification.
    Ok,
    /// The job id did not resolve; the transport was never called.
    NotFound,
    /// The transport call failed.
    InternalError,
}

impl DeliveryStatus {
    pub fn code(&self) -> u16 {
        self.http_status().as_u16()
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            DeliveryStatus::Ok => StatusCode::OK,
            DeliveryStatus::NotFound => StatusCode::NOT_FOUND,
            DeliveryStatus::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DeliveryStatus> for u16 {
    fn from(status: DeliveryStatus) -> Self {
        status.code()
    }
}

/// Uniform result of one notification resend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryResult {
    pub success: bool,
    pub message: String,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryResult {
    pub fn delivered(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            status: DeliveryStatus::Ok,
            error: None,
        }
    }

    pub fn job_not_found(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            message: "Job not found".to_string(),
            status: DeliveryStatus::NotFound,
            error: Some(detail.into()),
        }
    }

    pub fn transport_failed(message: &str, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            status: DeliveryStatus::InternalError,
            error: Some(detail.into()),
        }
    }
}
