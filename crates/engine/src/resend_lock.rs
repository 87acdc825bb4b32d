//! Redis-backed in-flight guard per job and channel.
//!
//! While one operator's resend for a job is being delivered, a second resend
//! for the same job and channel is refused instead of sending a duplicate.
//! The key carries a TTL so a crashed request cannot hold the lock forever.
//!
//! `SET NX EX` takes the lock with a fresh token; release is a Lua
//! compare-and-delete so only the token holder can drop it. The TTL must
//! exceed the relay timeout, otherwise a slow dispatch can outlive its lock.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use uuid::Uuid;

use booking_common::error::AppError;
use booking_common::types::Channel;
use booking_notifier::transport::{LockToken, ResendGuard};

/// Default lock TTL in seconds.
pub const DEFAULT_LOCK_SECONDS: u64 = 30;

const RELEASE_SCRIPT: &str = r#"
    if redis.call("GET", KEYS[1]) == ARGV[1] then
        return redis.call("DEL", KEYS[1])
    else
        return 0
    end
"#;

/// Redis-backed in-flight lock for notification resends.
#[derive(Clone)]
pub struct ResendLock {
    redis: ConnectionManager,
    ttl_seconds: u64,
}

impl ResendLock {
    pub fn new(redis: ConnectionManager, ttl_seconds: u64) -> Self {
        let ttl_seconds = if ttl_seconds == 0 {
            DEFAULT_LOCK_SECONDS
        } else {
            ttl_seconds
        };
        Self { redis, ttl_seconds }
    }

    fn key(job_id: i64, channel: Channel) -> String {
        format!("job:resend:{}:{}", job_id, channel)
    }
}

#[async_trait]
impl ResendGuard for ResendLock {
    async fn acquire(&self, job_id: i64, channel: Channel) -> Result<Option<LockToken>, AppError> {
        let key = Self::key(job_id, channel);
        let token = Uuid::new_v4().to_string();
        let mut redis = self.redis.clone();

        // Some("OK") when set, None when the key already exists
        let result: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&token)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut redis)
            .await?;

        if result.is_none() {
            tracing::debug!(job_id, %channel, "Resend refused, already in flight");
            return Ok(None);
        }

        Ok(Some(LockToken(token)))
    }

    async fn release(
        &self,
        job_id: i64,
        channel: Channel,
        token: &LockToken,
    ) -> Result<(), AppError> {
        let key = Self::key(job_id, channel);
        let mut redis = self.redis.clone();

        let deleted: i32 = redis::Script::new(RELEASE_SCRIPT)
            .key(&key)
            .arg(&token.0)
            .invoke_async(&mut redis)
            .await?;

        if deleted == 0 {
            tracing::warn!(job_id, %channel, "Resend lock expired before release");
        }

        Ok(())
    }
}
