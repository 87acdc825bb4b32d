pub mod distance_feed;
pub mod jobs;
pub mod resend_lock;
