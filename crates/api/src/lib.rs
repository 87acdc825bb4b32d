//! Booking API: notification resend and distance feed endpoints.
//!
//! Endpoints:
//! - GET  /health
//! - POST /api/jobs/{id}/resend-push
//! - POST /api/jobs/{id}/resend-sms
//! - POST /api/jobs/{id}/resend/{channel}
//! - POST /api/distance-feed

pub mod middleware;
pub mod routes;
pub mod state;
