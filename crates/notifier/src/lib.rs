//! Translator notification resend: dispatcher, collaborator traits and the
//! HTTP relay transport.

pub mod dispatcher;
pub mod relay;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod transport;

pub use dispatcher::NotificationDispatcher;
pub use transport::{
    BROADCAST_FILTER, JobLookup, LockToken, LookupError, NotificationTransport, ResendGuard,
    TransportError,
};
