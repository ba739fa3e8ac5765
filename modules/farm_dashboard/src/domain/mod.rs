pub mod dashboard;
pub mod error;
pub mod events;
pub mod metrics;
pub mod notifications;
pub mod ports;
pub mod session;
pub mod sync;
pub mod view_state;
