//! Notifications Domain
//!
//! The consuming half of the notification pipeline: the wire message the
//! scheduler publishes, the processor the sender runs for every delivery,
//! and the audit store that records delivery status.
//!
//! The processor is idempotent under replay: the queue delivers
//! at-least-once, so a redelivered notification simply produces another
//! audit row and STDOUT line.

pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod processor;
pub mod repository;

pub use error::{NotificationError, NotificationResult};
pub use models::{Notification, NotificationRecord, NotificationStatus};
pub use postgres::PgNotificationRepository;
pub use processor::NotificationProcessor;
pub use repository::{InMemoryNotificationRepository, NotificationRepository};
