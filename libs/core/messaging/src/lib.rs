//! Queue port for the calendar notification pipeline.
//!
//! The scheduler and sender processes talk to the broker exclusively
//! through this crate: a durable FIFO of JSON messages with explicit
//! acknowledgement, redelivery on processing failure, and poison-message
//! discard on decode failure.
//!
//! Two implementations share the contract:
//! - [`NatsQueue`] — NATS JetStream binding (durable streams, pull
//!   consumers with one unacked message at a time).
//! - [`InMemoryQueue`] — in-process implementation with the same
//!   observable semantics, for tests.
//!
//! Delivery guarantee is at-least-once; processors must tolerate replay.

mod config;
mod error;
mod memory;
mod message;
mod nats;

pub use config::NatsConfig;
pub use error::{ProcessingError, QueueError};
pub use memory::{InMemoryConsumer, InMemoryPublisher, InMemoryQueue};
pub use message::{MessageProcessor, Publisher, QueueMessage};
pub use nats::{NatsConsumer, NatsPublisher, NatsQueue};
