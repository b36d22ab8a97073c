use crate::error::{ProcessingError, QueueError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// A message that can travel through a queue.
///
/// Messages are serialized as UTF-8 JSON on the wire. The id is only used
/// for logging and correlation; it carries no delivery semantics.
pub trait QueueMessage: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Stable identifier for logging.
    fn message_id(&self) -> String;
}

/// Handler invoked once per delivered message.
///
/// Returning `Ok` acknowledges the delivery; returning `Err` negatively
/// acknowledges it with requeue, so the broker delivers it again. Because
/// delivery is at-least-once, implementations MUST be idempotent under
/// replay.
#[async_trait]
pub trait MessageProcessor<M: QueueMessage>: Send + Sync {
    async fn process(&self, message: &M) -> Result<(), ProcessingError>;

    /// Processor name for logging.
    fn name(&self) -> &'static str;
}

/// Publisher half of the queue port.
///
/// Implemented by the broker binding and the in-process queue so callers
/// (the scheduler, tests) stay backend-agnostic.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish one message, waiting for the queue to accept it.
    async fn publish<M: QueueMessage>(&self, message: &M) -> Result<(), QueueError>;
}
