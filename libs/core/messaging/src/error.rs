use thiserror::Error;

/// Errors surfaced by the queue port.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Broker connection failed. Fatal at process startup.
    #[error("Broker connection error: {0}")]
    Connection(#[from] async_nats::ConnectError),

    /// Stream declaration or lookup failed.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Publishing a message failed or timed out.
    #[error("Publish error: {0}")]
    Publish(String),

    /// Consumer registration or acknowledgement failed.
    #[error("Consumer error: {0}")]
    Consumer(String),

    /// Message could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A bounded operation exceeded its deadline.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl QueueError {
    pub fn stream_error(error: impl std::fmt::Display) -> Self {
        Self::Stream(error.to_string())
    }

    pub fn publish_error(error: impl std::fmt::Display) -> Self {
        Self::Publish(error.to_string())
    }

    pub fn consumer_error(error: impl std::fmt::Display) -> Self {
        Self::Consumer(error.to_string())
    }
}

/// Error returned by a message processor.
///
/// Any processing error causes the delivery to be negatively acknowledged
/// with requeue, so the broker redelivers it. Decode failures never reach
/// the processor; the port discards them as poison messages.
#[derive(Debug, Error)]
#[error("Processing failed: {0}")]
pub struct ProcessingError(pub String);

impl ProcessingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
