use crate::error::QueueError;
use crate::message::{MessageProcessor, Publisher, QueueMessage};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};
use tracing::{debug, warn};

/// In-process queue with the same observable semantics as the broker
/// binding: FIFO per queue, requeue on processing failure, poison discard
/// on decode failure.
///
/// Used in tests and anywhere a broker-free drop-in is needed. Messages do
/// not survive the process, so the durability guarantee is intentionally
/// absent.
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    queues: Arc<Mutex<HashMap<String, VecDeque<Vec<u8>>>>>,
    notify: Arc<Notify>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a queue. Idempotent.
    pub async fn declare(&self, queue: &str) -> Result<(), QueueError> {
        self.queues
            .lock()
            .await
            .entry(queue.to_string())
            .or_default();
        Ok(())
    }

    pub fn publisher(&self, queue: &str) -> InMemoryPublisher {
        InMemoryPublisher {
            queues: self.queues.clone(),
            notify: self.notify.clone(),
            queue: queue.to_string(),
        }
    }

    pub fn consumer(&self, queue: &str) -> InMemoryConsumer {
        InMemoryConsumer {
            queues: self.queues.clone(),
            notify: self.notify.clone(),
            queue: queue.to_string(),
        }
    }

    /// Number of messages currently waiting in a queue.
    pub async fn depth(&self, queue: &str) -> usize {
        self.queues
            .lock()
            .await
            .get(queue)
            .map(|q| q.len())
            .unwrap_or(0)
    }
}

/// Publisher half of [`InMemoryQueue`].
#[derive(Clone)]
pub struct InMemoryPublisher {
    queues: Arc<Mutex<HashMap<String, VecDeque<Vec<u8>>>>>,
    notify: Arc<Notify>,
    queue: String,
}

#[async_trait]
impl Publisher for InMemoryPublisher {
    async fn publish<M: QueueMessage>(&self, message: &M) -> Result<(), QueueError> {
        let payload = serde_json::to_vec(message)?;
        self.publish_raw(payload).await
    }
}

impl InMemoryPublisher {
    /// Publish raw bytes. Lets tests inject undecodable payloads.
    pub async fn publish_raw(&self, payload: Vec<u8>) -> Result<(), QueueError> {
        self.queues
            .lock()
            .await
            .entry(self.queue.clone())
            .or_default()
            .push_back(payload);
        self.notify.notify_one();
        Ok(())
    }
}

/// Consumer half of [`InMemoryQueue`].
pub struct InMemoryConsumer {
    queues: Arc<Mutex<HashMap<String, VecDeque<Vec<u8>>>>>,
    notify: Arc<Notify>,
    queue: String,
}

impl InMemoryConsumer {
    /// Settle at most one delivery. Returns `Ok(false)` when the queue is
    /// empty.
    pub async fn process_next<M, P>(&self, processor: &P) -> Result<bool, QueueError>
    where
        M: QueueMessage,
        P: MessageProcessor<M>,
    {
        let payload = {
            let mut queues = self.queues.lock().await;
            queues.get_mut(&self.queue).and_then(|q| q.pop_front())
        };

        let Some(payload) = payload else {
            return Ok(false);
        };

        match serde_json::from_slice::<M>(&payload) {
            Err(e) => {
                warn!(error = %e, "Discarding message that failed to decode");
                Ok(true)
            }
            Ok(message) => match processor.process(&message).await {
                Ok(()) => {
                    debug!(message_id = %message.message_id(), "Message acked");
                    Ok(true)
                }
                Err(e) => {
                    warn!(
                        message_id = %message.message_id(),
                        error = %e,
                        "Processing failed, requeueing"
                    );
                    self.queues
                        .lock()
                        .await
                        .entry(self.queue.clone())
                        .or_default()
                        .push_front(payload);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(true)
                }
            },
        }
    }

    /// Run the consume loop until the shutdown signal fires.
    pub async fn consume<M, P>(
        &self,
        processor: P,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), QueueError>
    where
        M: QueueMessage,
        P: MessageProcessor<M>,
    {
        loop {
            while self.process_next::<M, P>(&processor).await? {}

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(());
                    }
                }
                _ = self.notify.notified() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::testing::{RecordingProcessor, TestMessage};
    use crate::message::Publisher as _;
    use std::sync::atomic::Ordering;

    fn message(id: &str) -> TestMessage {
        TestMessage {
            id: id.to_string(),
            body: format!("body-{}", id),
        }
    }

    #[tokio::test]
    async fn test_declare_is_idempotent() {
        let queue = InMemoryQueue::new();
        queue.declare("notifications").await.unwrap();
        queue.publisher("notifications").publish(&message("m1")).await.unwrap();
        queue.declare("notifications").await.unwrap();

        assert_eq!(queue.depth("notifications").await, 1);
    }

    #[tokio::test]
    async fn test_fifo_round_trip() {
        let queue = InMemoryQueue::new();
        queue.declare("notifications").await.unwrap();

        let publisher = queue.publisher("notifications");
        publisher.publish(&message("first")).await.unwrap();
        publisher.publish(&message("second")).await.unwrap();

        let consumer = queue.consumer("notifications");
        let processor = RecordingProcessor::default();

        assert!(consumer.process_next(&processor).await.unwrap());
        assert!(consumer.process_next(&processor).await.unwrap());
        assert!(!consumer.process_next(&processor).await.unwrap());

        let processed = processor.processed.lock().unwrap();
        assert_eq!(processed.len(), 2);
        assert_eq!(processed[0].id, "first");
        assert_eq!(processed[1].id, "second");
        drop(processed);

        assert_eq!(queue.depth("notifications").await, 0);
    }

    #[tokio::test]
    async fn test_processing_failure_requeues_at_front() {
        let queue = InMemoryQueue::new();
        queue.declare("notifications").await.unwrap();

        let publisher = queue.publisher("notifications");
        publisher.publish(&message("retried")).await.unwrap();
        publisher.publish(&message("behind")).await.unwrap();

        let consumer = queue.consumer("notifications");
        let processor = RecordingProcessor::failing(1);

        // First delivery fails and goes back to the front of the queue.
        assert!(consumer.process_next(&processor).await.unwrap());
        assert_eq!(queue.depth("notifications").await, 2);

        // Redelivery succeeds, FIFO order preserved.
        assert!(consumer.process_next(&processor).await.unwrap());
        assert!(consumer.process_next(&processor).await.unwrap());

        assert_eq!(processor.attempts.load(Ordering::SeqCst), 3);
        let processed = processor.processed.lock().unwrap();
        assert_eq!(processed[0].id, "retried");
        assert_eq!(processed[1].id, "behind");
    }

    #[tokio::test]
    async fn test_poison_message_discarded_without_requeue() {
        let queue = InMemoryQueue::new();
        queue.declare("notifications").await.unwrap();

        let publisher = queue.publisher("notifications");
        publisher.publish_raw(b"not json".to_vec()).await.unwrap();
        publisher.publish(&message("valid")).await.unwrap();

        let consumer = queue.consumer("notifications");
        let processor = RecordingProcessor::default();

        // Poison delivery settles without reaching the processor.
        assert!(consumer
            .process_next::<TestMessage, _>(&processor)
            .await
            .unwrap());
        assert_eq!(queue.depth("notifications").await, 1);
        assert!(processor.processed.lock().unwrap().is_empty());

        // The next delivery is unaffected.
        assert!(consumer.process_next(&processor).await.unwrap());
        assert_eq!(processor.processed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_consume_loop_stops_on_shutdown() {
        let queue = InMemoryQueue::new();
        queue.declare("notifications").await.unwrap();
        queue.publisher("notifications").publish(&message("m1")).await.unwrap();

        let consumer = queue.consumer("notifications");
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let processor = RecordingProcessor::default();
            consumer
                .consume::<TestMessage, _>(processor, shutdown_rx)
                .await
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();

        handle.await.unwrap().unwrap();
        assert_eq!(queue.depth("notifications").await, 0);
    }
}
