use crate::config::NatsConfig;
use crate::error::QueueError;
use crate::message::{MessageProcessor, Publisher, QueueMessage};
use async_trait::async_trait;
use async_nats::jetstream::consumer::pull::Config as PullConfig;
use async_nats::jetstream::consumer::{AckPolicy, Consumer};
use async_nats::jetstream::stream::{Config as StreamConfig, RetentionPolicy};
use async_nats::jetstream::{AckKind, Context};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Upper bound for a single publish, including the broker acknowledgement.
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// How long an empty fetch blocks before the consume loop re-checks its
/// shutdown signal.
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// NATS JetStream binding of the queue port.
///
/// One queue maps to one durable work-queue stream whose single subject is
/// the queue name. Messages survive broker restarts and are removed only
/// on acknowledgement.
pub struct NatsQueue {
    client: async_nats::Client,
    jetstream: Context,
}

impl NatsQueue {
    /// Connect to the broker. Connection failure is fatal at startup.
    pub async fn connect(config: &NatsConfig) -> Result<Self, QueueError> {
        let mut options = async_nats::ConnectOptions::new().name("calendar");
        if let Some((user, password)) = config.credentials() {
            options = options.user_and_password(user, password);
        }

        let client = options.connect(config.url()).await?;
        let jetstream = async_nats::jetstream::new(client.clone());

        info!(url = %config.url(), "Connected to NATS");

        Ok(Self { client, jetstream })
    }

    /// Declare a durable queue. Idempotent: an existing stream is left
    /// untouched.
    pub async fn declare(&self, queue: &str) -> Result<(), QueueError> {
        match self.jetstream.get_stream(queue).await {
            Ok(_) => {
                debug!(queue = %queue, "Queue already declared");
                Ok(())
            }
            Err(_) => {
                self.jetstream
                    .create_stream(StreamConfig {
                        name: queue.to_string(),
                        subjects: vec![queue.to_string()],
                        retention: RetentionPolicy::WorkQueue,
                        ..Default::default()
                    })
                    .await
                    .map_err(QueueError::stream_error)?;

                info!(queue = %queue, "Queue declared");
                Ok(())
            }
        }
    }

    /// Publisher handle for a queue.
    pub fn publisher(&self, queue: &str) -> NatsPublisher {
        NatsPublisher {
            jetstream: self.jetstream.clone(),
            queue: queue.to_string(),
        }
    }

    /// Consumer handle for a queue.
    pub fn consumer(&self, queue: &str) -> NatsConsumer {
        NatsConsumer {
            jetstream: self.jetstream.clone(),
            queue: queue.to_string(),
            durable_name: format!("{}-workers", queue),
        }
    }

    /// Flush pending operations and release the connection.
    pub async fn close(self) -> Result<(), QueueError> {
        self.client
            .flush()
            .await
            .map_err(QueueError::stream_error)?;
        Ok(())
    }
}

/// Publishes JSON messages to one queue.
#[derive(Clone)]
pub struct NatsPublisher {
    jetstream: Context,
    queue: String,
}

#[async_trait]
impl Publisher for NatsPublisher {
    /// Publish a message, waiting for the broker acknowledgement with a
    /// bounded timeout.
    async fn publish<M: QueueMessage>(&self, message: &M) -> Result<(), QueueError> {
        let payload = serde_json::to_vec(message)?;

        let publish = async {
            let ack = self
                .jetstream
                .publish(self.queue.clone(), payload.into())
                .await
                .map_err(QueueError::publish_error)?
                .await
                .map_err(QueueError::publish_error)?;
            Ok::<u64, QueueError>(ack.sequence)
        };

        match tokio::time::timeout(PUBLISH_TIMEOUT, publish).await {
            Ok(result) => {
                let sequence = result?;
                debug!(
                    queue = %self.queue,
                    message_id = %message.message_id(),
                    sequence,
                    "Published message"
                );
                Ok(())
            }
            Err(_) => Err(QueueError::Timeout(format!(
                "publish to '{}' exceeded {:?}",
                self.queue, PUBLISH_TIMEOUT
            ))),
        }
    }
}

/// Consumes one queue with manual acknowledgement.
pub struct NatsConsumer {
    jetstream: Context,
    queue: String,
    durable_name: String,
}

impl NatsConsumer {
    /// Ensure the durable consumer exists, creating it if necessary.
    ///
    /// `max_ack_pending = 1` holds consumption to one unacked message at a
    /// time across all processes sharing the durable name.
    async fn ensure_consumer(&self) -> Result<Consumer<PullConfig>, QueueError> {
        let stream = self
            .jetstream
            .get_stream(&self.queue)
            .await
            .map_err(QueueError::stream_error)?;

        match stream.get_consumer::<PullConfig>(&self.durable_name).await {
            Ok(consumer) => Ok(consumer),
            Err(_) => {
                info!(
                    queue = %self.queue,
                    consumer = %self.durable_name,
                    "Creating durable consumer"
                );

                stream
                    .create_consumer(PullConfig {
                        durable_name: Some(self.durable_name.clone()),
                        ack_policy: AckPolicy::Explicit,
                        max_ack_pending: 1,
                        filter_subject: self.queue.clone(),
                        ..Default::default()
                    })
                    .await
                    .map_err(QueueError::consumer_error)
            }
        }
    }

    /// Run the consume loop until the shutdown signal fires.
    ///
    /// Per delivery: decode failure → Term (poison message discarded,
    /// never redelivered); processor failure → Nak (redelivered);
    /// processor success → ack.
    pub async fn consume<M, P>(
        &self,
        processor: P,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), QueueError>
    where
        M: QueueMessage,
        P: MessageProcessor<M>,
    {
        let consumer = self.ensure_consumer().await?;

        info!(
            queue = %self.queue,
            processor = processor.name(),
            "Consumer started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                result = self.next_delivery(&consumer, &processor) => {
                    if let Err(e) = result {
                        error!(error = %e, "Error handling delivery");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        info!(queue = %self.queue, "Consumer stopped");
        Ok(())
    }

    /// Fetch at most one message and settle it.
    async fn next_delivery<M, P>(
        &self,
        consumer: &Consumer<PullConfig>,
        processor: &P,
    ) -> Result<(), QueueError>
    where
        M: QueueMessage,
        P: MessageProcessor<M>,
    {
        let mut batch = consumer
            .fetch()
            .max_messages(1)
            .expires(FETCH_TIMEOUT)
            .messages()
            .await
            .map_err(QueueError::consumer_error)?;

        while let Some(delivery) = batch.next().await {
            let delivery = match delivery {
                Ok(delivery) => delivery,
                Err(e) => {
                    warn!(error = %e, "Error receiving delivery");
                    continue;
                }
            };

            match serde_json::from_slice::<M>(&delivery.payload) {
                Err(e) => {
                    warn!(error = %e, "Discarding message that failed to decode");
                    if let Err(ack_err) = delivery.ack_with(AckKind::Term).await {
                        warn!(error = %ack_err, "Failed to terminate poison message");
                    }
                }
                Ok(message) => match processor.process(&message).await {
                    Ok(()) => {
                        delivery.ack().await.map_err(QueueError::consumer_error)?;
                        debug!(message_id = %message.message_id(), "Message acked");
                    }
                    Err(e) => {
                        warn!(
                            message_id = %message.message_id(),
                            error = %e,
                            "Processing failed, requeueing"
                        );
                        delivery
                            .ack_with(AckKind::Nak(None))
                            .await
                            .map_err(QueueError::consumer_error)?;
                    }
                },
            }
        }

        Ok(())
    }
}
