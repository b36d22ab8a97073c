//! The periodic notification scan.

use chrono::Utc;
use domain_events::{CalendarService, EventRepository};
use domain_notifications::Notification;
use messaging::Publisher;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Events older than this are hard-deleted on every tick, regardless of
/// notification state.
pub const RETENTION_WINDOW_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Periodic loop over the shared event store.
///
/// Each tick scans for events whose notification window is open, publishes
/// one message per event, and purges events past the retention window.
/// There is no persisted notified-flag: an event still inside its window
/// on the next tick is published again, and consumers are idempotent.
pub struct Scheduler<R: EventRepository, P: Publisher> {
    service: CalendarService<R>,
    publisher: P,
}

impl<R: EventRepository, P: Publisher> Scheduler<R, P> {
    pub fn new(service: CalendarService<R>, publisher: P) -> Self {
        Self { service, publisher }
    }

    /// Run ticks until the shutdown signal fires. The first tick runs
    /// immediately; the loop exits between ticks.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_seconds = interval.as_secs(), "Scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_tick(Utc::now().timestamp()).await;
                }

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }

    /// One scan-and-publish pass at instant `now`. Errors are logged and
    /// never abort the loop: an unpublished event is retried on the next
    /// tick for as long as its window stays open.
    pub async fn run_tick(&self, now: i64) {
        match self.service.events_for_notification(now).await {
            Err(e) => {
                error!(error = %e, "Failed to scan for notifications");
            }
            Ok(events) => {
                info!(count = events.len(), now, "Found events for notification");

                for event in events {
                    let notification = Notification::new(
                        event.id,
                        event.title.clone(),
                        event.start_time,
                        event.user_id,
                    );

                    if let Err(e) = self.publisher.publish(&notification).await {
                        error!(event_id = %event.id, error = %e, "Failed to publish notification");
                        continue;
                    }

                    info!(
                        event_id = %event.id,
                        user_id = %event.user_id,
                        start_time = event.start_time,
                        "Notification enqueued"
                    );
                }
            }
        }

        match self
            .service
            .delete_old_events(now - RETENTION_WINDOW_SECONDS)
            .await
        {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed, "Old events purged");
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to purge old events");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain_events::{CreateEvent, InMemoryEventRepository};
    use messaging::{InMemoryQueue, QueueError, QueueMessage};
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    const QUEUE: &str = "notifications";

    fn create_input(user_id: Uuid, start_time: i64, notify_before: Option<i64>) -> CreateEvent {
        CreateEvent {
            id: None,
            title: "Scheduled".to_string(),
            description: String::new(),
            user_id,
            start_time,
            end_time: start_time + 60,
            notify_before,
        }
    }

    async fn setup() -> (CalendarService<InMemoryEventRepository>, InMemoryQueue) {
        let queue = InMemoryQueue::new();
        queue.declare(QUEUE).await.unwrap();
        let service = CalendarService::new(InMemoryEventRepository::new());
        (service, queue)
    }

    #[tokio::test]
    async fn test_tick_publishes_events_in_open_windows() {
        let (service, queue) = setup().await;
        let user_id = Uuid::new_v4();

        let in_window = service
            .create_event(create_input(user_id, 1000, Some(60)))
            .await
            .unwrap();
        // Window not open yet
        service
            .create_event(create_input(user_id, 5000, Some(60)))
            .await
            .unwrap();
        // No notification requested
        service
            .create_event(create_input(user_id, 1500, None))
            .await
            .unwrap();

        let scheduler = Scheduler::new(service, queue.publisher(QUEUE));
        scheduler.run_tick(950).await;

        assert_eq!(queue.depth(QUEUE).await, 1);

        // The published message carries the event fields verbatim.
        let consumer = queue.consumer(QUEUE);
        let captured = CapturingProcessor::default();
        assert!(consumer.process_next(&captured).await.unwrap());
        let messages = captured.messages.lock().unwrap();
        assert_eq!(messages[0].event_id, in_window.id);
        assert_eq!(messages[0].title, "Scheduled");
        assert_eq!(messages[0].event_time, 1000);
        assert_eq!(messages[0].user_id, user_id);
    }

    #[tokio::test]
    async fn test_tick_republishes_while_window_open() {
        let (service, queue) = setup().await;

        service
            .create_event(create_input(Uuid::new_v4(), 1000, Some(500)))
            .await
            .unwrap();

        let scheduler = Scheduler::new(service, queue.publisher(QUEUE));
        scheduler.run_tick(600).await;
        scheduler.run_tick(700).await;

        // No notified-flag: each tick inside the window publishes again.
        assert_eq!(queue.depth(QUEUE).await, 2);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_abort_tick() {
        let (service, queue) = setup().await;
        let user_id = Uuid::new_v4();

        service
            .create_event(create_input(user_id, 1000, Some(500)))
            .await
            .unwrap();
        service
            .create_event(create_input(user_id, 1001, Some(500)))
            .await
            .unwrap();

        let flaky = FlakyPublisher {
            inner: queue.publisher(QUEUE),
            failures_left: AtomicU32::new(1),
        };

        let scheduler = Scheduler::new(service.clone(), flaky);
        scheduler.run_tick(600).await;

        // First publish failed, second one still went out.
        assert_eq!(queue.depth(QUEUE).await, 1);

        // The failed event is still eligible on the next tick.
        let eligible = service.events_for_notification(600).await.unwrap();
        assert_eq!(eligible.len(), 2);
    }

    #[tokio::test]
    async fn test_tick_purges_events_past_retention() {
        let (service, queue) = setup().await;
        let user_id = Uuid::new_v4();

        let now = 400 * 24 * 60 * 60;
        service
            .create_event(create_input(user_id, 0, None))
            .await
            .unwrap();
        let recent = service
            .create_event(create_input(user_id, now - 1000, None))
            .await
            .unwrap();

        let scheduler = Scheduler::new(service.clone(), queue.publisher(QUEUE));
        scheduler.run_tick(now).await;

        let remaining = service.list_events(user_id).await.unwrap();
        assert_eq!(remaining, vec![recent]);
    }

    #[derive(Default)]
    struct CapturingProcessor {
        messages: std::sync::Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl messaging::MessageProcessor<Notification> for CapturingProcessor {
        async fn process(
            &self,
            message: &Notification,
        ) -> Result<(), messaging::ProcessingError> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "capturing_processor"
        }
    }

    struct FlakyPublisher {
        inner: messaging::InMemoryPublisher,
        failures_left: AtomicU32,
    }

    #[async_trait]
    impl Publisher for FlakyPublisher {
        async fn publish<M: QueueMessage>(&self, message: &M) -> Result<(), QueueError> {
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(QueueError::Publish("broker unavailable".to_string()));
            }
            self.inner.publish(message).await
        }
    }
}
