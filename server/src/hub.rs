//! Broadcast hub for live observer channels.
//!
//! The hub exclusively owns the membership set. Delivery to one observer
//! never blocks or fails delivery to the others: each observer gets its own
//! FIFO channel, and a channel whose receiver is gone is deregistered during
//! the broadcast instead of failing the call.

use homelink_shared::StateEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// A live subscription handed to the transport layer.
///
/// Dropping the receiver is equivalent to leaving: the next broadcast
/// notices the closed channel and deregisters it.
pub struct ObserverChannel {
    pub id: u64,
    pub receiver: mpsc::UnboundedReceiver<StateEvent>,
}

/// Fan-out registry for all connected observers
#[derive(Default)]
pub struct BroadcastHub {
    observers: RwLock<HashMap<u64, mpsc::UnboundedSender<StateEvent>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    /// Create a hub with no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer and return its channel
    pub async fn join(&self) -> ObserverChannel {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut observers = self.observers.write().await;
        observers.insert(id, sender);

        ObserverChannel { id, receiver }
    }

    /// Deregister an observer. Idempotent; unknown ids are ignored.
    pub async fn leave(&self, id: u64) {
        let mut observers = self.observers.write().await;
        observers.remove(&id);
    }

    /// Deliver an event to every currently joined observer.
    ///
    /// Observers joining mid-broadcast may or may not receive this event but
    /// will receive all subsequent ones. Dead channels are removed from
    /// membership rather than surfaced as errors.
    pub async fn broadcast(&self, event: &StateEvent) {
        let dead: Vec<u64> = {
            let observers = self.observers.read().await;
            observers
                .iter()
                .filter(|(_, sender)| sender.send(event.clone()).is_err())
                .map(|(id, _)| *id)
                .collect()
        };

        for id in dead {
            debug!("Removing closed observer channel {}", id);
            self.leave(id).await;
        }
    }

    /// Get the number of joined observers
    pub async fn count(&self) -> usize {
        self.observers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelink_shared::EventKind;
    use serde_json::json;

    fn event(device_id: &str) -> StateEvent {
        StateEvent {
            device_id: device_id.into(),
            kind: EventKind::Status,
            data: json!({"open": true}),
        }
    }

    #[tokio::test]
    async fn test_joined_observer_receives_broadcast() {
        let hub = BroadcastHub::new();
        let mut observer = hub.join().await;

        hub.broadcast(&event("door-01")).await;

        let received = observer.receiver.recv().await.expect("event delivered");
        assert_eq!(received.device_id, "door-01");
    }

    #[tokio::test]
    async fn test_all_observers_receive_each_event() {
        let hub = BroadcastHub::new();
        let mut a = hub.join().await;
        let mut b = hub.join().await;

        hub.broadcast(&event("door-01")).await;

        assert_eq!(a.receiver.recv().await.unwrap().device_id, "door-01");
        assert_eq!(b.receiver.recv().await.unwrap().device_id, "door-01");
    }

    #[tokio::test]
    async fn test_events_arrive_in_broadcast_order() {
        let hub = BroadcastHub::new();
        let mut observer = hub.join().await;

        hub.broadcast(&event("first")).await;
        hub.broadcast(&event("second")).await;

        assert_eq!(observer.receiver.recv().await.unwrap().device_id, "first");
        assert_eq!(observer.receiver.recv().await.unwrap().device_id, "second");
    }

    #[tokio::test]
    async fn test_dead_observer_does_not_break_broadcast() {
        let hub = BroadcastHub::new();
        let dead = hub.join().await;
        let mut alive = hub.join().await;

        // Simulate a failed delivery target by dropping the receiver
        drop(dead.receiver);

        hub.broadcast(&event("door-01")).await;

        assert_eq!(alive.receiver.recv().await.unwrap().device_id, "door-01");
        // The dead channel was deregistered during the broadcast
        assert_eq!(hub.count().await, 1);
    }

    #[tokio::test]
    async fn test_left_observer_receives_nothing_more() {
        let hub = BroadcastHub::new();
        let mut observer = hub.join().await;

        hub.broadcast(&event("before")).await;
        hub.leave(observer.id).await;
        hub.broadcast(&event("after")).await;

        assert_eq!(observer.receiver.recv().await.unwrap().device_id, "before");
        // Sender side is gone, so the channel terminates instead of delivering
        assert!(observer.receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_leave_is_idempotent() {
        let hub = BroadcastHub::new();
        let observer = hub.join().await;

        hub.leave(observer.id).await;
        hub.leave(observer.id).await;
        assert_eq!(hub.count().await, 0);
    }
}
