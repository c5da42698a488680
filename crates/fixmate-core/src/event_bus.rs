//! In-process event bus for lifecycle events.
//!
//! Lifecycle handlers publish [`MarketEvent`]s as they mutate orders; the
//! engine's run loop subscribes and forwards them to the notification
//! channels. Publishing never blocks and never fails the publisher: with no
//! subscriber the event is simply dropped, and a slow subscriber that falls
//! behind the channel capacity loses the oldest events, which is acceptable
//! for best-effort notifications.

use fixmate_types::MarketEvent;
use tokio::sync::broadcast;

/// Default buffered capacity of the bus.
const DEFAULT_CAPACITY: usize = 1024;

/// Broadcast bus carrying lifecycle events between services.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<MarketEvent>,
}

impl EventBus {
	/// Creates a new bus with the given buffered capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	pub fn publish(&self, event: MarketEvent) {
		// A send error only means nobody is subscribed right now.
		let _ = self.sender.send(event);
	}

	/// Creates a new subscription receiving all events published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fixmate_types::{SupplyEvent, SupplyOrderStatus};

	#[tokio::test]
	async fn subscribers_receive_published_events() {
		let bus = EventBus::default();
		let mut rx = bus.subscribe();

		bus.publish(MarketEvent::Supply(SupplyEvent::StatusChanged {
			order_id: "so-1".into(),
			from: SupplyOrderStatus::Pending,
			to: SupplyOrderStatus::Confirmed,
		}));

		match rx.recv().await.unwrap() {
			MarketEvent::Supply(SupplyEvent::StatusChanged { order_id, .. }) => {
				assert_eq!(order_id, "so-1");
			},
			other => panic!("unexpected event: {:?}", other),
		}
	}

	#[test]
	fn publishing_without_subscribers_is_fine() {
		let bus = EventBus::default();
		bus.publish(MarketEvent::Supply(SupplyEvent::Deleted {
			order_id: "so-2".into(),
		}));
	}
}
