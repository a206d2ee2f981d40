//! Broadcast channel that adapters use to report lifecycle events.

use dapp_types::AdapterEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Fan-out of [`AdapterEvent`]s to any number of subscribers.
///
/// Events published while nobody is subscribed are dropped.
#[derive(Clone)]
pub struct AdapterEventBus {
	sender: broadcast::Sender<AdapterEvent>,
}

impl AdapterEventBus {
	/// Creates a bus buffering up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
		self.sender.subscribe()
	}

	/// Publishes `event` and returns how many subscribers received it.
	pub fn publish(&self, event: AdapterEvent) -> usize {
		let name = event.name();
		let delivered = self.sender.send(event).unwrap_or(0);
		trace!(event = name, delivered, "Published adapter event");
		delivered
	}
}

impl Default for AdapterEventBus {
	fn default() -> Self {
		Self::new(32)
	}
}
