//! Events raised by an auth adapter over the life of a session.

use serde::{Deserialize, Serialize};

/// Lifecycle notification from the wallet-auth boundary.
///
/// Adapters publish these on a broadcast channel; the session manager turns
/// them into state-machine transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AdapterEvent {
	/// A connection attempt has started.
	Connecting,
	/// The adapter holds an authorised chain handle.
	Connected,
	/// The session ended, either by logout or from the adapter side.
	Disconnected,
	/// The adapter failed; the message is for display only.
	Errored(String),
}

impl AdapterEvent {
	/// Stable lowercase name, as used in logs.
	pub fn name(&self) -> &'static str {
		match self {
			AdapterEvent::Connecting => "connecting",
			AdapterEvent::Connected => "connected",
			AdapterEvent::Disconnected => "disconnected",
			AdapterEvent::Errored(_) => "errored",
		}
	}
}
