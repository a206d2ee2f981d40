//! On-page debug console.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::trace;

/// Keeps the last message written by a page, as pretty JSON `[label, payload]`.
#[derive(Debug, Clone)]
pub struct DebugConsole {
	enabled: bool,
	last: Option<String>,
}

impl Default for DebugConsole {
	fn default() -> Self {
		Self::new(true)
	}
}

impl DebugConsole {
	/// A disabled console still records; it is just not rendered.
	pub fn new(enabled: bool) -> Self {
		Self {
			enabled,
			last: None,
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Replaces the console content with `[label, payload]`.
	pub fn log<T: Serialize>(&mut self, label: &str, payload: T) {
		let value = serde_json::to_value(payload).unwrap_or_else(|e| Value::String(e.to_string()));
		let rendered = serde_json::to_string_pretty(&json!([label, value]))
			.unwrap_or_else(|_| format!("[\"{label}\"]"));
		trace!(label, "Console updated");
		self.last = Some(rendered);
	}

	pub fn last(&self) -> Option<&str> {
		self.last.as_deref()
	}

	pub fn clear(&mut self) {
		self.last = None;
	}

	/// Rendered console block, or `None` when disabled.
	pub fn render(&self) -> Option<String> {
		if !self.enabled {
			return None;
		}
		Some(self.last.clone().unwrap_or_else(|| "(empty)".to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use dapp_types::TokenRecord;

	#[test]
	fn test_keeps_last_message_only() {
		let mut console = DebugConsole::default();
		assert_eq!(console.render().as_deref(), Some("(empty)"));

		console.log("first", 1);
		console.log("second", "payload");
		assert_eq!(
			console.last(),
			Some("[\n  \"second\",\n  \"payload\"\n]")
		);
	}

	#[test]
	fn test_structured_payload() {
		let mut console = DebugConsole::default();
		console.log("tokens", vec![TokenRecord::new("7", "dragon", "0")]);

		let parsed: Value = serde_json::from_str(console.last().unwrap()).unwrap();
		assert_eq!(parsed[0], "tokens");
		assert_eq!(parsed[1][0]["tokenId"], "7");
		assert_eq!(parsed[1][0]["tokenType"], "dragon");
	}

	#[test]
	fn test_disabled_console_is_not_rendered() {
		let mut console = DebugConsole::new(false);
		console.log("hidden", true);
		assert!(console.render().is_none());
		assert!(console.last().is_some());
	}
}
