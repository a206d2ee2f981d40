//! Authenticated session data.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Snapshot of the current login.
///
/// Only the session manager creates or clears a `Session`; everything else
/// sees it through a read-only context handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
	pub is_authenticated: bool,
	pub account: Option<Address>,
	pub chain_id: u64,
}

impl Session {
	/// Session for a freshly connected account.
	pub fn authenticated(account: Address, chain_id: u64) -> Self {
		Self {
			is_authenticated: true,
			account: Some(account),
			chain_id,
		}
	}

	/// Logged-out session for the configured chain.
	pub fn signed_out(chain_id: u64) -> Self {
		Self {
			is_authenticated: false,
			account: None,
			chain_id,
		}
	}
}

/// Profile details reported by the auth adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
	pub name: Option<String>,
	pub email: Option<String>,
	pub verifier: Option<String>,
	pub typed_login: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_session_constructors() {
		let account = Address::repeat_byte(0x11);
		let session = Session::authenticated(account, 1337);
		assert!(session.is_authenticated);
		assert_eq!(session.account, Some(account));
		assert_eq!(session.chain_id, 1337);

		let out = Session::signed_out(5);
		assert!(!out.is_authenticated);
		assert!(out.account.is_none());
		assert_eq!(out.chain_id, 5);
	}

	#[test]
	fn test_user_info_json_shape() {
		let info = UserInfo {
			name: Some("alice".into()),
			typed_login: Some("local".into()),
			..Default::default()
		};
		let json = serde_json::to_value(&info).unwrap();
		assert_eq!(json["name"], "alice");
		assert_eq!(json["typedLogin"], "local");
		assert!(json["email"].is_null());
	}
}
