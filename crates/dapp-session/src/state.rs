//! Session lifecycle state machine.
//!
//! `Uninitialized -> Initializing -> Ready -> Connecting -> Connected -> Disconnected`,
//! with `Connecting -> Ready` for failed logins and `Disconnected -> Connecting`
//! for logging in again. Transitions are a pure function of the current
//! state and a [`SessionEvent`], so they can be checked without an adapter.

use alloy_primitives::Address;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStateError {
	#[error("Invalid session transition from {from} on {event}")]
	InvalidTransition { from: SessionState, event: String },
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
	#[default]
	Uninitialized,
	Initializing,
	/// Initialised and logged out. Also the landing state when init failed.
	Ready,
	Connecting,
	Connected(Address),
	Disconnected,
}

impl SessionState {
	/// Whether adapter init has run (successfully or not).
	pub fn is_initialized(&self) -> bool {
		!matches!(self, SessionState::Uninitialized | SessionState::Initializing)
	}

	/// Whether an operation is in flight.
	pub fn is_loading(&self) -> bool {
		matches!(self, SessionState::Initializing | SessionState::Connecting)
	}

	pub fn account(&self) -> Option<Address> {
		match self {
			SessionState::Connected(account) => Some(*account),
			_ => None,
		}
	}

	fn kind(&self) -> StateKind {
		match self {
			SessionState::Uninitialized => StateKind::Uninitialized,
			SessionState::Initializing => StateKind::Initializing,
			SessionState::Ready => StateKind::Ready,
			SessionState::Connecting => StateKind::Connecting,
			SessionState::Connected(_) => StateKind::Connected,
			SessionState::Disconnected => StateKind::Disconnected,
		}
	}

	/// Computes the state that `event` leads to from `self`.
	///
	/// # Errors
	///
	/// Returns [`SessionStateError::InvalidTransition`] when the event is not
	/// accepted in the current state; `self` is left as it was.
	pub fn apply(&self, event: &SessionEvent) -> Result<SessionState, SessionStateError> {
		let next = match event {
			SessionEvent::InitStarted => SessionState::Initializing,
			SessionEvent::InitCompleted | SessionEvent::InitFailed(_) => SessionState::Ready,
			SessionEvent::LoginStarted => SessionState::Connecting,
			SessionEvent::LoginSucceeded(account) => SessionState::Connected(*account),
			SessionEvent::LoginFailed(_) => SessionState::Ready,
			SessionEvent::LoggedOut => SessionState::Disconnected,
		};

		if is_valid_transition(self.kind(), next.kind()) {
			Ok(next)
		} else {
			Err(SessionStateError::InvalidTransition {
				from: self.clone(),
				event: event.to_string(),
			})
		}
	}
}

impl fmt::Display for SessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SessionState::Uninitialized => write!(f, "Uninitialized"),
			SessionState::Initializing => write!(f, "Initializing"),
			SessionState::Ready => write!(f, "Ready"),
			SessionState::Connecting => write!(f, "Connecting"),
			SessionState::Connected(account) => write!(f, "Connected({account})"),
			SessionState::Disconnected => write!(f, "Disconnected"),
		}
	}
}

/// Inputs that drive the session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
	InitStarted,
	InitCompleted,
	/// Init failed; the session still becomes `Ready` in a degraded mode.
	InitFailed(String),
	LoginStarted,
	LoginSucceeded(Address),
	LoginFailed(String),
	LoggedOut,
}

impl fmt::Display for SessionEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SessionEvent::InitStarted => write!(f, "init started"),
			SessionEvent::InitCompleted => write!(f, "init completed"),
			SessionEvent::InitFailed(reason) => write!(f, "init failed ({reason})"),
			SessionEvent::LoginStarted => write!(f, "login started"),
			SessionEvent::LoginSucceeded(account) => write!(f, "login succeeded ({account})"),
			SessionEvent::LoginFailed(reason) => write!(f, "login failed ({reason})"),
			SessionEvent::LoggedOut => write!(f, "logged out"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum StateKind {
	Uninitialized,
	Initializing,
	Ready,
	Connecting,
	Connected,
	Disconnected,
}

fn is_valid_transition(from: StateKind, to: StateKind) -> bool {
	static TRANSITIONS: Lazy<HashMap<StateKind, HashSet<StateKind>>> = Lazy::new(|| {
		HashMap::from([
			(StateKind::Uninitialized, HashSet::from([StateKind::Initializing])),
			(StateKind::Initializing, HashSet::from([StateKind::Ready])),
			(StateKind::Ready, HashSet::from([StateKind::Connecting])),
			(
				StateKind::Connecting,
				HashSet::from([
					StateKind::Connecting,
					StateKind::Connected,
					StateKind::Ready,
				]),
			),
			// Connected -> Connected covers an account switch inside the wallet.
			(
				StateKind::Connected,
				HashSet::from([StateKind::Connected, StateKind::Disconnected]),
			),
			(StateKind::Disconnected, HashSet::from([StateKind::Connecting])),
		])
	});

	TRANSITIONS
		.get(&from)
		.is_some_and(|allowed| allowed.contains(&to))
}
