//! Session manager: the single writer of session state.

use crate::context::SessionContext;
use crate::state::{SessionEvent, SessionState};
use crate::{create_adapter, AuthAdapter, AuthError, AuthOptions};
use alloy_primitives::Address;
use dapp_config::Config;
use dapp_provider::{Contracts, ProviderError, TokenProvider};
use dapp_types::{AdapterEvent, Session, UserInfo};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, error, info, instrument, warn};

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
	#[error("Session not initialized yet")]
	NotInitialized,
	#[error("Not logged in")]
	NotConnected,
	#[error("Connected wallet exposes no accounts")]
	NoAccounts,
	#[error(transparent)]
	Auth(#[from] AuthError),
	#[error(transparent)]
	Provider(#[from] ProviderError),
}

/// Drives an [`AuthAdapter`] through the session lifecycle.
///
/// Each successful login binds exactly one [`TokenProvider`] to the chain
/// handle the adapter returned. Logout revokes that provider, so clones held
/// by pages stop working immediately.
pub struct SessionManager {
	adapter: Box<dyn AuthAdapter>,
	options: AuthOptions,
	contracts: Contracts,
	context: SessionContext,
	events: broadcast::Receiver<AdapterEvent>,
}

impl SessionManager {
	pub fn new(adapter: Box<dyn AuthAdapter>, options: AuthOptions, contracts: Contracts) -> Self {
		let events = adapter.subscribe();
		Self {
			adapter,
			options,
			contracts,
			context: SessionContext::default(),
			events,
		}
	}

	/// Builds the manager for the primary adapter named in `config`.
	pub fn from_config(config: &Config) -> Result<Self, SessionError> {
		let adapter = create_adapter(&config.auth)?;
		let contracts = Contracts::new(
			config.contracts.mint_token,
			config.contracts.sale_token(),
		);
		Ok(Self::new(
			adapter,
			AuthOptions::from_config(config),
			contracts,
		))
	}

	/// Handle for readers. Every clone sees the manager's writes.
	pub fn context(&self) -> SessionContext {
		self.context.clone()
	}

	pub async fn state(&self) -> SessionState {
		self.context.state().await
	}

	/// Applies `event` to the state machine, logging rejected transitions.
	async fn apply(&self, event: SessionEvent) -> bool {
		let current = self.context.state().await;
		match current.apply(&event) {
			Ok(next) => {
				debug!(from = %current, to = %next, "Session transition");
				self.context.set_state(next).await;
				true
			},
			Err(e) => {
				warn!(error = %e, "Ignoring session event");
				false
			},
		}
	}

	/// Runs adapter init.
	///
	/// A failing init is logged and still leaves the session `Ready`; logins
	/// attempted afterwards fail with the adapter's own error.
	#[instrument(skip(self))]
	pub async fn initialize(&mut self) {
		if !self.apply(SessionEvent::InitStarted).await {
			return;
		}

		match self.adapter.init(self.options.clone()).await {
			Ok(()) => {
				info!(chain_id = self.options.chain.chain_id, "Auth adapter ready");
				self.apply(SessionEvent::InitCompleted).await;
			},
			Err(e) => {
				error!(error = %e, "Auth adapter init failed");
				self.apply(SessionEvent::InitFailed(e.to_string())).await;
			},
		}

		self.drop_login().await;
	}

	/// Logs in and binds a fresh provider to the new chain handle.
	///
	/// Returns the account that is now active. Calling this while already
	/// connected returns the current account without reconnecting.
	#[instrument(skip(self))]
	pub async fn login(&mut self) -> Result<Address, SessionError> {
		self.process_events().await;
		let state = self.context.state().await;
		if !state.is_initialized() {
			warn!("Auth adapter not initialized yet");
			return Err(SessionError::NotInitialized);
		}
		if let SessionState::Connected(account) = state {
			debug!(%account, "Already logged in");
			return Ok(account);
		}

		self.apply(SessionEvent::LoginStarted).await;

		let connected = self.connect().await;
		self.discard_echoes();

		match connected {
			Ok((account, provider)) => {
				let user_info = self
					.adapter
					.user_info()
					.await
					.map_err(|e| debug!(error = %e, "No user info after login"))
					.ok();
				let session = Session::authenticated(account, provider.chain_id());

				self.context.publish_login(session, provider, user_info).await;
				self.apply(SessionEvent::LoginSucceeded(account)).await;
				info!(%account, "Logged in");
				Ok(account)
			},
			Err(e) => {
				error!(error = %e, "Login failed");
				self.apply(SessionEvent::LoginFailed(e.to_string())).await;
				Err(e)
			},
		}
	}

	async fn connect(&self) -> Result<(Address, TokenProvider), SessionError> {
		let client = self.adapter.connect().await?;
		let provider = TokenProvider::new(client, self.contracts.clone());

		let account = match provider.get_accounts().await {
			Ok(accounts) => accounts.first().copied().ok_or(SessionError::NoAccounts),
			Err(e) => Err(e.into()),
		};

		if account.is_err() {
			provider.revoke();
		}
		Ok((account?, provider))
	}

	/// Ends the session and revokes its provider.
	///
	/// Adapter-side logout failures are logged; the local session is
	/// cleared regardless.
	#[instrument(skip(self))]
	pub async fn logout(&mut self) -> Result<(), SessionError> {
		if !matches!(self.context.state().await, SessionState::Connected(_)) {
			warn!("Logout requested without an active session");
			return Err(SessionError::NotConnected);
		}

		if let Err(e) = self.adapter.logout().await {
			error!(error = %e, "Auth adapter logout failed");
		}
		self.discard_echoes();

		self.end_session().await;
		info!("Logged out");
		Ok(())
	}

	async fn end_session(&mut self) {
		self.drop_login().await;
		self.apply(SessionEvent::LoggedOut).await;
	}

	/// Clears the published login and revokes its provider.
	async fn drop_login(&self) {
		if let Some(provider) = self.context.clear_login(self.options.chain.chain_id).await {
			debug!("Revoking provider of the previous login");
			provider.revoke();
		}
	}

	/// Drops the events the adapter published while serving a call the
	/// manager made itself; their effect is already applied.
	fn discard_echoes(&mut self) {
		loop {
			match self.events.try_recv() {
				Ok(event) => debug!(event = event.name(), "Skipping echo of own adapter call"),
				Err(TryRecvError::Lagged(skipped)) => debug!(skipped, "Skipped echoes lagged"),
				Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
			}
		}
	}

	/// Profile of the logged-in user, straight from the adapter.
	pub async fn get_user_info(&self) -> Result<UserInfo, SessionError> {
		if !self.context.state().await.is_initialized() {
			warn!("Auth adapter not initialized yet");
			return Err(SessionError::NotInitialized);
		}
		Ok(self.adapter.user_info().await?)
	}

	/// Applies one adapter event. Never fails; problems are logged.
	pub async fn handle_event(&mut self, event: AdapterEvent) {
		let state = self.context.state().await;
		debug!(event = event.name(), state = %state, "Adapter event");

		match (event, &state) {
			(AdapterEvent::Connecting, SessionState::Ready | SessionState::Disconnected) => {
				self.apply(SessionEvent::LoginStarted).await;
			},
			(AdapterEvent::Disconnected, SessionState::Connected(_)) => {
				warn!("Wallet disconnected by the auth provider");
				self.end_session().await;
			},
			(AdapterEvent::Errored(message), SessionState::Connecting) => {
				self.apply(SessionEvent::LoginFailed(message)).await;
			},
			(AdapterEvent::Errored(message), _) => {
				error!(error = %message, "Auth adapter reported an error");
			},
			// Echoes of transitions the manager already made itself.
			_ => {},
		}
	}

	/// Drains pending adapter events and applies them in order.
	///
	/// Returns how many events were handled.
	pub async fn process_events(&mut self) -> usize {
		let mut handled = 0;
		loop {
			match self.events.try_recv() {
				Ok(event) => {
					self.handle_event(event).await;
					handled += 1;
				},
				Err(TryRecvError::Lagged(skipped)) => {
					warn!(skipped, "Dropped adapter events");
				},
				Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
			}
		}
		handled
	}
}
