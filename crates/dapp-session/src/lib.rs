//! Wallet authentication and session lifecycle.
//!
//! An [`AuthAdapter`] stands in for the external wallet-auth SDK: it is
//! initialised with the target chain and app identity, hands out a
//! request-capable [`ChainClient`] on connect and reports lifecycle events.
//! The [`SessionManager`] drives the adapter through an explicit state
//! machine, binds exactly one [`dapp_provider::TokenProvider`] to each login
//! and publishes the result through a read-only [`SessionContext`].

use async_trait::async_trait;
use dapp_config::{AuthConfig, AuthNetwork, ChainConfig, Config};
use dapp_provider::ChainClient;
use dapp_types::{AdapterEvent, ImplementationRegistry, UserInfo};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Shared, read-only session view.
pub mod context;
/// Broadcast channel for adapter events.
pub mod events;
/// The single writer of session state.
pub mod manager;
/// Session lifecycle state machine.
pub mod state;

/// Re-export implementations
pub mod implementations {
	pub mod local;
	pub mod node;
}

pub use context::SessionContext;
pub use events::AdapterEventBus;
pub use manager::{SessionError, SessionManager};
pub use state::{SessionEvent, SessionState, SessionStateError};

/// Errors raised by auth adapters.
#[derive(Debug, Error)]
pub enum AuthError {
	/// An operation was attempted before `init` completed.
	#[error("Auth adapter not initialized yet")]
	NotInitialized,
	/// The adapter's configuration table was rejected.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	/// Obtaining a chain handle failed.
	#[error("Connection failed: {0}")]
	Connection(String),
	/// No adapter is registered under the requested name.
	#[error("Unknown auth adapter: {0}")]
	UnknownAdapter(String),
}

/// Options handed to [`AuthAdapter::init`].
#[derive(Debug, Clone)]
pub struct AuthOptions {
	/// Target chain parameters.
	pub chain: ChainConfig,
	/// App identifier registered with the auth provider.
	pub client_id: String,
	/// Auth network selector.
	pub network: AuthNetwork,
}

impl AuthOptions {
	pub fn from_config(config: &Config) -> Self {
		Self {
			chain: config.chain.clone(),
			client_id: config.app.client_id.clone(),
			network: config.app.network,
		}
	}
}

/// Boundary to the wallet-auth provider.
///
/// Implementations publish an [`AdapterEvent`] for every lifecycle change;
/// the session manager is the only consumer that acts on them.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthAdapter: Send + Sync {
	/// Prepares the adapter for the given chain and app identity.
	async fn init(&self, options: AuthOptions) -> Result<(), AuthError>;

	/// Authenticates and returns a fresh chain handle.
	async fn connect(&self) -> Result<Arc<dyn ChainClient>, AuthError>;

	/// Ends the current session on the provider side.
	async fn logout(&self) -> Result<(), AuthError>;

	/// Profile of the logged-in user.
	async fn user_info(&self) -> Result<UserInfo, AuthError>;

	/// Subscribes to lifecycle events.
	fn subscribe(&self) -> broadcast::Receiver<AdapterEvent>;
}

/// Factory function type for auth adapters.
pub type AuthAdapterFactory = fn(&toml::Value) -> Result<Box<dyn AuthAdapter>, AuthError>;

/// All built-in adapters as `(name, factory)` pairs.
pub fn get_all_implementations() -> Vec<(&'static str, AuthAdapterFactory)> {
	use implementations::{local, node};

	vec![
		(local::Registry::NAME, local::Registry::factory()),
		(node::Registry::NAME, node::Registry::factory()),
	]
}

/// Builds the primary adapter named in `config`.
pub fn create_adapter(config: &AuthConfig) -> Result<Box<dyn AuthAdapter>, AuthError> {
	let table = config.primary_config().ok_or_else(|| {
		AuthError::InvalidConfig(format!(
			"No configuration for auth adapter '{}'",
			config.primary
		))
	})?;

	let (_, factory) = get_all_implementations()
		.into_iter()
		.find(|(name, _)| *name == config.primary)
		.ok_or_else(|| AuthError::UnknownAdapter(config.primary.clone()))?;

	factory(table)
}
