//! Node-managed accounts adapter.
//!
//! Uses the accounts a development node (or an injected wallet proxy)
//! exposes through `eth_accounts`. Signing happens on the node side.

use crate::{AdapterEventBus, AuthAdapter, AuthError, AuthOptions};
use async_trait::async_trait;
use dapp_provider::implementations::evm::alloy::AlloyChainClient;
use dapp_provider::ChainClient;
use dapp_types::{
	format_address, AdapterEvent, ConfigSchema, Field, ImplementationRegistry, Schema, UserInfo,
	ValidationError,
};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

/// Adapter that relies on the node's unlocked accounts.
pub struct NodeAccountsAdapter {
	/// Overrides the chain RPC URL when set.
	rpc_url: Option<String>,
	options: RwLock<Option<AuthOptions>>,
	client: RwLock<Option<Arc<dyn ChainClient>>>,
	events: AdapterEventBus,
}

impl NodeAccountsAdapter {
	pub fn new(rpc_url: Option<String>) -> Self {
		Self {
			rpc_url,
			options: RwLock::new(None),
			client: RwLock::new(None),
			events: AdapterEventBus::default(),
		}
	}

	async fn options(&self) -> Result<AuthOptions, AuthError> {
		self.options
			.read()
			.await
			.clone()
			.ok_or(AuthError::NotInitialized)
	}

	fn fail(&self, message: String) -> AuthError {
		warn!(error = %message, "Node accounts adapter failed to connect");
		self.events.publish(AdapterEvent::Errored(message.clone()));
		AuthError::Connection(message)
	}
}

/// Configuration schema for the node accounts adapter.
pub struct NodeAccountsSchema;

impl ConfigSchema for NodeAccountsSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new("rpc_url").with_validator(|url| {
				if url.starts_with("http://") || url.starts_with("https://") {
					Ok(())
				} else {
					Err("rpc_url must be an http(s) URL".to_string())
				}
			})],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl AuthAdapter for NodeAccountsAdapter {
	async fn init(&self, options: AuthOptions) -> Result<(), AuthError> {
		info!(
			chain_id = options.chain.chain_id,
			network = %options.network,
			"Node accounts adapter initialized"
		);
		*self.options.write().await = Some(options);
		Ok(())
	}

	async fn connect(&self) -> Result<Arc<dyn ChainClient>, AuthError> {
		let options = self.options().await?;
		self.events.publish(AdapterEvent::Connecting);

		let rpc_url = self.rpc_url.as_deref().unwrap_or(&options.chain.rpc_url);
		let client = AlloyChainClient::new(rpc_url, options.chain.chain_id, None)
			.map_err(|e| self.fail(e.to_string()))?;

		// The node must expose at least one account to sign with.
		let accounts = client.accounts().await.map_err(|e| self.fail(e.to_string()))?;
		if accounts.is_empty() {
			return Err(self.fail("Node exposes no accounts".to_string()));
		}

		let client: Arc<dyn ChainClient> = Arc::new(client);
		*self.client.write().await = Some(client.clone());
		self.events.publish(AdapterEvent::Connected);
		Ok(client)
	}

	async fn logout(&self) -> Result<(), AuthError> {
		self.options().await?;
		self.client.write().await.take();
		self.events.publish(AdapterEvent::Disconnected);
		Ok(())
	}

	async fn user_info(&self) -> Result<UserInfo, AuthError> {
		self.options().await?;
		let client = self.client.read().await.clone();
		let name = match client {
			Some(client) => client
				.accounts()
				.await
				.ok()
				.and_then(|accounts| accounts.first().map(format_address)),
			None => None,
		};
		Ok(UserInfo {
			name,
			email: None,
			verifier: Some("node".to_string()),
			typed_login: Some(Registry::NAME.to_string()),
		})
	}

	fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
		self.events.subscribe()
	}
}

/// Factory function to create a node accounts adapter from configuration.
///
/// Optional configuration parameters:
/// - `rpc_url`: node endpoint, defaults to the chain RPC URL
pub fn create_adapter(config: &toml::Value) -> Result<Box<dyn AuthAdapter>, AuthError> {
	NodeAccountsSchema
		.validate(config)
		.map_err(|e| AuthError::InvalidConfig(e.to_string()))?;

	let rpc_url = config
		.get("rpc_url")
		.and_then(|v| v.as_str())
		.map(str::to_string);

	Ok(Box::new(NodeAccountsAdapter::new(rpc_url)))
}

/// Registry for the node accounts adapter.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "node";
	type Factory = crate::AuthAdapterFactory;

	fn factory() -> Self::Factory {
		create_adapter
	}
}
