//! Local private-key wallet adapter.
//!
//! Authenticates with a key held in configuration. Connecting never prompts;
//! it builds an alloy chain client that signs in-process with that key.

use crate::{AuthAdapter, AuthError, AuthOptions, AdapterEventBus};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use dapp_provider::implementations::evm::alloy::AlloyChainClient;
use dapp_provider::ChainClient;
use dapp_types::{
	format_address, without_0x_prefix, AdapterEvent, ConfigSchema, Field,
	ImplementationRegistry, Schema, SecretString, UserInfo, ValidationError,
};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

/// Adapter backed by a single private key.
pub struct LocalKeyAdapter {
	signer: PrivateKeySigner,
	options: RwLock<Option<AuthOptions>>,
	events: AdapterEventBus,
}

impl LocalKeyAdapter {
	/// Creates the adapter from a hex private key, with or without `0x`.
	pub fn new(private_key: &SecretString) -> Result<Self, AuthError> {
		let signer = private_key
			.with_exposed(|key| without_0x_prefix(key).parse::<PrivateKeySigner>())
			.map_err(|e| AuthError::InvalidConfig(format!("Invalid private key: {e}")))?;

		Ok(Self {
			signer,
			options: RwLock::new(None),
			events: AdapterEventBus::default(),
		})
	}

	async fn options(&self) -> Result<AuthOptions, AuthError> {
		self.options
			.read()
			.await
			.clone()
			.ok_or(AuthError::NotInitialized)
	}
}

/// Configuration schema for the local key adapter.
pub struct LocalKeySchema;

impl LocalKeySchema {
	/// Static validation method for use before instance creation
	pub fn validate_config(config: &toml::Value) -> Result<(), ValidationError> {
		LocalKeySchema.validate(config)
	}
}

impl ConfigSchema for LocalKeySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key").with_validator(|key| {
					let hex_part = without_0x_prefix(key);
					if hex_part.len() != 64 {
						return Err("Private key must be 64 hex characters".to_string());
					}
					if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
						return Err("Private key must contain only hex characters".to_string());
					}
					Ok(())
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl AuthAdapter for LocalKeyAdapter {
	async fn init(&self, options: AuthOptions) -> Result<(), AuthError> {
		info!(
			chain_id = options.chain.chain_id,
			network = %options.network,
			"Local key adapter initialized"
		);
		*self.options.write().await = Some(options);
		Ok(())
	}

	async fn connect(&self) -> Result<Arc<dyn ChainClient>, AuthError> {
		let options = self.options().await?;
		self.events.publish(AdapterEvent::Connecting);

		let client = AlloyChainClient::new(
			&options.chain.rpc_url,
			options.chain.chain_id,
			Some(self.signer.clone()),
		)
		.map_err(|e| {
			warn!(error = %e, "Local key adapter failed to connect");
			self.events.publish(AdapterEvent::Errored(e.to_string()));
			AuthError::Connection(e.to_string())
		})?;

		self.events.publish(AdapterEvent::Connected);
		Ok(Arc::new(client))
	}

	async fn logout(&self) -> Result<(), AuthError> {
		self.options().await?;
		self.events.publish(AdapterEvent::Disconnected);
		Ok(())
	}

	async fn user_info(&self) -> Result<UserInfo, AuthError> {
		self.options().await?;
		Ok(UserInfo {
			name: Some(format_address(&self.signer.address())),
			email: None,
			verifier: Some("private-key".to_string()),
			typed_login: Some(Registry::NAME.to_string()),
		})
	}

	fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
		self.events.subscribe()
	}
}

/// Factory function to create a local key adapter from configuration.
///
/// Required configuration parameters:
/// - `private_key`: 64 hex characters, optionally `0x`-prefixed
pub fn create_adapter(config: &toml::Value) -> Result<Box<dyn AuthAdapter>, AuthError> {
	LocalKeySchema::validate_config(config)
		.map_err(|e| AuthError::InvalidConfig(e.to_string()))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| AuthError::InvalidConfig("private_key is required".to_string()))?;

	Ok(Box::new(LocalKeyAdapter::new(&private_key)?))
}

/// Registry for the local key adapter.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = crate::AuthAdapterFactory;

	fn factory() -> Self::Factory {
		create_adapter
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use dapp_config::{AuthNetwork, ChainConfig};

	// Test private key (FOR TESTING ONLY!)
	const TEST_PRIVATE_KEY: &str =
		"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

	fn options(rpc_url: &str) -> AuthOptions {
		AuthOptions {
			chain: ChainConfig {
				chain_id: 1337,
				rpc_url: rpc_url.to_string(),
				display_name: "Local".into(),
				ticker: "ETH".into(),
				block_explorer: None,
			},
			client_id: "test".into(),
			network: AuthNetwork::Testnet,
		}
	}

	fn adapter() -> LocalKeyAdapter {
		LocalKeyAdapter::new(&SecretString::from(TEST_PRIVATE_KEY)).unwrap()
	}

	fn config(key: &str) -> toml::Value {
		toml::from_str(&format!("private_key = \"{key}\"")).unwrap()
	}

	#[test]
	fn test_schema_accepts_keys_with_and_without_prefix() {
		assert!(LocalKeySchema::validate_config(&config(TEST_PRIVATE_KEY)).is_ok());
		assert!(LocalKeySchema::validate_config(&config(&TEST_PRIVATE_KEY[2..])).is_ok());
	}

	#[test]
	fn test_schema_rejects_bad_keys() {
		assert!(LocalKeySchema::validate_config(&config("1234")).is_err());
		assert!(LocalKeySchema::validate_config(&config(&"z".repeat(64))).is_err());
		assert!(LocalKeySchema::validate_config(&toml::Value::Table(Default::default())).is_err());
	}

	#[test]
	fn test_registry() {
		assert_eq!(Registry::NAME, "local");
		assert!(Registry::factory()(&config(TEST_PRIVATE_KEY)).is_ok());
		assert!(matches!(
			Registry::factory()(&config("invalid_key")),
			Err(AuthError::InvalidConfig(_))
		));
	}

	#[tokio::test]
	async fn test_connect_requires_init() {
		let adapter = adapter();
		assert!(matches!(
			adapter.connect().await,
			Err(AuthError::NotInitialized)
		));
		assert!(matches!(
			adapter.user_info().await,
			Err(AuthError::NotInitialized)
		));
	}

	#[tokio::test]
	async fn test_connect_yields_signer_account_and_events() {
		let adapter = adapter();
		let mut events = adapter.subscribe();
		adapter.init(options("http://127.0.0.1:8545")).await.unwrap();

		let client = adapter.connect().await.unwrap();
		assert_eq!(client.chain_id(), 1337);
		let accounts = client.accounts().await.unwrap();
		assert_eq!(format_address(&accounts[0]), TEST_ADDRESS);

		assert_eq!(events.recv().await.unwrap(), AdapterEvent::Connecting);
		assert_eq!(events.recv().await.unwrap(), AdapterEvent::Connected);

		adapter.logout().await.unwrap();
		assert_eq!(events.recv().await.unwrap(), AdapterEvent::Disconnected);
	}

	#[tokio::test]
	async fn test_connect_with_bad_url_emits_errored() {
		let adapter = adapter();
		let mut events = adapter.subscribe();
		adapter.init(options("not a url")).await.unwrap();

		assert!(matches!(
			adapter.connect().await,
			Err(AuthError::Connection(_))
		));
		assert_eq!(events.recv().await.unwrap(), AdapterEvent::Connecting);
		assert!(matches!(
			events.recv().await.unwrap(),
			AdapterEvent::Errored(_)
		));
	}

	#[tokio::test]
	async fn test_user_info() {
		let adapter = adapter();
		adapter.init(options("http://127.0.0.1:8545")).await.unwrap();
		let info = adapter.user_info().await.unwrap();
		assert_eq!(info.name.as_deref(), Some(TEST_ADDRESS));
		assert_eq!(info.typed_login.as_deref(), Some("local"));
	}
}
