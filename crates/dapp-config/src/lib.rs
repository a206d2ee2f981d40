//! Configuration module for the sample token dApp.
//!
//! Configuration is a single TOML file. String values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`; references are
//! resolved before parsing. After parsing the configuration is validated as
//! a whole, while each auth adapter validates its own implementation table
//! when it is constructed.

use alloy_primitives::{Address, B256};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	#[serde(default)]
	pub app: AppConfig,
	pub chain: ChainConfig,
	pub contracts: ContractsConfig,
	pub auth: AuthConfig,
}

/// Application identity and presentation options.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
	/// Identifier registered with the auth provider.
	#[serde(default)]
	pub client_id: String,
	/// Auth network the adapter talks to.
	#[serde(default)]
	pub network: AuthNetwork,
	/// Whether pages mirror their last result into the debug console.
	#[serde(default = "default_true")]
	pub debug_console: bool,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			client_id: String::new(),
			network: AuthNetwork::default(),
			debug_console: true,
		}
	}
}

fn default_true() -> bool {
	true
}

/// Auth network selector passed to the auth adapter at init.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthNetwork {
	Mainnet,
	#[default]
	Testnet,
	Cyan,
	Aqua,
}

impl fmt::Display for AuthNetwork {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			AuthNetwork::Mainnet => "mainnet",
			AuthNetwork::Testnet => "testnet",
			AuthNetwork::Cyan => "cyan",
			AuthNetwork::Aqua => "aqua",
		};
		f.write_str(name)
	}
}

/// Target chain parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	pub chain_id: u64,
	pub rpc_url: String,
	#[serde(default = "default_display_name")]
	pub display_name: String,
	#[serde(default = "default_ticker")]
	pub ticker: String,
	#[serde(default)]
	pub block_explorer: Option<String>,
}

impl ChainConfig {
	/// Explorer page for a transaction, when an explorer is configured.
	pub fn explorer_tx_url(&self, hash: &B256) -> Option<String> {
		self.block_explorer
			.as_deref()
			.map(|base| format!("{}/tx/{hash:#x}", base.trim_end_matches('/')))
	}
}

fn default_display_name() -> String {
	"Local".to_string()
}

fn default_ticker() -> String {
	"ETH".to_string()
}

/// Deployed contract addresses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractsConfig {
	/// Token contract: minting, ownership, rental and approvals.
	pub mint_token: Address,
	/// Marketplace contract. Deployments that bundle the sale methods into
	/// the token contract leave this unset.
	#[serde(default)]
	pub sale_token: Option<Address>,
}

impl ContractsConfig {
	/// Address that receives sale-contract calls and acts as the approval operator.
	pub fn sale_token(&self) -> Address {
		self.sale_token.unwrap_or(self.mint_token)
	}
}

/// Auth adapter selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
	/// Name of the adapter to use.
	pub primary: String,
	/// Per-adapter configuration tables keyed by adapter name.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

impl AuthConfig {
	/// Configuration table of the primary adapter.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable and
/// `${VAR_NAME:-default}` with the variable or the default when unset.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 256 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures<'_>| {
		let var_name = &caps[1];
		match (std::env::var(var_name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| var_name.to_string());
				String::new()
			},
		}
	});

	if let Some(var_name) = missing {
		return Err(ConfigError::Validation(format!(
			"Environment variable '{var_name}' not found"
		)));
	}

	Ok(resolved.into_owned())
}

impl Config {
	/// Loads configuration from a file, resolving environment references.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		let config: Config = contents.parse()?;
		tracing::debug!(path, chain_id = config.chain.chain_id, "Loaded configuration");
		Ok(config)
	}

	/// Validates cross-field constraints that serde cannot express.
	///
	/// - chain id is non-zero and the RPC URL is HTTP(S)
	/// - contract addresses are not the zero address
	/// - the primary auth adapter has a configuration table
	fn validate(&self) -> Result<(), ConfigError> {
		if self.chain.chain_id == 0 {
			return Err(ConfigError::Validation(
				"chain.chain_id must be greater than zero".into(),
			));
		}
		let url = self.chain.rpc_url.trim();
		if !(url.starts_with("http://") || url.starts_with("https://")) {
			return Err(ConfigError::Validation(format!(
				"chain.rpc_url must be an http(s) URL, got '{url}'"
			)));
		}
		if self.contracts.mint_token == Address::ZERO {
			return Err(ConfigError::Validation(
				"contracts.mint_token cannot be the zero address".into(),
			));
		}
		if self.contracts.sale_token == Some(Address::ZERO) {
			return Err(ConfigError::Validation(
				"contracts.sale_token cannot be the zero address".into(),
			));
		}
		if self.auth.primary.is_empty() {
			return Err(ConfigError::Validation("auth.primary cannot be empty".into()));
		}
		if self.auth.primary_config().is_none() {
			return Err(ConfigError::Validation(format!(
				"Primary auth adapter '{}' has no entry in auth.implementations",
				self.auth.primary
			)));
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const MINT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
	const SALE: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";

	fn sample_config(extra_contracts: &str) -> String {
		format!(
			r#"
[app]
client_id = "practice-dapp"
network = "cyan"

[chain]
chain_id = 1337
rpc_url = "http://127.0.0.1:8545"

[contracts]
mint_token = "{MINT}"
{extra_contracts}

[auth]
primary = "local"
[auth.implementations.local]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#
		)
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("DAPP_TEST_HOST", "localhost");
		std::env::set_var("DAPP_TEST_PORT", "8545");

		let input = "url = \"http://${DAPP_TEST_HOST}:${DAPP_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"http://localhost:8545\"");

		std::env::remove_var("DAPP_TEST_HOST");
		std::env::remove_var("DAPP_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${DAPP_MISSING_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${DAPP_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("DAPP_MISSING_VAR"));
	}

	#[test]
	fn test_parse_full_config() {
		let config: Config = sample_config(&format!("sale_token = \"{SALE}\""))
			.parse()
			.unwrap();
		assert_eq!(config.app.client_id, "practice-dapp");
		assert_eq!(config.app.network, AuthNetwork::Cyan);
		assert!(config.app.debug_console);
		assert_eq!(config.chain.chain_id, 1337);
		assert_eq!(config.chain.ticker, "ETH");
		assert_eq!(config.contracts.sale_token(), SALE.parse::<Address>().unwrap());
		assert!(config.auth.primary_config().is_some());
	}

	#[test]
	fn test_explorer_tx_url() {
		let mut config: Config = sample_config("").parse().unwrap();
		let hash = B256::repeat_byte(0xab);
		assert!(config.chain.explorer_tx_url(&hash).is_none());

		config.chain.block_explorer = Some("https://sepolia.etherscan.io/".into());
		assert_eq!(
			config.chain.explorer_tx_url(&hash).unwrap(),
			format!("https://sepolia.etherscan.io/tx/0x{}", "ab".repeat(32))
		);
	}

	#[test]
	fn test_sale_token_defaults_to_mint_token() {
		let config: Config = sample_config("").parse().unwrap();
		assert_eq!(config.contracts.sale_token(), config.contracts.mint_token);
	}

	#[test]
	fn test_rejects_zero_mint_address() {
		let s = sample_config("").replace(MINT, "0x0000000000000000000000000000000000000000");
		let err = s.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("mint_token"));
	}

	#[test]
	fn test_rejects_non_http_rpc() {
		let s = sample_config("").replace("http://127.0.0.1:8545", "ws://127.0.0.1:8545");
		assert!(matches!(s.parse::<Config>(), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_rejects_primary_without_table() {
		let s = sample_config("").replace("primary = \"local\"", "primary = \"node\"");
		let err = s.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("'node'"));
	}

	#[test]
	fn test_unknown_network_is_parse_error() {
		let s = sample_config("").replace("\"cyan\"", "\"sapphire\"");
		assert!(matches!(s.parse::<Config>(), Err(ConfigError::Parse(_))));
	}

	#[tokio::test]
	async fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(sample_config("").as_bytes()).unwrap();
		let path = file.path().to_str().unwrap().to_string();

		let config = Config::from_file(&path).await.unwrap();
		assert_eq!(config.auth.primary, "local");
	}

	#[tokio::test]
	async fn test_from_file_missing() {
		let result = Config::from_file("/nonexistent/dapp.toml").await;
		assert!(matches!(result, Err(ConfigError::Io(_))));
	}
}
