//! Chain provider facade for the sample token dApp.
//!
//! Every contract method the application uses is exposed here as one async
//! operation on [`TokenProvider`]. Each operation becomes one of two effects
//! on the underlying [`ChainClient`]: a read-only *query* (`eth_call`) or a
//! state-changing *transaction* that is signed, sent and awaited until a
//! receipt is available.
//!
//! The facade never retries. Failures are reported through [`ProviderError`]
//! so that callers can log them and leave their state untouched.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use dapp_types::TransactionReceipt;
use thiserror::Error;

/// Contract ABIs and call encoding.
pub mod contracts;
/// The per-session facade.
pub mod facade;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

pub use contracts::{Contract, Contracts};
pub use facade::TokenProvider;

/// Errors surfaced by chain operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
	/// No session is active, or the session that produced this provider has ended.
	#[error("Provider not initialized yet")]
	ProviderNotReady,
	/// The node could not be reached or answered with something unusable.
	#[error("Transport error: {0}")]
	Transport(String),
	/// The contract rejected the call.
	#[error("Contract reverted: {0}")]
	ContractRevert(String),
	/// An argument was rejected before any request was made.
	#[error("Invalid input: {0}")]
	InvalidInput(String),
	/// The call succeeded but its return data did not match the ABI.
	#[error("Decode error: {0}")]
	Decode(String),
}

impl From<dapp_types::UnitsError> for ProviderError {
	fn from(err: dapp_types::UnitsError) -> Self {
		ProviderError::InvalidInput(err.to_string())
	}
}

/// Request-capable handle on a chain, as granted by an auth adapter.
///
/// This is the `{query, transact}` capability set the facade is built on.
/// One implementation exists per backend; the facade depends on nothing else.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ChainClient: Send + Sync {
	/// Chain id this handle is bound to.
	fn chain_id(&self) -> u64;

	/// Accounts the handle can sign for, in the order the backend reports them.
	async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

	/// Native balance of `address` in wei.
	async fn balance(&self, address: Address) -> Result<U256, ProviderError>;

	/// Executes a read-only call against `to` and returns the raw return data.
	async fn query(&self, to: Address, calldata: Bytes) -> Result<Bytes, ProviderError>;

	/// Signs and sends a transaction from `from`, then waits for its receipt.
	///
	/// A mined receipt is returned as-is even when its status is `false`;
	/// reverts detected before mining (e.g. during gas estimation) are
	/// reported as [`ProviderError::ContractRevert`].
	async fn transact(
		&self,
		from: Address,
		to: Address,
		calldata: Bytes,
		value: U256,
	) -> Result<TransactionReceipt, ProviderError>;

	/// Signs an arbitrary message (EIP-191) with the key of `from`.
	async fn sign_message(&self, from: Address, message: Bytes) -> Result<Bytes, ProviderError>;
}
