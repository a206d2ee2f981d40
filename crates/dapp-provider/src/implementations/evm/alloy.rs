//! Alloy-backed chain client.
//!
//! Talks JSON-RPC over HTTP. With a local signer configured, transactions
//! are signed in-process and `accounts()` reports the signer's address;
//! without one, the node's unlocked accounts are used and signing is left
//! to the node (`eth_sendTransaction`, `eth_sign`).

use crate::{ChainClient, ProviderError};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{DynProvider, PendingTransactionError, Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use async_trait::async_trait;
use dapp_types::TransactionReceipt;
use tracing::{debug, instrument};

/// JSON-RPC error code nodes use for `execution reverted`.
const EXECUTION_REVERTED_CODE: i64 = 3;

/// Chain handle backed by an alloy [`DynProvider`].
pub struct AlloyChainClient {
	provider: DynProvider,
	chain_id: u64,
	signer: Option<PrivateKeySigner>,
}

impl AlloyChainClient {
	/// Connects to `rpc_url` for `chain_id`.
	///
	/// No request is made here; the first failure shows up on first use.
	pub fn new(
		rpc_url: &str,
		chain_id: u64,
		signer: Option<PrivateKeySigner>,
	) -> Result<Self, ProviderError> {
		let url = rpc_url
			.parse()
			.map_err(|e| ProviderError::Transport(format!("Invalid RPC URL '{rpc_url}': {e}")))?;

		let client = RpcClient::builder().http(url);

		let provider = match &signer {
			Some(signer) => {
				let wallet = EthereumWallet::from(signer.clone().with_chain_id(Some(chain_id)));
				ProviderBuilder::new()
					.wallet(wallet)
					.connect_client(client)
					.erased()
			},
			None => ProviderBuilder::new().connect_client(client).erased(),
		};

		debug!(
			rpc_url,
			chain_id,
			local_signer = signer.is_some(),
			"Created chain client"
		);

		Ok(Self {
			provider,
			chain_id,
			signer,
		})
	}
}

/// Sorts an RPC failure into revert or transport.
///
/// Nodes report reverts as error code 3, or with a message mentioning
/// "revert" when the revert happens during gas estimation.
fn classify_rpc_error(context: &str, err: TransportError) -> ProviderError {
	if let TransportError::ErrorResp(payload) = &err {
		if payload.code == EXECUTION_REVERTED_CODE
			|| payload.message.to_lowercase().contains("revert")
		{
			return ProviderError::ContractRevert(payload.message.to_string());
		}
	}
	ProviderError::Transport(format!("{context}: {err}"))
}

fn classify_pending_error(err: PendingTransactionError) -> ProviderError {
	match err {
		PendingTransactionError::TransportError(err) => {
			classify_rpc_error("Failed to fetch receipt", err)
		},
		other => ProviderError::Transport(format!("Failed to confirm transaction: {other}")),
	}
}

#[async_trait]
impl ChainClient for AlloyChainClient {
	fn chain_id(&self) -> u64 {
		self.chain_id
	}

	async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
		if let Some(signer) = &self.signer {
			return Ok(vec![signer.address()]);
		}
		self.provider
			.get_accounts()
			.await
			.map_err(|e| classify_rpc_error("eth_accounts failed", e))
	}

	async fn balance(&self, address: Address) -> Result<U256, ProviderError> {
		self.provider
			.get_balance(address)
			.await
			.map_err(|e| classify_rpc_error("eth_getBalance failed", e))
	}

	async fn query(&self, to: Address, calldata: Bytes) -> Result<Bytes, ProviderError> {
		let request = TransactionRequest::default().to(to).input(calldata.into());
		self.provider
			.call(request)
			.await
			.map_err(|e| classify_rpc_error("eth_call failed", e))
	}

	#[instrument(skip(self, calldata), fields(chain_id = self.chain_id))]
	async fn transact(
		&self,
		from: Address,
		to: Address,
		calldata: Bytes,
		value: U256,
	) -> Result<TransactionReceipt, ProviderError> {
		if let Some(signer) = &self.signer {
			if signer.address() != from {
				return Err(ProviderError::InvalidInput(format!(
					"No signer available for {from}"
				)));
			}
		}

		let request = TransactionRequest::default()
			.from(from)
			.to(to)
			.input(calldata.into())
			.value(value);

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| classify_rpc_error("Failed to send transaction", e))?;

		let tx_hash = *pending.tx_hash();
		debug!(tx_hash = %tx_hash, "Transaction submitted, waiting for receipt");

		let receipt = pending.get_receipt().await.map_err(classify_pending_error)?;

		Ok(TransactionReceipt::new(
			receipt.transaction_hash,
			receipt.block_number.unwrap_or(0),
			receipt.status(),
		))
	}

	async fn sign_message(&self, from: Address, message: Bytes) -> Result<Bytes, ProviderError> {
		match &self.signer {
			Some(signer) if signer.address() == from => {
				let signature = signer
					.sign_message(&message)
					.await
					.map_err(|e| ProviderError::InvalidInput(format!("Signing failed: {e}")))?;
				Ok(Bytes::from(signature.as_bytes().to_vec()))
			},
			Some(_) => Err(ProviderError::InvalidInput(format!(
				"No signer available for {from}"
			))),
			None => self
				.provider
				.raw_request::<_, Bytes>("eth_sign".into(), (from, message))
				.await
				.map_err(|e| classify_rpc_error("eth_sign failed", e)),
		}
	}
}
