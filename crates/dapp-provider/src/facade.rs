//! Token contract facade bound to one authenticated chain handle.

use crate::contracts::{
	address_output, bool_output, label_output, token_records_output, uint_output, Contract,
	Contracts,
};
use crate::{ChainClient, ProviderError};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, U256};
use dapp_types::{parse_token_id, to_base_units, TokenRecord, TransactionReceipt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One method per contract operation, over a single chain handle.
///
/// Cloning is cheap and every clone shares the same handle. Once
/// [`TokenProvider::revoke`] has been called (on logout) every clone fails
/// all operations with [`ProviderError::ProviderNotReady`].
#[derive(Clone)]
pub struct TokenProvider {
	client: Arc<dyn ChainClient>,
	contracts: Arc<Contracts>,
	revoked: Arc<AtomicBool>,
}

impl std::fmt::Debug for TokenProvider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenProvider")
			.field("chain_id", &self.client.chain_id())
			.field("mint", &self.contracts.mint.address())
			.field("sale", &self.contracts.sale.address())
			.field("revoked", &self.is_revoked())
			.finish()
	}
}

fn uint(value: U256) -> DynSolValue {
	DynSolValue::Uint(value, 256)
}

fn token_id_arg(token_id: &str) -> Result<DynSolValue, ProviderError> {
	parse_token_id(token_id)
		.map(uint)
		.map_err(ProviderError::InvalidInput)
}

impl TokenProvider {
	pub fn new(client: Arc<dyn ChainClient>, contracts: Contracts) -> Self {
		Self {
			client,
			contracts: Arc::new(contracts),
			revoked: Arc::new(AtomicBool::new(false)),
		}
	}

	/// Detaches every clone of this provider from its chain handle.
	pub fn revoke(&self) {
		self.revoked.store(true, Ordering::SeqCst);
	}

	pub fn is_revoked(&self) -> bool {
		self.revoked.load(Ordering::SeqCst)
	}

	pub fn chain_id(&self) -> u64 {
		self.client.chain_id()
	}

	/// Operator address approved to move tokens on the owner's behalf.
	pub fn sale_operator(&self) -> Address {
		self.contracts.sale.address()
	}

	fn client(&self) -> Result<&Arc<dyn ChainClient>, ProviderError> {
		if self.is_revoked() {
			return Err(ProviderError::ProviderNotReady);
		}
		Ok(&self.client)
	}

	async fn query(
		&self,
		contract: &Contract,
		method: &str,
		args: &[DynSolValue],
	) -> Result<Vec<DynSolValue>, ProviderError> {
		let client = self.client()?;
		let calldata = contract.encode(method, args)?;
		debug!(contract = contract.name(), method, "eth_call");
		let output = client.query(contract.address(), calldata).await?;
		contract.decode(method, &output)
	}

	async fn transact(
		&self,
		from: Address,
		contract: &Contract,
		method: &str,
		args: &[DynSolValue],
		value: U256,
	) -> Result<TransactionReceipt, ProviderError> {
		let client = self.client()?;
		let calldata = contract.encode(method, args)?;
		debug!(
			contract = contract.name(),
			method,
			from = %from,
			value = %value,
			"Sending transaction"
		);
		let receipt = client
			.transact(from, contract.address(), calldata, value)
			.await?;

		if !receipt.status {
			warn!(
				method,
				tx_hash = %receipt.transaction_hash,
				"Transaction mined with failed status"
			);
			return Err(ProviderError::ContractRevert(format!(
				"{method} reverted in transaction {}",
				receipt.transaction_hash
			)));
		}

		info!(
			method,
			tx_hash = %receipt.transaction_hash,
			block = receipt.block_number,
			"Transaction confirmed"
		);
		Ok(receipt)
	}

	/// Accounts the connected signer controls.
	pub async fn get_accounts(&self) -> Result<Vec<Address>, ProviderError> {
		let accounts = self.client()?.accounts().await?;
		debug!(count = accounts.len(), "Fetched accounts");
		Ok(accounts)
	}

	/// Native balance of `account`, in wei.
	pub async fn native_balance(&self, account: Address) -> Result<U256, ProviderError> {
		self.client()?.balance(account).await
	}

	/// Signs `message` with the key of `account`.
	pub async fn sign_message(
		&self,
		account: Address,
		message: impl Into<Bytes>,
	) -> Result<Bytes, ProviderError> {
		self.client()?.sign_message(account, message.into()).await
	}

	/// Sends `amount_in_ether` of native currency from `account` to `to`.
	pub async fn transfer_native(
		&self,
		account: Address,
		to: Address,
		amount_in_ether: &str,
	) -> Result<TransactionReceipt, ProviderError> {
		let value = to_base_units(amount_in_ether)?;
		let client = self.client()?;
		let receipt = client.transact(account, to, Bytes::new(), value).await?;
		if !receipt.status {
			return Err(ProviderError::ContractRevert(format!(
				"Transfer failed in transaction {}",
				receipt.transaction_hash
			)));
		}
		Ok(receipt)
	}

	/// Number of tokens owned by `account`, as a decimal string.
	pub async fn balance_of(&self, account: Address) -> Result<String, ProviderError> {
		let mint = &self.contracts.mint;
		let values = self
			.query(mint, "balanceOf", &[DynSolValue::Address(account)])
			.await?;
		Ok(uint_output(values, "balanceOf")?.to_string())
	}

	/// Token id at zero-based `index` in the token list of `owner`.
	///
	/// An out-of-range index reverts in the contract and surfaces as
	/// [`ProviderError::ContractRevert`].
	pub async fn token_of_owner_by_index(
		&self,
		owner: Address,
		index: &str,
	) -> Result<String, ProviderError> {
		let index = parse_token_id(index).map_err(ProviderError::InvalidInput)?;
		let mint = &self.contracts.mint;
		let values = self
			.query(
				mint,
				"tokenOfOwnerByIndex",
				&[DynSolValue::Address(owner), uint(index)],
			)
			.await?;
		Ok(uint_output(values, "tokenOfOwnerByIndex")?.to_string())
	}

	/// Category label of `token_id`.
	pub async fn token_type(&self, token_id: &str) -> Result<String, ProviderError> {
		let mint = &self.contracts.mint;
		let values = self
			.query(mint, "tokenTypes", &[token_id_arg(token_id)?])
			.await?;
		label_output(values, "tokenTypes")
	}

	/// Mints a new token to `account`.
	///
	/// The receipt carries no token id; callers derive it from
	/// `balance_of` and `token_of_owner_by_index(balance - 1)`.
	pub async fn mint_token(&self, account: Address) -> Result<TransactionReceipt, ProviderError> {
		let mint = &self.contracts.mint;
		self.transact(account, mint, "mintToken", &[], U256::ZERO)
			.await
	}

	/// Tokens owned by `account`.
	pub async fn get_tokens(&self, account: Address) -> Result<Vec<TokenRecord>, ProviderError> {
		let mint = &self.contracts.mint;
		let values = self
			.query(mint, "getTokens", &[DynSolValue::Address(account)])
			.await?;
		token_records_output(values, "getTokens")
	}

	/// Tokens currently listed on the marketplace.
	pub async fn get_on_sale_tokens(&self) -> Result<Vec<TokenRecord>, ProviderError> {
		let sale = &self.contracts.sale;
		let values = self.query(sale, "getOnSaleTokens", &[]).await?;
		token_records_output(values, "getOnSaleTokens")
	}

	pub async fn is_approved_for_all(
		&self,
		owner: Address,
		operator: Address,
	) -> Result<bool, ProviderError> {
		let mint = &self.contracts.mint;
		let values = self
			.query(
				mint,
				"isApprovedForAll",
				&[DynSolValue::Address(owner), DynSolValue::Address(operator)],
			)
			.await?;
		bool_output(values, "isApprovedForAll")
	}

	/// Grants or revokes the sale contract's right to transfer tokens of `account`.
	pub async fn set_approval_for_all(
		&self,
		account: Address,
		enabled: bool,
	) -> Result<TransactionReceipt, ProviderError> {
		let operator = self.sale_operator();
		let mint = &self.contracts.mint;
		self.transact(
			account,
			mint,
			"setApprovalForAll",
			&[DynSolValue::Address(operator), DynSolValue::Bool(enabled)],
			U256::ZERO,
		)
		.await
	}

	/// Lists `token_id` for sale at `price_in_ether`.
	///
	/// The price is converted to wei before the call. Reverts when `account`
	/// does not own the token or the sale contract is not approved.
	pub async fn set_for_sale_token(
		&self,
		account: Address,
		token_id: &str,
		price_in_ether: &str,
	) -> Result<TransactionReceipt, ProviderError> {
		let price = to_base_units(price_in_ether)?;
		let sale = &self.contracts.sale;
		self.transact(
			account,
			sale,
			"setForSaleToken",
			&[token_id_arg(token_id)?, uint(price)],
			U256::ZERO,
		)
		.await
	}

	pub async fn owner_of(&self, token_id: &str) -> Result<Address, ProviderError> {
		let mint = &self.contracts.mint;
		let values = self
			.query(mint, "ownerOf", &[token_id_arg(token_id)?])
			.await?;
		address_output(values, "ownerOf")
	}

	/// Current rental delegate of `token_id`; the zero address when none.
	pub async fn user_of(&self, token_id: &str) -> Result<Address, ProviderError> {
		let mint = &self.contracts.mint;
		let values = self
			.query(mint, "userOf", &[token_id_arg(token_id)?])
			.await?;
		address_output(values, "userOf")
	}

	/// Buys `token_id`, sending exactly `price_in_wei` as value.
	pub async fn purchase_token(
		&self,
		account: Address,
		token_id: &str,
		price_in_wei: &str,
	) -> Result<TransactionReceipt, ProviderError> {
		let value = parse_token_id(price_in_wei)
			.map_err(|e| ProviderError::InvalidInput(format!("Invalid price: {e}")))?;
		let sale = &self.contracts.sale;
		self.transact(
			account,
			sale,
			"purchaseToken",
			&[token_id_arg(token_id)?],
			value,
		)
		.await
	}

	/// Makes `account` the user of `token_id` until `expires` (unix seconds).
	pub async fn set_user(
		&self,
		account: Address,
		token_id: &str,
		expires: u64,
	) -> Result<TransactionReceipt, ProviderError> {
		let mint = &self.contracts.mint;
		self.transact(
			account,
			mint,
			"setUser",
			&[
				token_id_arg(token_id)?,
				DynSolValue::Address(account),
				DynSolValue::Uint(U256::from(expires), 64),
			],
			U256::ZERO,
		)
		.await
	}
}
