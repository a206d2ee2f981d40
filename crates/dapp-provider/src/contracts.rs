//! Contract ABIs and call encoding for the mint and sale contracts.
//!
//! The ABIs are fixed and embedded as JSON. [`Contract`] pairs an ABI with a
//! deployed address and turns method names plus [`DynSolValue`] arguments
//! into calldata, and return data back into values.

use crate::ProviderError;
use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{Address, Bytes, Selector, U256};
use dapp_types::TokenRecord;
use once_cell::sync::Lazy;

const MINT_TOKEN_ABI: &str = r#"[
	{
		"type": "function",
		"name": "balanceOf",
		"inputs": [{"name": "owner", "type": "address"}],
		"outputs": [{"name": "", "type": "uint256"}],
		"stateMutability": "view"
	},
	{
		"type": "function",
		"name": "ownerOf",
		"inputs": [{"name": "tokenId", "type": "uint256"}],
		"outputs": [{"name": "", "type": "address"}],
		"stateMutability": "view"
	},
	{
		"type": "function",
		"name": "userOf",
		"inputs": [{"name": "tokenId", "type": "uint256"}],
		"outputs": [{"name": "", "type": "address"}],
		"stateMutability": "view"
	},
	{
		"type": "function",
		"name": "tokenOfOwnerByIndex",
		"inputs": [
			{"name": "owner", "type": "address"},
			{"name": "index", "type": "uint256"}
		],
		"outputs": [{"name": "", "type": "uint256"}],
		"stateMutability": "view"
	},
	{
		"type": "function",
		"name": "tokenTypes",
		"inputs": [{"name": "tokenId", "type": "uint256"}],
		"outputs": [{"name": "", "type": "string"}],
		"stateMutability": "view"
	},
	{
		"type": "function",
		"name": "mintToken",
		"inputs": [],
		"outputs": [],
		"stateMutability": "nonpayable"
	},
	{
		"type": "function",
		"name": "getTokens",
		"inputs": [{"name": "owner", "type": "address"}],
		"outputs": [{
			"name": "",
			"type": "tuple[]",
			"components": [
				{"name": "tokenId", "type": "uint256"},
				{"name": "tokenType", "type": "string"},
				{"name": "tokenPrice", "type": "uint256"}
			]
		}],
		"stateMutability": "view"
	},
	{
		"type": "function",
		"name": "isApprovedForAll",
		"inputs": [
			{"name": "owner", "type": "address"},
			{"name": "operator", "type": "address"}
		],
		"outputs": [{"name": "", "type": "bool"}],
		"stateMutability": "view"
	},
	{
		"type": "function",
		"name": "setApprovalForAll",
		"inputs": [
			{"name": "operator", "type": "address"},
			{"name": "approved", "type": "bool"}
		],
		"outputs": [],
		"stateMutability": "nonpayable"
	},
	{
		"type": "function",
		"name": "setUser",
		"inputs": [
			{"name": "tokenId", "type": "uint256"},
			{"name": "user", "type": "address"},
			{"name": "expires", "type": "uint64"}
		],
		"outputs": [],
		"stateMutability": "nonpayable"
	}
]"#;

const SALE_TOKEN_ABI: &str = r#"[
	{
		"type": "function",
		"name": "setForSaleToken",
		"inputs": [
			{"name": "tokenId", "type": "uint256"},
			{"name": "price", "type": "uint256"}
		],
		"outputs": [],
		"stateMutability": "nonpayable"
	},
	{
		"type": "function",
		"name": "purchaseToken",
		"inputs": [{"name": "tokenId", "type": "uint256"}],
		"outputs": [],
		"stateMutability": "payable"
	},
	{
		"type": "function",
		"name": "getOnSaleTokens",
		"inputs": [],
		"outputs": [{
			"name": "",
			"type": "tuple[]",
			"components": [
				{"name": "tokenId", "type": "uint256"},
				{"name": "tokenType", "type": "string"},
				{"name": "tokenPrice", "type": "uint256"}
			]
		}],
		"stateMutability": "view"
	}
]"#;

static MINT_ABI: Lazy<JsonAbi> =
	Lazy::new(|| serde_json::from_str(MINT_TOKEN_ABI).expect("Invalid mint token ABI"));

static SALE_ABI: Lazy<JsonAbi> =
	Lazy::new(|| serde_json::from_str(SALE_TOKEN_ABI).expect("Invalid sale token ABI"));

/// A deployed contract: a label for logs, its address and its ABI.
#[derive(Debug, Clone)]
pub struct Contract {
	name: &'static str,
	address: Address,
	abi: &'static JsonAbi,
}

impl Contract {
	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn address(&self) -> Address {
		self.address
	}

	fn function(&self, method: &str) -> Result<&Function, ProviderError> {
		self.abi
			.function(method)
			.and_then(|overloads| overloads.first())
			.ok_or_else(|| {
				ProviderError::InvalidInput(format!(
					"Function {method} not found in {} ABI",
					self.name
				))
			})
	}

	pub fn selector(&self, method: &str) -> Result<Selector, ProviderError> {
		Ok(self.function(method)?.selector())
	}

	/// Encodes selector plus arguments for `method`.
	pub fn encode(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes, ProviderError> {
		let function = self.function(method)?;
		let data = function.abi_encode_input(args).map_err(|e| {
			ProviderError::InvalidInput(format!("Failed to encode {method}: {e}"))
		})?;
		Ok(data.into())
	}

	/// Decodes the return data of `method`.
	pub fn decode(&self, method: &str, data: &[u8]) -> Result<Vec<DynSolValue>, ProviderError> {
		let function = self.function(method)?;
		function
			.abi_decode_output(data)
			.map_err(|e| ProviderError::Decode(format!("Failed to decode {method} output: {e}")))
	}

	/// Encodes return values of `method`, as the contract would.
	///
	/// Used to script chain clients that stand in for a node.
	pub fn encode_output(
		&self,
		method: &str,
		values: &[DynSolValue],
	) -> Result<Bytes, ProviderError> {
		let function = self.function(method)?;
		let data = function.abi_encode_output(values).map_err(|e| {
			ProviderError::InvalidInput(format!("Failed to encode {method} output: {e}"))
		})?;
		Ok(data.into())
	}
}

/// The two contracts the application talks to.
///
/// Deployments that bundle the marketplace into the token contract use the
/// same address for both.
#[derive(Debug, Clone)]
pub struct Contracts {
	pub mint: Contract,
	pub sale: Contract,
}

impl Contracts {
	pub fn new(mint_token: Address, sale_token: Address) -> Self {
		Self {
			mint: Contract {
				name: "MintToken",
				address: mint_token,
				abi: &*MINT_ABI,
			},
			sale: Contract {
				name: "SaleToken",
				address: sale_token,
				abi: &*SALE_ABI,
			},
		}
	}
}

fn first(values: Vec<DynSolValue>, method: &str) -> Result<DynSolValue, ProviderError> {
	values
		.into_iter()
		.next()
		.ok_or_else(|| ProviderError::Decode(format!("{method} returned no values")))
}

pub(crate) fn uint_output(values: Vec<DynSolValue>, method: &str) -> Result<U256, ProviderError> {
	match first(values, method)? {
		DynSolValue::Uint(value, _) => Ok(value),
		other => Err(unexpected(method, "uint256", &other)),
	}
}

pub(crate) fn address_output(
	values: Vec<DynSolValue>,
	method: &str,
) -> Result<Address, ProviderError> {
	match first(values, method)? {
		DynSolValue::Address(address) => Ok(address),
		other => Err(unexpected(method, "address", &other)),
	}
}

pub(crate) fn bool_output(values: Vec<DynSolValue>, method: &str) -> Result<bool, ProviderError> {
	match first(values, method)? {
		DynSolValue::Bool(flag) => Ok(flag),
		other => Err(unexpected(method, "bool", &other)),
	}
}

/// Category labels are strings; numeric labels are rendered in decimal.
pub(crate) fn label_output(values: Vec<DynSolValue>, method: &str) -> Result<String, ProviderError> {
	match first(values, method)? {
		DynSolValue::String(label) => Ok(label),
		DynSolValue::Uint(value, _) => Ok(value.to_string()),
		other => Err(unexpected(method, "string", &other)),
	}
}

/// Decodes `(uint256 tokenId, string tokenType, uint256 tokenPrice)[]`.
pub(crate) fn token_records_output(
	values: Vec<DynSolValue>,
	method: &str,
) -> Result<Vec<TokenRecord>, ProviderError> {
	let items = match first(values, method)? {
		DynSolValue::Array(items) => items,
		other => return Err(unexpected(method, "tuple[]", &other)),
	};

	items
		.into_iter()
		.map(|item| match item {
			DynSolValue::Tuple(fields) => match fields.as_slice() {
				[DynSolValue::Uint(id, _), DynSolValue::String(kind), DynSolValue::Uint(price, _)] => {
					Ok(TokenRecord::new(id.to_string(), kind.clone(), price.to_string()))
				},
				_ => Err(ProviderError::Decode(format!(
					"{method} returned a malformed token record"
				))),
			},
			other => Err(unexpected(method, "tuple", &other)),
		})
		.collect()
}

fn unexpected(method: &str, expected: &str, got: &DynSolValue) -> ProviderError {
	ProviderError::Decode(format!(
		"{method} returned {got:?} where {expected} was expected"
	))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn contracts() -> Contracts {
		Contracts::new(Address::repeat_byte(0x01), Address::repeat_byte(0x02))
	}

	#[test]
	fn test_embedded_abis_parse() {
		assert!(MINT_ABI.function("getTokens").is_some());
		assert!(MINT_ABI.function("setUser").is_some());
		assert!(SALE_ABI.function("purchaseToken").is_some());
		assert!(SALE_ABI.function("getOnSaleTokens").is_some());
	}

	#[test]
	fn test_encode_uses_selector() {
		let c = contracts();
		let data = c
			.mint
			.encode("balanceOf", &[DynSolValue::Address(Address::repeat_byte(0xaa))])
			.unwrap();
		// balanceOf(address) selector
		assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
		assert_eq!(&data[..4], c.mint.selector("balanceOf").unwrap().as_slice());
		assert_eq!(data.len(), 36);
	}

	#[test]
	fn test_encode_unknown_method() {
		let c = contracts();
		let err = c.sale.encode("balanceOf", &[]).unwrap_err();
		assert!(matches!(err, ProviderError::InvalidInput(msg) if msg.contains("SaleToken")));
	}

	#[test]
	fn test_encode_wrong_arity() {
		let c = contracts();
		assert!(matches!(
			c.mint.encode("ownerOf", &[]),
			Err(ProviderError::InvalidInput(_))
		));
	}

	#[test]
	fn test_decode_token_records() {
		let c = contracts();
		let encoded = c
			.sale
			.encode_output("getOnSaleTokens", &[DynSolValue::Array(vec![
				DynSolValue::Tuple(vec![
					DynSolValue::Uint(U256::from(7), 256),
					DynSolValue::String("dragon".into()),
					DynSolValue::Uint(U256::from(2_000_000_000_000_000_000u128), 256),
				]),
				DynSolValue::Tuple(vec![
					DynSolValue::Uint(U256::from(9), 256),
					DynSolValue::String("cat".into()),
					DynSolValue::Uint(U256::ZERO, 256),
				]),
			])])
			.unwrap();

		let values = c.sale.decode("getOnSaleTokens", &encoded).unwrap();
		let records = token_records_output(values, "getOnSaleTokens").unwrap();
		assert_eq!(
			records,
			vec![
				TokenRecord::new("7", "dragon", "2000000000000000000"),
				TokenRecord::new("9", "cat", "0"),
			]
		);
	}

	#[test]
	fn test_decode_truncated_output() {
		let c = contracts();
		assert!(matches!(
			c.mint.decode("balanceOf", &[0u8; 4]),
			Err(ProviderError::Decode(_))
		));
	}

	#[test]
	fn test_scalar_decoders_reject_wrong_types() {
		let values = vec![DynSolValue::Bool(true)];
		assert!(uint_output(values.clone(), "balanceOf").is_err());
		assert!(address_output(values.clone(), "ownerOf").is_err());
		assert!(bool_output(values, "isApprovedForAll").unwrap());
		assert!(matches!(
			uint_output(vec![], "balanceOf"),
			Err(ProviderError::Decode(msg)) if msg.contains("no values")
		));
	}

	#[test]
	fn test_label_accepts_numeric_labels() {
		let label = label_output(vec![DynSolValue::Uint(U256::from(3), 256)], "tokenTypes");
		assert_eq!(label.unwrap(), "3");
	}
}
