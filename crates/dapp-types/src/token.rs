//! Token records as returned by the mint and sale contracts.

use crate::units::UnitsError;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Read-only projection of a token held by the mint contract.
///
/// All numeric fields are decimal strings. `token_price` is denominated in
/// wei and is `"0"` when the token is not listed for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
	pub token_id: String,
	pub token_type: String,
	pub token_price: String,
}

impl TokenRecord {
	pub fn new(
		token_id: impl Into<String>,
		token_type: impl Into<String>,
		token_price: impl Into<String>,
	) -> Self {
		Self {
			token_id: token_id.into(),
			token_type: token_type.into(),
			token_price: token_price.into(),
		}
	}

	/// Listed price in wei.
	pub fn price_in_wei(&self) -> Result<U256, UnitsError> {
		let price = self.token_price.trim();
		if price.is_empty() {
			return Err(UnitsError::Empty);
		}
		if !price.bytes().all(|b| b.is_ascii_digit()) {
			return Err(UnitsError::InvalidFormat(price.to_string()));
		}
		U256::from_str_radix(price, 10).map_err(|_| UnitsError::Overflow(price.to_string()))
	}

	/// Whether the token currently carries a sale price.
	pub fn is_listed(&self) -> bool {
		self.token_price.trim() != "0"
	}
}

/// True when `owner` and `account` are the same address.
///
/// Address values compare byte-wise, which is the case-insensitive comparison
/// of their hex renderings.
pub fn is_own_token(owner: &Address, account: &Address) -> bool {
	owner == account
}

/// A listed token can be bought by anyone except its owner.
pub fn is_buyable(owner: &Address, account: &Address) -> bool {
	!is_own_token(owner, account)
}

/// Rental status derived from `userOf`.
///
/// `userOf` returns the zero address exactly when this is `false`.
pub fn is_rentable(user: &Address) -> bool {
	*user != Address::ZERO
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parse_address;

	#[test]
	fn test_token_record_serializes_camel_case() {
		let record = TokenRecord::new("7", "dragon", "0");
		let json = serde_json::to_value(&record).unwrap();
		assert_eq!(json["tokenId"], "7");
		assert_eq!(json["tokenType"], "dragon");
		assert_eq!(json["tokenPrice"], "0");
	}

	#[test]
	fn test_price_in_wei() {
		let record = TokenRecord::new("1", "cat", "2000000000000000000");
		assert_eq!(
			record.price_in_wei().unwrap(),
			U256::from(2_000_000_000_000_000_000u128)
		);
		assert!(record.is_listed());

		let unlisted = TokenRecord::new("2", "cat", "0");
		assert_eq!(unlisted.price_in_wei().unwrap(), U256::ZERO);
		assert!(!unlisted.is_listed());

		let bad = TokenRecord::new("3", "cat", "1.5");
		assert!(bad.price_in_wei().is_err());
	}

	#[test]
	fn test_buyable_compares_case_insensitively() {
		let owner = parse_address("0xF39FD6E51AAD88F6F4CE6AB8827279CFFFB92266").unwrap();
		let same = parse_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
		let other = parse_address("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap();
		assert!(!is_buyable(&owner, &same));
		assert!(is_own_token(&owner, &same));
		assert!(is_buyable(&owner, &other));
	}

	#[test]
	fn test_rentable_iff_user_not_zero() {
		assert!(!is_rentable(&Address::ZERO));
		let user = parse_address("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap();
		assert!(is_rentable(&user));
	}
}
