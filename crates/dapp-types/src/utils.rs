use alloy_primitives::{Address, U256};

/// Sentinel meaning "no address set", e.g. a token without an active user.
pub const ZERO_ADDRESS: Address = Address::ZERO;

/// Removes a "0x" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Parses a 20-byte address written as 40 hex digits, with or without
/// the "0x" prefix, in any letter case.
pub fn parse_address(input: &str) -> Result<Address, String> {
	let trimmed = input.trim();
	trimmed
		.parse::<Address>()
		.map_err(|e| format!("Invalid address '{trimmed}': {e}"))
}

/// Parses a token id given as an unsigned decimal string.
pub fn parse_token_id(input: &str) -> Result<U256, String> {
	let trimmed = input.trim();
	if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
		return Err(format!("Token id must be a decimal integer, got '{trimmed}'"));
	}
	U256::from_str_radix(trimmed, 10).map_err(|e| format!("Token id out of range: {e}"))
}

/// Lowercase `0x`-prefixed rendering of an address.
pub fn format_address(address: &Address) -> String {
	format!("{address:#x}")
}

/// Shortened `0x1234…abcd` form used in headers and card footers.
pub fn short_address(address: &Address) -> String {
	let full = format_address(address);
	format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
