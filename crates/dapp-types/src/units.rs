//! Fixed-point conversion between human-readable ether amounts and wei.
//!
//! Amounts travel on the wire as base units (wei). Users type and read
//! decimal ether amounts. One display unit is exactly `10^18` base units and
//! the conversion is exact in both directions; nothing goes through floats.

use alloy_primitives::{
	utils::{format_ether, parse_ether},
	U256,
};
use thiserror::Error;

/// Number of fractional digits in one display unit.
pub const BASE_UNIT_DECIMALS: usize = 18;

/// Errors produced while parsing a decimal amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
	#[error("Amount is empty")]
	Empty,
	#[error("Invalid amount '{0}': only digits and a single decimal point are allowed")]
	InvalidFormat(String),
	#[error("Amount '{0}' has more than {BASE_UNIT_DECIMALS} fractional digits")]
	TooPrecise(String),
	#[error("Amount '{0}' does not fit in 256 bits")]
	Overflow(String),
	#[error("Failed to convert amount '{amount}': {reason}")]
	Conversion { amount: String, reason: String },
}

/// Converts a decimal display amount ("1.5") into base units.
///
/// Leading and trailing whitespace is ignored. Either side of the decimal
/// point may be empty ("1." or ".5") but not both.
///
/// # Errors
///
/// Returns an error if the string is empty, contains anything other than
/// ASCII digits and one `.`, has more than 18 fractional digits, or the
/// result overflows `U256`.
pub fn to_base_units(amount: &str) -> Result<U256, UnitsError> {
	let trimmed = amount.trim();
	if trimmed.is_empty() {
		return Err(UnitsError::Empty);
	}

	let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
	let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
	if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
		return Err(UnitsError::InvalidFormat(trimmed.to_string()));
	}
	// parse_ether silently truncates extra digits
	if fraction.len() > BASE_UNIT_DECIMALS {
		return Err(UnitsError::TooPrecise(trimmed.to_string()));
	}

	parse_ether(trimmed).map_err(|e| UnitsError::Conversion {
		amount: trimmed.to_string(),
		reason: e.to_string(),
	})
}

/// Renders base units as a decimal display amount.
///
/// Trailing fractional zeros are dropped, so `10^18` renders as `"1"` and
/// `1.5 * 10^18` as `"1.5"`.
pub fn to_display_units(value: U256) -> String {
	let formatted = format_ether(value);
	match formatted.split_once('.') {
		Some((whole, fraction)) => match fraction.trim_end_matches('0') {
			"" => whole.to_string(),
			fraction => format!("{whole}.{fraction}"),
		},
		None => formatted,
	}
}
