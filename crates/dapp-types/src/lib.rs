//! Common types shared across the sample token dApp.
//!
//! This crate defines the data structures every other crate speaks: token
//! records returned by the contracts, the authenticated session, lifecycle
//! events raised by an auth adapter, fixed-point unit conversion and the
//! configuration validation framework used by pluggable implementations.

/// Lifecycle events emitted by auth adapters.
pub mod events;
/// Mined transaction receipts.
pub mod receipt;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Redacting wrapper for sensitive configuration values.
pub mod secret_string;
/// Session data published to views.
pub mod session;
/// Token records and derived sale/rental status.
pub mod token;
/// Fixed-point conversion between display units and base units.
pub mod units;
/// Address and formatting helpers.
pub mod utils;
/// Configuration validation framework.
pub mod validation;

pub use alloy_primitives::{Address, Bytes, B256, U256};
pub use events::AdapterEvent;
pub use receipt::TransactionReceipt;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use session::{Session, UserInfo};
pub use token::{is_buyable, is_own_token, is_rentable, TokenRecord};
pub use units::{to_base_units, to_display_units, UnitsError, BASE_UNIT_DECIMALS};
pub use utils::{
	format_address, parse_address, parse_token_id, short_address, without_0x_prefix,
	ZERO_ADDRESS,
};
pub use validation::*;
