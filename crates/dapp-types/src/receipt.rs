use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
	pub transaction_hash: B256,
	pub block_number: u64,
	/// `status` field of the receipt; `false` means the call reverted.
	pub status: bool,
}

impl TransactionReceipt {
	pub fn new(transaction_hash: B256, block_number: u64, status: bool) -> Self {
		Self {
			transaction_hash,
			block_number,
			status,
		}
	}
}
