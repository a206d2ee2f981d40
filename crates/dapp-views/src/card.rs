//! Card components shared by the pages.

use dapp_types::{to_display_units, TokenRecord};

/// Picture of one sample, identified by its category label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCard {
	pub token_type: String,
}

impl SampleCard {
	pub fn new(token_type: impl Into<String>) -> Self {
		Self {
			token_type: token_type.into(),
		}
	}

	pub fn image_path(&self) -> String {
		format!("images/{}.jpg", self.token_type)
	}

	pub fn render(&self) -> String {
		format!("[{}] {}", self.token_type, self.image_path())
	}
}

/// Human readable price of a record, e.g. `"1.5 ETH"`.
///
/// Unparseable amounts are shown as they came from the chain.
pub fn price_label(record: &TokenRecord) -> String {
	match record.price_in_wei() {
		Ok(wei) => format!("{} ETH", to_display_units(wei)),
		Err(_) => format!("{} wei", record.token_price),
	}
}
