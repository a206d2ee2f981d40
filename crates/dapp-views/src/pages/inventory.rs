//! `/my-sample`: tokens owned by the current account.

use crate::card::{price_label, SampleCard};
use crate::console::DebugConsole;
use crate::guard::RefetchGuard;
use crate::{report, signed_in, ViewError};
use alloy_primitives::Address;
use dapp_session::SessionContext;
use dapp_types::{to_base_units, TokenRecord};
use serde_json::json;
use tracing::{debug, info, instrument};

pub struct InventoryPage {
	context: SessionContext,
	guard: RefetchGuard<Option<Address>>,
	/// Whether the sale contract may move this account's tokens.
	approved: bool,
	cards: Vec<TokenRecord>,
}

impl InventoryPage {
	pub fn new(context: SessionContext) -> Self {
		Self {
			context,
			guard: RefetchGuard::default(),
			approved: false,
			cards: Vec::new(),
		}
	}

	pub fn is_approved(&self) -> bool {
		self.approved
	}

	pub fn cards(&self) -> &[TokenRecord] {
		&self.cards
	}

	/// Refreshes when the account changed since the last fetch.
	pub async fn enter(&mut self, console: &mut DebugConsole) {
		let account = self.context.account().await;
		if !self.guard.should_fetch(&account) {
			return;
		}
		if account.is_none() {
			self.approved = false;
			self.cards.clear();
			return;
		}
		self.refresh(console).await;
	}

	/// Makes the next [`Self::enter`] fetch even if the account is unchanged.
	pub fn invalidate(&mut self) {
		self.guard.reset();
	}

	/// Reloads the approval status and the owned tokens.
	#[instrument(skip_all)]
	pub async fn refresh(&mut self, console: &mut DebugConsole) -> bool {
		let loaded = async {
			let (provider, account) = signed_in(&self.context).await?;
			let approved = provider
				.is_approved_for_all(account, provider.sale_operator())
				.await?;

			let balance = provider.balance_of(account).await?;
			let cards = if balance == "0" {
				Vec::new()
			} else {
				provider.get_tokens(account).await?
			};
			Ok::<_, ViewError>((approved, cards))
		}
		.await;

		match loaded {
			Ok((approved, cards)) => {
				debug!(approved, count = cards.len(), "Loaded inventory");
				console.log("getTokens", &cards);
				self.approved = approved;
				self.cards = cards;
				true
			},
			Err(e) => {
				report(console, "getTokens", &e);
				false
			},
		}
	}

	/// Grants or revokes the sale contract's approval, whichever is not set.
	#[instrument(skip_all)]
	pub async fn toggle_approval(&mut self, console: &mut DebugConsole) -> bool {
		let enable = !self.approved;
		let result = async {
			let (provider, account) = signed_in(&self.context).await?;
			provider.set_approval_for_all(account, enable).await?;
			Ok::<_, ViewError>(())
		}
		.await;

		match result {
			Ok(()) => {
				info!(approved = enable, "Sale approval changed");
				console.log("setApprovalForAll", json!({ "approved": enable }));
				self.approved = enable;
				true
			},
			Err(e) => {
				report(console, "setApprovalForAll", &e);
				false
			},
		}
	}

	/// Lists an unlisted token at `price_in_ether`.
	///
	/// Requires the sale approval. On success the card shows the new price.
	#[instrument(skip(self, console))]
	pub async fn sell(
		&mut self,
		token_id: &str,
		price_in_ether: &str,
		console: &mut DebugConsole,
	) -> bool {
		match self.try_sell(token_id, price_in_ether).await {
			Ok(price) => {
				info!(token_id, %price, "Listed token for sale");
				if let Some(card) = self.cards.iter_mut().find(|c| c.token_id == token_id) {
					card.token_price = price.clone();
				}
				console.log(
					"setForSaleToken",
					json!({ "tokenId": token_id, "tokenPrice": price }),
				);
				true
			},
			Err(e) => {
				report(console, "setForSaleToken", &e);
				false
			},
		}
	}

	async fn try_sell(&self, token_id: &str, price_in_ether: &str) -> Result<String, ViewError> {
		if !self.approved {
			return Err(ViewError::Rejected(
				"Approve the sale contract before selling".to_string(),
			));
		}
		let card = self
			.cards
			.iter()
			.find(|c| c.token_id == token_id)
			.ok_or_else(|| ViewError::Rejected(format!("Token {token_id} is not yours")))?;
		if card.is_listed() {
			return Err(ViewError::Rejected(format!(
				"Token {token_id} is already listed"
			)));
		}

		let price = to_base_units(price_in_ether).map_err(dapp_provider::ProviderError::from)?;
		let (provider, account) = signed_in(&self.context).await?;
		provider
			.set_for_sale_token(account, token_id, price_in_ether)
			.await?;
		Ok(price.to_string())
	}

	pub fn render(&self) -> String {
		let (status, button) = if self.approved {
			("TRUE", "Cancel")
		} else {
			("FALSE", "Approve")
		};
		let mut lines = vec![format!("Sale Status : {status}  [ {button} ]")];
		for card in &self.cards {
			let sample = SampleCard::new(&card.token_type);
			let price = if card.is_listed() {
				price_label(card)
			} else {
				"[ ____ Ether ] [ Sell ]".to_string()
			};
			lines.push(format!("#{} {}\n    {}", card.token_id, sample.render(), price));
		}
		lines.join("\n")
	}
}
