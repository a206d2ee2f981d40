//! `/`: mint a new sample and show what came out.

use crate::card::SampleCard;
use crate::console::DebugConsole;
use crate::{report, ViewError};
use dapp_session::SessionContext;
use dapp_types::{parse_token_id, U256};
use serde_json::json;
use tracing::{info, instrument};

pub struct MintPage {
	context: SessionContext,
	minted: Option<SampleCard>,
}

impl MintPage {
	pub fn new(context: SessionContext) -> Self {
		Self {
			context,
			minted: None,
		}
	}

	/// The card of the last minted sample.
	pub fn minted(&self) -> Option<&SampleCard> {
		self.minted.as_ref()
	}

	/// Mints to the first account and shows the new sample's card.
	///
	/// Returns whether a card is now shown for the new token.
	#[instrument(skip_all)]
	pub async fn mint(&mut self, console: &mut DebugConsole) -> bool {
		match self.try_mint().await {
			Ok((token_id, card)) => {
				info!(%token_id, token_type = %card.token_type, "Minted sample");
				console.log(
					"mint",
					json!({ "tokenId": token_id, "tokenType": card.token_type }),
				);
				self.minted = Some(card);
				true
			},
			Err(e) => {
				report(console, "mint", &e);
				false
			},
		}
	}

	async fn try_mint(&self) -> Result<(String, SampleCard), ViewError> {
		let provider = self.context.provider().await?;
		let account = provider
			.get_accounts()
			.await?
			.first()
			.copied()
			.ok_or(ViewError::NotLoggedIn)?;

		provider.mint_token(account).await?;

		// The receipt carries no id: the newest token is the last one owned.
		let balance = provider.balance_of(account).await?;
		let last_index = parse_token_id(&balance)
			.ok()
			.and_then(|count| count.checked_sub(U256::from(1)))
			.ok_or_else(|| {
				ViewError::Rejected(format!("Unexpected balance {balance} after mint"))
			})?;

		let token_id = provider
			.token_of_owner_by_index(account, &last_index.to_string())
			.await?;
		let token_type = provider.token_type(&token_id).await?;
		Ok((token_id, SampleCard::new(token_type)))
	}

	pub fn render(&self) -> String {
		let body = match &self.minted {
			Some(card) => card.render(),
			None => "No Items.".to_string(),
		};
		format!("{body}\n\n  [ Mint! ]  (command: mint)")
	}
}
